//! Core data models for match statistics.

mod metadata;
mod stats;
mod window;

pub use metadata::*;
pub use stats::*;
pub use window::*;
