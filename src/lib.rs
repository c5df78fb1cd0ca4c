//! # Dota Meta
//!
//! Aggregated Dota 2 match statistics from the OpenDota API, with bundled
//! fallback data whenever upstream data cannot be used.
//!
//! ## Architecture
//!
//! - **models**: Statistic records, metadata and time windows
//! - **query**: Explorer SQL for each statistic
//! - **source**: External source trait, OpenDota client and scripted source
//! - **calculate**: Row decoding and aggregation
//! - **fallback**: Static datasets served on failure
//! - **metadata**: Single-flight hero/item name cache
//! - **service**: Always-succeeding analytics operations and fallback counters
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod fallback;
pub mod metadata;
pub mod models;
pub mod query;
pub mod service;
pub mod source;

pub use models::*;
