//! Upstream analytical data source.
//!
//! The service only talks to the upstream through the [`ExternalSource`]
//! trait. [`OpenDotaClient`] is the network implementation;
//! [`ScriptedSource`] replays canned responses.

mod opendota;
mod scripted;

pub use opendota::*;
pub use scripted::*;

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{HeroMetadata, ItemMetadata};

/// One loosely-typed record as returned by the upstream.
pub type Row = Map<String, Value>;

/// Errors surfaced by an upstream call. No variant is retried.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("Unexpected response shape: {0}")]
    Shape(String),
}

/// Request/response boundary to the upstream analytics API.
#[async_trait]
pub trait ExternalSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &'static str;

    /// Run SQL against the explorer endpoint and return its rows.
    async fn query(&self, sql: &str) -> Result<Vec<Row>, SourceError>;

    /// Hero constants keyed by id string.
    async fn fetch_hero_constants(&self) -> Result<HashMap<String, HeroMetadata>, SourceError>;

    /// Item constants keyed by internal item name.
    async fn fetch_item_constants(&self) -> Result<HashMap<String, ItemMetadata>, SourceError>;

    /// Raw item timing scenario records.
    async fn fetch_item_timings(&self) -> Result<Vec<Row>, SourceError>;
}

/// Rows from a JSON array of objects. Any other shape is rejected whole.
pub fn rows_from_value(value: Value) -> Result<Vec<Row>, SourceError> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| match item {
                Value::Object(map) => Ok(map),
                other => Err(SourceError::Shape(format!(
                    "row {} is {}, expected an object",
                    idx,
                    json_type(&other)
                ))),
            })
            .collect(),
        other => Err(SourceError::Shape(format!(
            "rows are {}, expected an array",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
