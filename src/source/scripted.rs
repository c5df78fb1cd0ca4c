//! In-memory source that replays canned responses.
//!
//! Used by tests and local runs that must not touch the network. Every
//! endpoint is either scripted with a payload or fails with
//! [`SourceError::Unavailable`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use serde_json::Value;

use super::{rows_from_value, ExternalSource, Row, SourceError};
use crate::models::{HeroMetadata, ItemMetadata};

/// Number of calls received per endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub query: usize,
    pub hero_constants: usize,
    pub item_constants: usize,
    pub item_timings: usize,
}

#[derive(Default)]
struct Counters {
    query: AtomicUsize,
    hero_constants: AtomicUsize,
    item_constants: AtomicUsize,
    item_timings: AtomicUsize,
}

/// Scripted [`ExternalSource`].
#[derive(Default)]
pub struct ScriptedSource {
    rows: Option<Value>,
    heroes: Option<HashMap<String, HeroMetadata>>,
    items: Option<HashMap<String, ItemMetadata>>,
    timings: Option<Value>,
    delay: Duration,
    counters: Counters,
    queries: Mutex<Vec<String>>,
}

impl ScriptedSource {
    /// A source where every endpoint fails.
    pub fn failing() -> Self {
        Self::default()
    }

    /// Rows returned by every explorer query.
    pub fn with_rows(self, rows: Vec<Row>) -> Self {
        self.with_raw_rows(Value::Array(rows.into_iter().map(Value::Object).collect()))
    }

    /// Explorer `rows` payload as it would arrive on the wire, decoded per call.
    pub fn with_raw_rows(mut self, rows: Value) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn with_heroes(mut self, heroes: Vec<HeroMetadata>) -> Self {
        self.heroes = Some(
            heroes
                .into_iter()
                .map(|hero| (hero.id.to_string(), hero))
                .collect(),
        );
        self
    }

    pub fn with_items(mut self, items: Vec<(&str, ItemMetadata)>) -> Self {
        self.items = Some(
            items
                .into_iter()
                .map(|(key, item)| (key.to_string(), item))
                .collect(),
        );
        self
    }

    pub fn with_timings(self, timings: Vec<Row>) -> Self {
        self.with_raw_timings(Value::Array(timings.into_iter().map(Value::Object).collect()))
    }

    /// Item timings body as it would arrive on the wire, decoded per call.
    pub fn with_raw_timings(mut self, timings: Value) -> Self {
        self.timings = Some(timings);
        self
    }

    /// Delay applied before every response.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> CallCounts {
        CallCounts {
            query: self.counters.query.load(Ordering::SeqCst),
            hero_constants: self.counters.hero_constants.load(Ordering::SeqCst),
            item_constants: self.counters.item_constants.load(Ordering::SeqCst),
            item_timings: self.counters.item_timings.load(Ordering::SeqCst),
        }
    }

    /// SQL received so far, oldest first.
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    async fn respond<T: Clone>(
        &self,
        counter: &AtomicUsize,
        endpoint: &str,
        payload: &Option<T>,
    ) -> Result<T, SourceError> {
        counter.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        payload
            .clone()
            .ok_or_else(|| SourceError::Unavailable(format!("{} not scripted", endpoint)))
    }
}

#[async_trait]
impl ExternalSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn query(&self, sql: &str) -> Result<Vec<Row>, SourceError> {
        self.queries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(sql.to_string());
        let rows = self
            .respond(&self.counters.query, "explorer", &self.rows)
            .await?;
        rows_from_value(rows)
    }

    async fn fetch_hero_constants(&self) -> Result<HashMap<String, HeroMetadata>, SourceError> {
        self.respond(&self.counters.hero_constants, "constants/heroes", &self.heroes)
            .await
    }

    async fn fetch_item_constants(&self) -> Result<HashMap<String, ItemMetadata>, SourceError> {
        self.respond(&self.counters.item_constants, "constants/items", &self.items)
            .await
    }

    async fn fetch_item_timings(&self) -> Result<Vec<Row>, SourceError> {
        let timings = self
            .respond(&self.counters.item_timings, "scenarios/itemTimings", &self.timings)
            .await?;
        rows_from_value(timings)
    }
}
