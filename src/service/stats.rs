//! In-memory live/fallback counters, reset on process restart.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use super::AnalyticsError;

/// Counters for one statistic category.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    /// Responses computed from upstream data
    pub live: u64,
    /// Responses served from the fallback dataset
    pub fallback: u64,
    /// Fallback responses per error kind ("upstream", "decode", "empty")
    pub fallback_by_kind: BTreeMap<String, u64>,
    pub last_error: Option<String>,
    pub last_fallback_at: Option<DateTime<Utc>>,
}

impl CategoryStats {
    /// Share of responses that were fallbacks, 0.0 before any response.
    pub fn fallback_rate(&self) -> f64 {
        let total = self.live + self.fallback;
        if total == 0 {
            0.0
        } else {
            self.fallback as f64 / total as f64
        }
    }
}

/// Live/fallback counters per category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackStats {
    /// When counting began
    pub started_at: DateTime<Utc>,
    pub categories: BTreeMap<String, CategoryStats>,
}

impl Default for FallbackStats {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            categories: BTreeMap::new(),
        }
    }
}

impl FallbackStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_live(&mut self, category: &str) {
        self.categories
            .entry(category.to_string())
            .or_default()
            .live += 1;
    }

    pub fn record_fallback(&mut self, category: &str, error: &AnalyticsError) {
        let entry = self.categories.entry(category.to_string()).or_default();
        entry.fallback += 1;
        *entry
            .fallback_by_kind
            .entry(error.kind().to_string())
            .or_insert(0) += 1;
        entry.last_error = Some(error.to_string());
        entry.last_fallback_at = Some(Utc::now());
    }

    pub fn category(&self, category: &str) -> Option<&CategoryStats> {
        self.categories.get(category)
    }

    pub fn total_fallbacks(&self) -> u64 {
        self.categories.values().map(|c| c.fallback).sum()
    }
}

pub type SharedFallbackStats = Arc<RwLock<FallbackStats>>;
