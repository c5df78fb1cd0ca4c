//! Analytics aggregation service.
//!
//! Composition root for the four statistic operations. Each operation
//! resolves its window, queries the upstream, decodes and aggregates the
//! rows, and serves the fallback dataset on any failure. No operation
//! returns an error; failures are logged and counted in [`FallbackStats`].

mod stats;

pub use stats::*;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::calculate::{self, AggregateError};
use crate::config::{AnalyticsConfig, MAX_ITEM_LIMIT};
use crate::fallback;
use crate::metadata::MetadataCache;
use crate::models::{FactionWinRate, HeroWinRate, ItemWinRate, RankBucketStat, TimeWindow};
use crate::query::StatQuery;
use crate::source::{ExternalSource, Row, SourceError};

/// Why an operation degraded to fallback data.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] SourceError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

impl AnalyticsError {
    /// Short label for logs and counters.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyticsError::Upstream(SourceError::Shape(_)) => "decode",
            AnalyticsError::Upstream(_) => "upstream",
            AnalyticsError::Aggregate(AggregateError::Decode(_)) => "decode",
            AnalyticsError::Aggregate(AggregateError::NoUsableData) => "empty",
        }
    }
}

/// Match statistics backed by an [`ExternalSource`] with fallback data.
pub struct AnalyticsService {
    source: Arc<dyn ExternalSource>,
    metadata: MetadataCache,
    config: AnalyticsConfig,
    stats: SharedFallbackStats,
}

impl AnalyticsService {
    pub fn new(source: Arc<dyn ExternalSource>, config: AnalyticsConfig) -> Self {
        Self {
            metadata: MetadataCache::new(source.clone()),
            source,
            config,
            stats: Arc::new(RwLock::new(FallbackStats::new())),
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn metadata(&self) -> &MetadataCache {
        &self.metadata
    }

    /// Snapshot of the live/fallback counters.
    pub async fn stats(&self) -> FallbackStats {
        self.stats.read().await.clone()
    }

    /// Share of player-match records per rank bracket in `year`.
    pub async fn rank_distribution(&self, year: i32) -> Vec<RankBucketStat> {
        let query = StatQuery::RankDistribution {
            window: TimeWindow::for_year(year),
        };
        let result = self.try_rank_distribution(&query).await;
        self.settle(&query, result, fallback::rank_distribution).await
    }

    /// The `limit` most played heroes (at least one).
    ///
    /// Always computed over the configured `hero_window_year`, not a caller
    /// supplied year.
    pub async fn hero_win_rates(&self, limit: u32) -> Vec<HeroWinRate> {
        let limit = limit.max(1);
        let query = StatQuery::HeroWinRates {
            window: TimeWindow::for_year(self.config.hero_window_year),
            limit,
        };
        let result = self.try_hero_win_rates(&query, limit).await;
        self.settle(&query, result, || fallback::hero_win_rates(limit))
            .await
    }

    /// Top items by games played. `year` is accepted but the upstream
    /// timing scenarios cannot be filtered by time.
    pub async fn item_win_rates(&self, year: i32) -> Vec<ItemWinRate> {
        let query = StatQuery::ItemTimings { year };
        let result = self.try_item_win_rates(&query).await;
        self.settle(&query, result, fallback::item_win_rates).await
    }

    /// Radiant and Dire win rates in `year`.
    pub async fn faction_win_rates(&self, year: i32) -> Vec<FactionWinRate> {
        let query = StatQuery::FactionWinRates {
            window: TimeWindow::for_year(year),
        };
        let result = self.try_faction_win_rates(&query).await;
        self.settle(&query, result, fallback::faction_win_rates).await
    }

    async fn try_rank_distribution(
        &self,
        query: &StatQuery,
    ) -> Result<Vec<RankBucketStat>, AnalyticsError> {
        let rows = self.fetch_rows(query).await?;
        let decoded = calculate::decode_rank_rows(&rows)?;
        Ok(calculate::rank_distribution(&decoded)?)
    }

    async fn try_hero_win_rates(
        &self,
        query: &StatQuery,
        limit: u32,
    ) -> Result<Vec<HeroWinRate>, AnalyticsError> {
        let rows = self.fetch_rows(query).await?;
        let decoded = calculate::decode_hero_rows(&rows)?;
        let heroes = self.metadata.heroes().await;
        Ok(calculate::hero_win_rates(decoded, &heroes, limit)?)
    }

    async fn try_item_win_rates(
        &self,
        query: &StatQuery,
    ) -> Result<Vec<ItemWinRate>, AnalyticsError> {
        let rows = self.fetch_rows(query).await?;
        let decoded = calculate::decode_item_timings(&rows)?;
        let items = self.metadata.items().await;
        Ok(calculate::item_win_rates(
            &decoded,
            &items,
            self.config.item_limit.min(MAX_ITEM_LIMIT),
        )?)
    }

    async fn try_faction_win_rates(
        &self,
        query: &StatQuery,
    ) -> Result<Vec<FactionWinRate>, AnalyticsError> {
        let rows = self.fetch_rows(query).await?;
        let row = calculate::decode_faction_row(&rows)?;
        Ok(calculate::faction_win_rates(&row)?)
    }

    /// Explorer SQL where the query has it, otherwise the item timings endpoint.
    async fn fetch_rows(&self, query: &StatQuery) -> Result<Vec<Row>, SourceError> {
        let rows = match query.sql() {
            Some(sql) => self.source.query(&sql).await?,
            None => self.source.fetch_item_timings().await?,
        };
        debug!(
            category = query.category(),
            source = self.source.name(),
            rows = rows.len(),
            "Upstream rows received"
        );
        Ok(rows)
    }

    async fn settle<T, F>(
        &self,
        query: &StatQuery,
        result: Result<Vec<T>, AnalyticsError>,
        fallback_data: F,
    ) -> Vec<T>
    where
        F: FnOnce() -> Vec<T>,
    {
        let category = query.category();
        match result {
            Ok(data) => {
                self.stats.write().await.record_live(category);
                data
            }
            Err(e) => {
                warn!(
                    category,
                    kind = e.kind(),
                    error = %e,
                    "Serving fallback data"
                );
                self.stats.write().await.record_fallback(category, &e);
                fallback_data()
            }
        }
    }
}
