use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::metadata::MetadataOrigin;
use crate::service::FallbackStats;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: FallbackStats,
    /// Where hero names came from, `None` until first loaded
    pub hero_metadata: Option<MetadataOrigin>,
    pub item_metadata: Option<MetadataOrigin>,
}

/// Live/fallback counters since process start.
pub async fn fallback_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let analytics = &state.analytics;
    Json(StatsResponse {
        stats: analytics.stats().await,
        hero_metadata: analytics.metadata().hero_origin().await,
        item_metadata: analytics.metadata().item_origin().await,
    })
}
