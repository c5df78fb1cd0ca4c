use std::str::FromStr;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{FactionWinRate, HeroWinRate, ItemWinRate, RankBucketStat};

// ── Parameters ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct YearParams {
    pub year: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct YearResponse<T> {
    pub year: i32,
    pub data: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct LimitResponse<T> {
    pub limit: u32,
    pub data: Vec<T>,
}

/// Parse an optional integer parameter, using `default` when absent.
fn parse_param<T: FromStr>(
    raw: Option<&str>,
    default: T,
    name: &str,
    operation: &'static str,
) -> Result<T, ApiError> {
    match raw.map(str::trim) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ApiError::Load {
            operation,
            reason: format!("{} is not an integer: {:?}", name, value),
        }),
    }
}

fn parse_year(
    params: &YearParams,
    state: &AppState,
    operation: &'static str,
) -> Result<i32, ApiError> {
    parse_param(
        params.year.as_deref(),
        state.analytics.config().default_year,
        "year",
        operation,
    )
}

// ── Endpoints ───────────────────────────────────────────────────

pub async fn rank_distribution(
    State(state): State<AppState>,
    Query(params): Query<YearParams>,
) -> Result<Json<YearResponse<RankBucketStat>>, ApiError> {
    let year = parse_year(&params, &state, "rank distribution")?;
    let data = state.analytics.rank_distribution(year).await;
    Ok(Json(YearResponse { year, data }))
}

pub async fn hero_win_rates(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<LimitResponse<HeroWinRate>>, ApiError> {
    let default = i64::from(state.analytics.config().default_hero_limit);
    let requested = parse_param(params.limit.as_deref(), default, "limit", "hero win rates")?;
    let limit = requested.clamp(1, i64::from(u32::MAX)) as u32;

    let data = state.analytics.hero_win_rates(limit).await;
    Ok(Json(LimitResponse { limit, data }))
}

pub async fn item_win_rates(
    State(state): State<AppState>,
    Query(params): Query<YearParams>,
) -> Result<Json<YearResponse<ItemWinRate>>, ApiError> {
    let year = parse_year(&params, &state, "item win rates")?;
    let data = state.analytics.item_win_rates(year).await;
    Ok(Json(YearResponse { year, data }))
}

pub async fn faction_win_rates(
    State(state): State<AppState>,
    Query(params): Query<YearParams>,
) -> Result<Json<YearResponse<FactionWinRate>>, ApiError> {
    let year = parse_year(&params, &state, "faction win rates")?;
    let data = state.analytics.faction_win_rates(year).await;
    Ok(Json(YearResponse { year, data }))
}
