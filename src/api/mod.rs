//! REST API endpoints.
//!
//! Axum-based HTTP API exposing the four match statistics plus health and
//! fallback counters. Statistic handlers only parse parameters; the
//! analytics service never fails.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, warn};

use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to load {operation}: {reason}")]
    Load {
        operation: &'static str,
        reason: String,
    },
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("{}", self);

        let message = match &self {
            ApiError::Load { operation, .. } => format!("Failed to load {}", operation),
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { message })).into_response()
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origin);

    Router::new()
        .route("/health", get(routes::health))
        .route("/api/rank-distribution", get(routes::analytics::rank_distribution))
        .route("/api/hero-winrates", get(routes::analytics::hero_win_rates))
        .route("/api/item-winrates", get(routes::analytics::item_win_rates))
        .route("/api/faction-winrates", get(routes::analytics::faction_win_rates))
        .route("/api/stats", get(routes::stats::fallback_stats))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            warn!("Invalid CORS origin {:?}, allowing any origin", origin);
            layer.allow_origin(Any)
        }
    }
}
