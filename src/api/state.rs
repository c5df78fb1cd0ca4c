use std::sync::Arc;

use crate::service::AnalyticsService;

#[derive(Clone)]
pub struct AppState {
    pub analytics: Arc<AnalyticsService>,
    /// Allowed CORS origin, `*` for any
    pub cors_origin: String,
}

impl AppState {
    pub fn new(analytics: Arc<AnalyticsService>) -> Self {
        Self {
            analytics,
            cors_origin: "*".to_string(),
        }
    }

    pub fn with_cors_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_origin = origin.into();
        self
    }
}
