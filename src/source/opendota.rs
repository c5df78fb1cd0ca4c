//! HTTP client for the OpenDota API.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{rows_from_value, ExternalSource, Row, SourceError};
use crate::models::{HeroMetadata, ItemMetadata};

/// Public OpenDota API root.
pub const DEFAULT_BASE_URL: &str = "https://api.opendota.com/api";

/// Configuration for the OpenDota client.
#[derive(Debug, Clone)]
pub struct OpenDotaConfig {
    /// API root, e.g. `https://api.opendota.com/api`
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for OpenDotaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(15),
            user_agent: format!("dota-meta/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Explorer endpoint response body.
#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    #[serde(default)]
    rows: Option<serde_json::Value>,
}

/// OpenDota-backed [`ExternalSource`].
pub struct OpenDotaClient {
    client: Client,
    base_url: String,
}

impl OpenDotaClient {
    /// Create a client with the given configuration.
    pub fn new(config: OpenDotaConfig) -> Result<Self, SourceError> {
        let parsed = Url::parse(&config.base_url)
            .map_err(|e| SourceError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SourceError::InvalidUrl(config.base_url));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("dota-meta")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client against the public API with default settings.
    pub fn with_defaults() -> Result<Self, SourceError> {
        Self::new(OpenDotaConfig::default())
    }

    fn endpoint(&self, path: &str) -> Result<Url, SourceError> {
        let raw = format!("{}/{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| SourceError::InvalidUrl(format!("{}: {}", raw, e)))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);

        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl ExternalSource for OpenDotaClient {
    fn name(&self) -> &'static str {
        "opendota"
    }

    async fn query(&self, sql: &str) -> Result<Vec<Row>, SourceError> {
        let response: ExplorerResponse = self.get_json("explorer", &[("sql", sql)]).await?;
        // A missing `rows` field is an empty result; a malformed one is not.
        match response.rows {
            Some(rows) => rows_from_value(rows),
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_hero_constants(&self) -> Result<HashMap<String, HeroMetadata>, SourceError> {
        self.get_json("constants/heroes", &[]).await
    }

    async fn fetch_item_constants(&self) -> Result<HashMap<String, ItemMetadata>, SourceError> {
        self.get_json("constants/items", &[]).await
    }

    async fn fetch_item_timings(&self) -> Result<Vec<Row>, SourceError> {
        let value: serde_json::Value = self.get_json("scenarios/itemTimings", &[]).await?;
        rows_from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = OpenDotaConfig::default();
        assert_eq!(config.base_url, "https://api.opendota.com/api");
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert!(config.user_agent.starts_with("dota-meta/"));
    }

    #[test]
    fn test_endpoint_keeps_api_prefix() {
        let client = OpenDotaClient::new(OpenDotaConfig {
            base_url: "https://api.opendota.com/api/".to_string(),
            ..Default::default()
        })
        .unwrap();

        let url = client.endpoint("constants/heroes").unwrap();
        assert_eq!(url.as_str(), "https://api.opendota.com/api/constants/heroes");
    }

    #[test]
    fn test_rejects_non_http_base() {
        let result = OpenDotaClient::new(OpenDotaConfig {
            base_url: "ftp://example.com/api".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(SourceError::InvalidUrl(_))));

        let result = OpenDotaClient::new(OpenDotaConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(SourceError::InvalidUrl(_))));
    }

    #[test]
    fn test_explorer_response_without_rows() {
        let parsed: ExplorerResponse = serde_json::from_str(r#"{"command": "SELECT"}"#).unwrap();
        assert!(parsed.rows.is_none());

        let parsed: ExplorerResponse =
            serde_json::from_str(r#"{"rows": [{"bracket": 0, "matches": "12"}]}"#).unwrap();
        let rows = rows_from_value(parsed.rows.unwrap()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["matches"], "12");
    }

    #[test]
    fn test_unreachable_upstream_is_an_error() {
        let client = OpenDotaClient::new(OpenDotaConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_millis(500),
            ..Default::default()
        })
        .unwrap();

        let result = tokio_test::block_on(client.fetch_item_timings());
        assert!(result.is_err());
    }
}
