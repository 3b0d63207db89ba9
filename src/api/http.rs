//! reqwest transport for the analytics API.

use async_trait::async_trait;
use url::Url;

use super::Transport;
use crate::config::ApiConfig;
use crate::error::{ApiError, ConfigError};

/// Longest slice of a non-JSON error body kept in `ApiError::Status`.
const MAX_ERROR_BODY_CHARS: usize = 200;

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, ConfigError> {
        let base_url = config.base_url()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ConfigError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, base_url })
    }

    fn resolve(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        let url = self.resolve(path)?;
        let resp = self
            .client
            .get(url)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status,
                message: error_message(&text),
            });
        }

        resp.json::<serde_json::Value>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        // Exact duration is reported by ApiClient, which owns the budget.
        ApiError::Timeout(std::time::Duration::ZERO)
    } else if err.is_decode() {
        ApiError::Decode(err.to_string())
    } else {
        ApiError::Network(err.to_string())
    }
}

/// The service answers errors with `{"error": "..."}`; fall back to the raw body.
fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(msg) = json.get("error").and_then(|v| v.as_str()) {
            return msg.to_string();
        }
    }
    body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect()
}
