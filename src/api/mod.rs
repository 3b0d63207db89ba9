//! Client for the TeamPulse analytics API.
//!
//! All requests are GETs relative to the configured base URL. The transport
//! is a trait so the pipeline can run against a scripted transport in tests;
//! production uses `HttpTransport` (reqwest).
//!
//! Modules:
//! - http: reqwest transport
//! - roster: Roster Fetcher (`developers/`)
//! - metric: Per-Entity Metric Fetcher with fallback-on-failure
//! - stats: per-endpoint request statistics

pub mod http;
pub mod metric;
pub mod roster;
pub mod stats;

#[cfg(test)]
pub(crate) mod mock;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::config::ApiConfig;
use crate::error::{ApiError, ConfigError};

pub use http::HttpTransport;
pub use stats::{Endpoint, EndpointStats, Outcome, RequestStats, StatsSnapshot};

/// Fetches one JSON document by path relative to the API base URL.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, path: &str) -> Result<serde_json::Value, ApiError>;
}

/// Shared handle used by every fetcher. Cheap to clone; clones share the
/// transport and the request statistics.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    timeout: Duration,
    stats: Arc<RequestStats>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, config: &ApiConfig) -> Self {
        Self {
            transport,
            timeout: config.request_timeout(),
            stats: Arc::new(RequestStats::default()),
        }
    }

    /// Build a client backed by reqwest.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(Arc::new(transport), config))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn stats(&self) -> &RequestStats {
        &self.stats
    }

    /// GET with the client-level timeout applied. A request that outlives
    /// the timeout is dropped and reported as `ApiError::Timeout`.
    pub(crate) async fn get(
        &self,
        endpoint: Endpoint,
        path: &str,
    ) -> Result<serde_json::Value, ApiError> {
        let started = Instant::now();
        let result = match tokio::time::timeout(self.timeout, self.transport.get_json(path)).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout(self.timeout)),
        }
        .map_err(|e| match e {
            ApiError::Timeout(_) => ApiError::Timeout(self.timeout),
            other => other,
        });

        let outcome = match &result {
            Ok(_) => Outcome::Ok,
            Err(e) if e.is_timeout() => Outcome::TimedOut,
            Err(_) => Outcome::Failed,
        };
        self.stats.record(endpoint, started.elapsed(), outcome);

        result
    }
}
