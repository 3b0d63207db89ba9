//! Error types for the metric pipeline
//!
//! Errors are classified by blast radius:
//! - Roster: fatal to the view activation, shown to the user
//! - Metric: absorbed per developer, replaced by a fallback record
//! - Config: reported before any view is activated

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::metrics::MetricDomain;
use crate::types::DeveloperId;

/// Transport-level failure for a single request.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout(_))
    }
}

#[derive(Debug, Clone, Error)]
pub enum RosterFetchError {
    #[error("Roster request failed: {0}")]
    Request(#[from] ApiError),

    #[error("Roster payload malformed: {0}")]
    Malformed(String),

    #[error("Roster lists developer {0} more than once")]
    DuplicateDeveloper(DeveloperId),
}

/// Per-developer metric failure. Never leaves the metric fetcher: it is
/// logged and replaced by the domain's fallback record.
#[derive(Debug, Clone, Error)]
pub enum MetricFetchError {
    #[error("{domain} metric request for developer {id} failed: {source}")]
    Request {
        domain: MetricDomain,
        id: DeveloperId,
        #[source]
        source: ApiError,
    },

    #[error("{domain} metric for developer {id} malformed: {reason}")]
    Malformed {
        domain: MetricDomain,
        id: DeveloperId,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not find home directory")]
    NoHomeDir,

    #[error("Failed to read config at {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

impl RosterFetchError {
    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            RosterFetchError::Request(ApiError::Network(_)) => {
                "Check that the analytics API is running and reachable."
            }
            RosterFetchError::Request(ApiError::Timeout(_)) => {
                "The analytics API took too long to answer. Reopen the view to try again."
            }
            RosterFetchError::Request(ApiError::Status { .. }) => {
                "The analytics API returned an error. Check the server logs."
            }
            RosterFetchError::Request(ApiError::InvalidUrl(_)) => {
                "Check baseUrl in ~/.teampulse/config.json"
            }
            RosterFetchError::Request(ApiError::Decode(_))
            | RosterFetchError::Malformed(_)
            | RosterFetchError::DuplicateDeveloper(_) => {
                "The developer roster could not be read. Check the API version."
            }
        }
    }
}

/// Serializable error shown in place of a view's data.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewError {
    pub message: String,
    pub detail: String,
    pub recovery_suggestion: String,
}

impl ViewError {
    pub fn from_roster(domain: MetricDomain, err: &RosterFetchError) -> Self {
        ViewError {
            message: domain.failure_message().to_string(),
            detail: err.to_string(),
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}
