//! Metric domains served by the analytics API.
//!
//! Each domain has its own record type; the shared pipeline only sees them
//! through `MetricRecord`, which supplies the decoder (serde), the fallback
//! record and the status/score accessors the reducer needs.

pub mod burnout;
pub mod collaboration;
pub mod productivity;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{DeveloperId, Score, Status};

pub use burnout::{BurnoutFeatures, BurnoutRecord};
pub use collaboration::{CollaborationFeatures, CollaborationRecord};
pub use productivity::{ProductivityFeatures, ProductivityRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricDomain {
    Productivity,
    Burnout,
    Collaboration,
}

impl MetricDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricDomain::Productivity => "productivity",
            MetricDomain::Burnout => "burnout",
            MetricDomain::Collaboration => "collaboration",
        }
    }

    /// Relative endpoint for one developer, e.g. `burnout/7/`.
    pub fn endpoint(&self, id: DeveloperId) -> String {
        format!("{}/{}/", self.as_str(), id)
    }

    /// Categories the service can return, counted even when empty.
    pub fn categories(&self) -> &'static [Status] {
        const GRADED: &[Status] = &[Status::High, Status::Medium, Status::Low];
        const BINARY: &[Status] = &[Status::High, Status::Low];
        match self {
            MetricDomain::Productivity | MetricDomain::Collaboration => GRADED,
            MetricDomain::Burnout => BINARY,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            MetricDomain::Productivity => "Developer Productivity Score",
            MetricDomain::Burnout => "Burnout Risk Analysis",
            MetricDomain::Collaboration => "Team Collaboration Score",
        }
    }

    pub fn loading_message(&self) -> &'static str {
        match self {
            MetricDomain::Productivity => "Loading Productivity Metrics...",
            MetricDomain::Burnout => "Loading TeamPulse Intelligence...",
            MetricDomain::Collaboration => "Loading Collaboration Scores...",
        }
    }

    /// User-facing message when the view cannot load. The burnout view is the
    /// team overview, so it names team data.
    pub fn failure_message(&self) -> &'static str {
        match self {
            MetricDomain::Productivity => "Failed to fetch productivity data from the backend API.",
            MetricDomain::Burnout => "Failed to fetch team data from the backend API.",
            MetricDomain::Collaboration => "Failed to fetch collaboration data from the backend API.",
        }
    }
}

impl fmt::Display for MetricDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a consumer should color a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Good,
    Caution,
    Alert,
    Neutral,
}

/// A per-developer record for one metric domain.
pub trait MetricRecord:
    DeserializeOwned + Serialize + Clone + fmt::Debug + Send + Sync + 'static
{
    const DOMAIN: MetricDomain;

    /// Record substituted when the fetch for a developer fails.
    fn fallback() -> Self;

    fn status(&self) -> &Status;

    fn score(&self) -> Score;

    fn tone(&self) -> Tone;

    /// One-line rendering of the model's input features.
    fn feature_summary(&self) -> String;

    /// Whether the domain draws a high-risk threshold at all.
    const TRACKS_HIGH_RISK: bool = false;

    /// At or above the domain's high-risk threshold.
    fn is_high_risk(&self) -> bool {
        false
    }

    fn is_fallback(&self) -> bool {
        *self.status() == Status::Error && !self.score().is_available()
    }
}

/// Reads `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn fmt_ratio(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "N/A".to_string(),
    }
}
