//! Collaboration score (`GET collaboration/{id}/`).
//!
//! Three-class model over chat sentiment and quick-response ratio; the
//! service maps High/Medium/Low to scores 90/60/30.

use serde::{Deserialize, Serialize};

use super::{fmt_ratio, MetricDomain, MetricRecord, Tone};
use crate::types::{Score, Status};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationRecord {
    pub score: Score,
    pub status: Status,
    /// Always present on the wire, `{}` for fallback records.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub features: CollaborationFeatures,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollaborationFeatures {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_sentiment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_ratio: Option<f64>,
}

impl MetricRecord for CollaborationRecord {
    const DOMAIN: MetricDomain = MetricDomain::Collaboration;

    fn fallback() -> Self {
        Self {
            score: Score::NotAvailable,
            status: Status::Error,
            features: CollaborationFeatures::default(),
        }
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn score(&self) -> Score {
        self.score
    }

    fn tone(&self) -> Tone {
        match self.status {
            Status::High => Tone::Good,
            Status::Medium => Tone::Caution,
            Status::Error => Tone::Neutral,
            _ => Tone::Alert,
        }
    }

    fn feature_summary(&self) -> String {
        format!(
            "Sentiment: {} | Ratio: {}",
            fmt_ratio(self.features.avg_sentiment),
            fmt_ratio(self.features.response_ratio)
        )
    }
}
