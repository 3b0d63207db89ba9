//! Productivity score (`GET productivity/{id}/`).
//!
//! Regression over commit volume and high-value ticket throughput,
//! normalized by the service to 0-100.

use serde::{Deserialize, Serialize};

use super::{MetricDomain, MetricRecord, Tone};
use crate::types::{Score, Status};

pub const HIGH_SCORE: f64 = 80.0;
pub const MEDIUM_SCORE: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductivityRecord {
    pub score: Score,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<ProductivityFeatures>,
}

/// Feature values are plain JSON numbers; missing or `null` reads as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductivityFeatures {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_lines_changed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_value_tickets_closed: Option<f64>,
}

impl MetricRecord for ProductivityRecord {
    const DOMAIN: MetricDomain = MetricDomain::Productivity;

    fn fallback() -> Self {
        Self {
            score: Score::NotAvailable,
            status: Status::Error,
            features: None,
        }
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn score(&self) -> Score {
        self.score
    }

    fn tone(&self) -> Tone {
        if self.status == Status::Error {
            return Tone::Neutral;
        }
        match self.score.value() {
            Some(v) if v >= HIGH_SCORE => Tone::Good,
            Some(v) if v >= MEDIUM_SCORE => Tone::Caution,
            _ => Tone::Alert,
        }
    }

    fn feature_summary(&self) -> String {
        let features = self.features.clone().unwrap_or_default();
        format!(
            "Lines: {:.0} | Tickets: {:.0}",
            features.total_lines_changed.unwrap_or(0.0),
            features.high_value_tickets_closed.unwrap_or(0.0)
        )
    }
}
