//! Burnout risk (`GET burnout/{id}/`).
//!
//! The service classifies each developer as High or Low risk and reports the
//! probability of the High class as `risk_score` (0-100).

use serde::{Deserialize, Serialize};

use super::{fmt_ratio, MetricDomain, MetricRecord, Tone};
use crate::types::{Score, Status};

/// Gauge threshold at which a risk score is drawn as high risk.
pub const HIGH_RISK_SCORE: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnoutRecord {
    pub risk_score: Score,
    pub risk_level: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<BurnoutFeatures>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BurnoutFeatures {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_hours_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekend_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_tickets: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_time_spent: Option<f64>,
}

impl MetricRecord for BurnoutRecord {
    const DOMAIN: MetricDomain = MetricDomain::Burnout;
    const TRACKS_HIGH_RISK: bool = true;

    fn fallback() -> Self {
        Self {
            risk_score: Score::NotAvailable,
            risk_level: Status::Error,
            features: None,
        }
    }

    fn status(&self) -> &Status {
        &self.risk_level
    }

    fn score(&self) -> Score {
        self.risk_score
    }

    fn is_high_risk(&self) -> bool {
        self.risk_score
            .value()
            .map(|v| v >= HIGH_RISK_SCORE)
            .unwrap_or(false)
    }

    fn tone(&self) -> Tone {
        match self.risk_level {
            Status::High => Tone::Alert,
            Status::Low => Tone::Good,
            _ => Tone::Neutral,
        }
    }

    fn feature_summary(&self) -> String {
        let features = self.features.clone().unwrap_or_default();
        format!(
            "After hours: {} | Weekend: {} | Open: {} | Avg hours: {}",
            fmt_ratio(features.after_hours_ratio),
            fmt_ratio(features.weekend_ratio),
            features
                .open_tickets
                .map(|n| format!("{:.0}", n))
                .unwrap_or_else(|| "N/A".to_string()),
            fmt_ratio(features.avg_time_spent),
        )
    }
}
