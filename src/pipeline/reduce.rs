//! Derived-Statistics Reducer.
//!
//! Pure folds over a settled `MetricMap`. Results do not depend on the map's
//! iteration order.

use std::collections::BTreeMap;

use serde::Serialize;

use super::MetricMap;
use crate::metrics::MetricRecord;
use crate::types::Status;

/// Developers per status label. The domain's known categories are always
/// present (possibly zero); `Error` and unknown labels appear only when seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatusCounts(BTreeMap<Status, usize>);

impl StatusCounts {
    pub fn get(&self, status: &Status) -> usize {
        self.0.get(status).copied().unwrap_or(0)
    }

    /// All categories, including zero-valued ones, in presentation order.
    pub fn iter(&self) -> impl Iterator<Item = (&Status, usize)> {
        self.0.iter().map(|(s, n)| (s, *n))
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn reduce<R: MetricRecord>(map: &MetricMap<R>) -> StatusCounts {
    let mut counts: BTreeMap<Status, usize> = R::DOMAIN
        .categories()
        .iter()
        .map(|s| (s.clone(), 0))
        .collect();

    for record in map.values() {
        *counts.entry(record.status().clone()).or_insert(0) += 1;
    }

    StatusCounts(counts)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub scored: usize,
    pub unavailable: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

pub fn summarize_scores<R: MetricRecord>(map: &MetricMap<R>) -> ScoreSummary {
    let mut scored = 0usize;
    let mut unavailable = 0usize;
    let mut sum = 0.0f64;
    let mut min: Option<f64> = None;
    let mut max: Option<f64> = None;

    for record in map.values() {
        match record.score().value() {
            Some(v) => {
                scored += 1;
                sum += v;
                min = Some(min.map_or(v, |m| m.min(v)));
                max = Some(max.map_or(v, |m| m.max(v)));
            }
            None => unavailable += 1,
        }
    }

    ScoreSummary {
        scored,
        unavailable,
        mean: (scored > 0).then(|| sum / scored as f64),
        min,
        max,
    }
}

/// Developers at or above the domain's high-risk threshold, or `None` for
/// domains without one.
pub fn count_high_risk<R: MetricRecord>(map: &MetricMap<R>) -> Option<usize> {
    R::TRACKS_HIGH_RISK.then(|| map.values().filter(|r| r.is_high_risk()).count())
}
