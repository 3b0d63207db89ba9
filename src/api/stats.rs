//! Per-endpoint request statistics for one `ApiClient`.
//!
//! Each endpoint (the roster or one metric domain) keeps its most recent
//! request durations and outcome counters. Fallback totals come from merged
//! `MetricMap`s, so they always agree with what the views display.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Serialize, Serializer};

use crate::metrics::MetricDomain;

const RECENT_REQUESTS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Roster,
    Metric(MetricDomain),
}

impl Endpoint {
    pub fn label(&self) -> &'static str {
        match self {
            Endpoint::Roster => "developers",
            Endpoint::Metric(domain) => domain.as_str(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Endpoint::Roster => 0,
            Endpoint::Metric(MetricDomain::Productivity) => 1,
            Endpoint::Metric(MetricDomain::Burnout) => 2,
            Endpoint::Metric(MetricDomain::Collaboration) => 3,
        }
    }
}

impl Serialize for Endpoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// How a single request ended, as seen by `ApiClient::get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Failed,
    TimedOut,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointStats {
    pub endpoint: Endpoint,
    pub ok: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub median_ms: u64,
    pub p95_ms: u64,
    pub slowest_ms: u64,
    /// Developers merged for this domain across all aggregations.
    pub developers: u64,
    pub fallbacks: u64,
}

impl EndpointStats {
    pub fn requests(&self) -> u64 {
        self.ok + self.failed + self.timed_out
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub generated_at: DateTime<Utc>,
    pub endpoints: Vec<EndpointStats>,
}

impl StatsSnapshot {
    pub fn endpoint(&self, endpoint: Endpoint) -> Option<&EndpointStats> {
        self.endpoints.iter().find(|s| s.endpoint == endpoint)
    }
}

#[derive(Debug, Default)]
struct Window {
    recent: VecDeque<Duration>,
    ok: u64,
    failed: u64,
    timed_out: u64,
    developers: u64,
    fallbacks: u64,
}

#[derive(Debug, Default)]
pub struct RequestStats {
    windows: Mutex<HashMap<Endpoint, Window>>,
}

impl RequestStats {
    pub fn record(&self, endpoint: Endpoint, elapsed: Duration, outcome: Outcome) {
        let mut windows = self.windows.lock();
        let window = windows.entry(endpoint).or_default();
        match outcome {
            Outcome::Ok => window.ok += 1,
            Outcome::Failed => window.failed += 1,
            Outcome::TimedOut => window.timed_out += 1,
        }
        if window.recent.len() == RECENT_REQUESTS {
            window.recent.pop_front();
        }
        window.recent.push_back(elapsed);
    }

    /// Account for one settled aggregation of `domain`.
    pub fn record_merge(&self, domain: MetricDomain, developers: usize, fallbacks: usize) {
        let mut windows = self.windows.lock();
        let window = windows.entry(Endpoint::Metric(domain)).or_default();
        window.developers += developers as u64;
        window.fallbacks += fallbacks as u64;
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let windows = self.windows.lock();
        let mut endpoints: Vec<EndpointStats> = windows
            .iter()
            .map(|(endpoint, window)| {
                let mut sorted: Vec<Duration> = window.recent.iter().copied().collect();
                sorted.sort_unstable();
                EndpointStats {
                    endpoint: *endpoint,
                    ok: window.ok,
                    failed: window.failed,
                    timed_out: window.timed_out,
                    median_ms: as_ms(nearest_rank(&sorted, 50)),
                    p95_ms: as_ms(nearest_rank(&sorted, 95)),
                    slowest_ms: as_ms(sorted.last().copied().unwrap_or_default()),
                    developers: window.developers,
                    fallbacks: window.fallbacks,
                }
            })
            .collect();
        endpoints.sort_by_key(|s| s.endpoint.rank());

        StatsSnapshot {
            generated_at: Utc::now(),
            endpoints,
        }
    }
}

/// Nearest-rank percentile of an ascending slice; zero when empty.
fn nearest_rank(sorted: &[Duration], pct: usize) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let rank = (sorted.len() * pct).div_ceil(100).max(1);
    sorted[rank - 1]
}

fn as_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BURNOUT: Endpoint = Endpoint::Metric(MetricDomain::Burnout);

    #[test]
    fn test_nearest_rank() {
        assert_eq!(nearest_rank(&[], 95), Duration::ZERO);
        let sorted: Vec<Duration> = (1..=10).map(Duration::from_millis).collect();
        assert_eq!(nearest_rank(&sorted, 50), Duration::from_millis(5));
        assert_eq!(nearest_rank(&sorted, 95), Duration::from_millis(10));
        assert_eq!(nearest_rank(&sorted, 0), Duration::from_millis(1));
    }

    #[test]
    fn test_recent_window_is_bounded_counters_are_not() {
        let stats = RequestStats::default();
        for ms in 1..=300 {
            stats.record(BURNOUT, Duration::from_millis(ms), Outcome::Ok);
        }
        let snapshot = stats.snapshot();
        let burnout = snapshot.endpoint(BURNOUT).unwrap();
        assert_eq!(burnout.requests(), 300);
        assert_eq!(burnout.slowest_ms, 300);
        // Only the last 256 durations (45..=300) are kept.
        assert_eq!(burnout.median_ms, 172);
    }

    #[test]
    fn test_outcomes_and_merges_are_counted_separately() {
        let stats = RequestStats::default();
        let productivity = Endpoint::Metric(MetricDomain::Productivity);
        stats.record(productivity, Duration::from_millis(40), Outcome::Ok);
        stats.record(productivity, Duration::from_millis(100), Outcome::TimedOut);
        stats.record(productivity, Duration::from_millis(5), Outcome::Failed);
        stats.record_merge(MetricDomain::Productivity, 3, 2);

        let snapshot = stats.snapshot();
        let row = snapshot.endpoint(productivity).unwrap();
        assert_eq!((row.ok, row.failed, row.timed_out), (1, 1, 1));
        assert_eq!(row.developers, 3);
        assert_eq!(row.fallbacks, 2);
    }

    #[test]
    fn test_snapshot_lists_roster_first() {
        let stats = RequestStats::default();
        stats.record(BURNOUT, Duration::from_millis(900), Outcome::Ok);
        stats.record(Endpoint::Roster, Duration::from_millis(10), Outcome::Ok);

        let snapshot = stats.snapshot();
        let labels: Vec<&str> = snapshot.endpoints.iter().map(|s| s.endpoint.label()).collect();
        assert_eq!(labels, vec!["developers", "burnout"]);
        assert_eq!(
            serde_json::to_value(&snapshot.endpoints[0]).unwrap()["endpoint"],
            "developers"
        );
    }
}
