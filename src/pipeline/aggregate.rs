//! Fan-Out Aggregator.
//!
//! One task per roster entry, all spawned before any is awaited. Results are
//! merged by a single writer after every task has settled, so no consumer
//! ever sees a partially filled map.

use std::collections::HashMap;

use serde::Serialize;
use tokio::task::JoinSet;

use crate::api::ApiClient;
use crate::metrics::MetricRecord;
use crate::types::{Developer, DeveloperId};

/// One record per roster developer, keyed by id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricMap<R> {
    records: HashMap<DeveloperId, R>,
}

impl<R: MetricRecord> MetricMap<R> {
    pub fn get(&self, id: DeveloperId) -> Option<&R> {
        self.records.get(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DeveloperId, &R)> {
        self.records.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &R> {
        self.records.values()
    }

    pub fn fallback_count(&self) -> usize {
        self.records.values().filter(|r| r.is_fallback()).count()
    }

    /// Pair each roster developer with its record, in roster order.
    pub fn in_roster_order<'a>(
        &'a self,
        roster: &'a [Developer],
    ) -> impl Iterator<Item = (&'a Developer, &'a R)> + 'a {
        roster
            .iter()
            .filter_map(move |dev| self.records.get(&dev.id).map(|r| (dev, r)))
    }
}

impl<R> FromIterator<(DeveloperId, R)> for MetricMap<R> {
    fn from_iter<I: IntoIterator<Item = (DeveloperId, R)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Fetch `R` for every developer concurrently and merge by id.
///
/// Cannot fail for a single developer: the metric fetcher already replaced
/// failures with fallback records. A panicking fetch task is a defect and is
/// re-raised here. `roster` must not repeat ids (the roster fetcher rejects
/// such payloads).
pub async fn aggregate<R: MetricRecord>(client: &ApiClient, roster: &[Developer]) -> MetricMap<R> {
    let mut tasks = JoinSet::new();
    for dev in roster {
        let client = client.clone();
        let id = dev.id;
        tasks.spawn(async move { (id, client.fetch_metric::<R>(id).await) });
    }

    let mut records = HashMap::with_capacity(roster.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((id, record)) => {
                records.insert(id, record);
            }
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => panic!("{} metric task cancelled while joined: {}", R::DOMAIN, e),
        }
    }

    assert_eq!(
        records.len(),
        roster.len(),
        "{} results do not cover the roster",
        R::DOMAIN
    );

    let merged = MetricMap { records };
    client
        .stats()
        .record_merge(R::DOMAIN, merged.len(), merged.fallback_count());
    log::info!(
        "{}: merged {} records ({} fallback)",
        R::DOMAIN,
        merged.len(),
        merged.fallback_count()
    );
    merged
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::api::mock::{client_with, client_with_timeout, MockTransport};
    use crate::api::Endpoint;
    use crate::metrics::{BurnoutRecord, CollaborationRecord, MetricDomain, ProductivityRecord};
    use crate::types::{Score, Status};

    fn roster(n: u64) -> Vec<Developer> {
        (1..=n)
            .map(|i| Developer {
                id: DeveloperId(i),
                name: format!("dev-{}", i),
                email: None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_one_record_per_developer_despite_failures() {
        let mut mock = MockTransport::new();
        for i in 1..=6u64 {
            let path = format!("collaboration/{}/", i);
            mock = if i % 3 == 0 {
                mock.with_status(&path, 500)
            } else {
                mock.with_json(&path, json!({"score": 90, "status": "High", "features": {}}))
            };
        }
        let client = client_with(&mock);
        let roster = roster(6);

        let merged: MetricMap<CollaborationRecord> = aggregate(&client, &roster).await;

        assert_eq!(merged.len(), 6);
        assert_eq!(merged.fallback_count(), 2);
        let snapshot = client.stats().snapshot();
        let stats = snapshot
            .endpoint(Endpoint::Metric(MetricDomain::Collaboration))
            .unwrap();
        assert_eq!((stats.ok, stats.failed), (4, 2));
        assert_eq!((stats.developers, stats.fallbacks), (6, 2));
        for dev in &roster {
            let record = merged.get(dev.id).expect("every developer has a record");
            assert_eq!(record.is_fallback(), dev.id.0 % 3 == 0);
        }
    }

    #[tokio::test]
    async fn test_timed_out_developer_gets_fallback() {
        let mock = MockTransport::new()
            .with_json(
                "productivity/1/",
                json!({
                    "score": 85,
                    "status": "High",
                    "features": {"total_lines_changed": 500, "high_value_tickets_closed": 3}
                }),
            )
            .with_hang("productivity/2/");
        let client = client_with_timeout(&mock, Duration::from_millis(100));
        let roster = vec![
            Developer {
                id: DeveloperId(1),
                name: "Alice".to_string(),
                email: None,
            },
            Developer {
                id: DeveloperId(2),
                name: "Bob".to_string(),
                email: None,
            },
        ];

        let merged: MetricMap<ProductivityRecord> = aggregate(&client, &roster).await;

        assert_eq!(merged.len(), 2);
        let alice = merged.get(DeveloperId(1)).unwrap();
        assert_eq!(alice.score, Score::Value(85.0));
        assert_eq!(alice.status, Status::High);
        assert_eq!(
            serde_json::to_value(merged.get(DeveloperId(2)).unwrap()).unwrap(),
            json!({"score": "N/A", "status": "Error"})
        );
    }

    #[tokio::test]
    async fn test_fractional_feature_values_keep_real_data() {
        let mock = MockTransport::new()
            .with_json(
                "burnout/1/",
                json!({
                    "risk_level": "High",
                    "risk_score": 64.0,
                    "features": {"open_tickets": 2.0, "after_hours_ratio": null}
                }),
            )
            .with_json(
                "burnout/2/",
                json!({"risk_level": "Low", "risk_score": 8.5, "features": null}),
            );
        let client = client_with(&mock);

        let merged: MetricMap<BurnoutRecord> = aggregate(&client, &roster(2)).await;

        assert_eq!(merged.fallback_count(), 0);
        let counts = crate::pipeline::reduce(&merged);
        assert_eq!(counts.get(&Status::Error), 0);
        assert_eq!(counts.get(&Status::High), 1);
        assert_eq!(counts.get(&Status::Low), 1);
    }

    #[tokio::test]
    async fn test_requests_are_issued_concurrently() {
        let mut mock = MockTransport::new();
        for i in 1..=5u64 {
            mock = mock.with_delayed_json(
                &format!("productivity/{}/", i),
                Duration::from_millis(150),
                json!({"score": 40, "status": "Low"}),
            );
        }
        let client = client_with(&mock);

        let merged: MetricMap<ProductivityRecord> = aggregate(&client, &roster(5)).await;

        assert_eq!(merged.len(), 5);
        assert_eq!(mock.max_in_flight(), 5);
    }

    #[tokio::test]
    async fn test_roster_order_independent_of_completion_order() {
        // Later roster entries answer first.
        let mock = MockTransport::new()
            .with_delayed_json(
                "productivity/1/",
                Duration::from_millis(120),
                json!({"score": 10, "status": "Low"}),
            )
            .with_delayed_json(
                "productivity/2/",
                Duration::from_millis(60),
                json!({"score": 55, "status": "Medium"}),
            )
            .with_json("productivity/3/", json!({"score": 95, "status": "High"}));
        let client = client_with(&mock);
        let roster = roster(3);

        let merged: MetricMap<ProductivityRecord> = aggregate(&client, &roster).await;

        let names: Vec<&str> = merged
            .in_roster_order(&roster)
            .map(|(dev, _)| dev.name.as_str())
            .collect();
        assert_eq!(names, vec!["dev-1", "dev-2", "dev-3"]);
    }

    #[tokio::test]
    async fn test_empty_roster_issues_no_requests() {
        let mock = MockTransport::new();
        let client = client_with(&mock);

        let merged: MetricMap<ProductivityRecord> = aggregate(&client, &[]).await;

        assert!(merged.is_empty());
        assert!(mock.requests().is_empty());
    }
}
