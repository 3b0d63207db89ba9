//! Per-Entity Metric Fetcher.
//!
//! This is the one place where a failed metric request turns into a
//! fallback record. Callers of `fetch_metric` never see an error.

use super::{ApiClient, Endpoint};
use crate::error::MetricFetchError;
use crate::metrics::MetricRecord;
use crate::types::DeveloperId;

impl ApiClient {
    /// Fetch and decode one developer's record for `R::DOMAIN`.
    pub async fn try_fetch_metric<R: MetricRecord>(
        &self,
        id: DeveloperId,
    ) -> Result<R, MetricFetchError> {
        let domain = R::DOMAIN;
        let json = self
            .get(Endpoint::Metric(domain), &domain.endpoint(id))
            .await
            .map_err(|source| MetricFetchError::Request { domain, id, source })?;

        serde_json::from_value(json).map_err(|e| MetricFetchError::Malformed {
            domain,
            id,
            reason: e.to_string(),
        })
    }

    /// Fetch one developer's record, substituting `R::fallback()` on any
    /// failure (network, timeout, non-2xx, malformed body).
    pub async fn fetch_metric<R: MetricRecord>(&self, id: DeveloperId) -> R {
        match self.try_fetch_metric::<R>(id).await {
            Ok(record) => record,
            Err(e) => {
                log::warn!("{}", e);
                R::fallback()
            }
        }
    }
}
