//! View Controller: one pipeline run per activation.
//!
//! States move one way only: `Idle -> Loading -> Ready | Failed`. There is no
//! retry transition; re-opening a view means constructing a new controller.
//! After `teardown` the controller never accepts a result, so responses that
//! land late cannot touch its state.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::error::ViewError;
use crate::metrics::{BurnoutRecord, CollaborationRecord, MetricDomain, MetricRecord, ProductivityRecord};
use crate::pipeline::{
    aggregate, count_high_risk, reduce, summarize_scores, MetricMap, ScoreSummary, StatusCounts,
};
use crate::types::Developer;

pub type ProductivityView = ViewController<ProductivityRecord>;
pub type BurnoutView = ViewController<BurnoutRecord>;
pub type CollaborationView = ViewController<CollaborationRecord>;

/// Settled pipeline output for one activation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewData<R> {
    pub roster: Vec<Developer>,
    pub metrics: MetricMap<R>,
    pub counts: StatusCounts,
    pub scores: ScoreSummary,
    /// Burnout only: developers at or above the high-risk gauge threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_risk: Option<usize>,
}

#[derive(Debug, Clone)]
pub enum ViewState<R> {
    Idle,
    Loading,
    Ready(Arc<ViewData<R>>),
    Failed(ViewError),
}

impl<R> ViewState<R> {
    pub fn name(&self) -> &'static str {
        match self {
            ViewState::Idle => "idle",
            ViewState::Loading => "loading",
            ViewState::Ready(_) => "ready",
            ViewState::Failed(_) => "failed",
        }
    }
}

/// What the presentation layer reads: `{loading, error, data}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot<R> {
    pub domain: MetricDomain,
    pub loading: bool,
    pub error: Option<ViewError>,
    pub data: Option<Arc<ViewData<R>>>,
}

struct Slot<R> {
    state: ViewState<R>,
    torn_down: bool,
}

struct Inner<R> {
    client: ApiClient,
    slot: Mutex<Slot<R>>,
}

pub struct ViewController<R> {
    inner: Arc<Inner<R>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<R: MetricRecord> ViewController<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                slot: Mutex::new(Slot {
                    state: ViewState::Idle,
                    torn_down: false,
                }),
            }),
            task: Mutex::new(None),
        }
    }

    pub fn domain(&self) -> MetricDomain {
        R::DOMAIN
    }

    pub fn state(&self) -> ViewState<R> {
        self.inner.slot.lock().state.clone()
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.slot.lock().torn_down
    }

    pub fn snapshot(&self) -> ViewSnapshot<R> {
        let slot = self.inner.slot.lock();
        // An opened view that has not started yet already shows the loading
        // state. A torn-down view will never settle, so it stops loading.
        let (loading, error, data) = match &slot.state {
            ViewState::Idle | ViewState::Loading => (!slot.torn_down, None, None),
            ViewState::Ready(data) => (false, None, Some(data.clone())),
            ViewState::Failed(err) => (false, Some(err.clone()), None),
        };
        ViewSnapshot {
            domain: R::DOMAIN,
            loading,
            error,
            data,
        }
    }

    /// Run the pipeline on the current task and return the settled snapshot.
    ///
    /// Only the first activation does anything; later calls return the
    /// current snapshot unchanged.
    pub async fn load(&self) -> ViewSnapshot<R> {
        self.inner.clone().run().await;
        self.snapshot()
    }

    /// Run the pipeline in the background. Returns `false` if this
    /// controller was already activated or torn down.
    pub fn activate(&self) -> bool {
        if !self.inner.begin() {
            return false;
        }
        let inner = self.inner.clone();
        let handle = tokio::spawn(async move { inner.settle().await });
        *self.task.lock() = Some(handle);
        true
    }

    /// Wait for a background activation to finish.
    pub async fn settled(&self) -> ViewSnapshot<R> {
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    std::panic::resume_unwind(e.into_panic());
                }
            }
        }
        self.snapshot()
    }

    /// Detach the view. In-flight requests are abandoned and any result that
    /// still arrives is dropped.
    pub fn teardown(&self) {
        {
            let mut slot = self.inner.slot.lock();
            slot.torn_down = true;
        }
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
        }
        log::debug!("{} view torn down", R::DOMAIN);
    }
}

impl<R> Drop for ViewController<R> {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}

impl<R: MetricRecord> Inner<R> {
    /// `Idle -> Loading`. False when not idle or already torn down.
    fn begin(&self) -> bool {
        let mut slot = self.slot.lock();
        if slot.torn_down || !matches!(slot.state, ViewState::Idle) {
            return false;
        }
        slot.state = ViewState::Loading;
        true
    }

    async fn run(self: Arc<Self>) {
        if self.begin() {
            self.settle().await;
        }
    }

    async fn settle(&self) {
        let domain = R::DOMAIN;
        log::info!("{}: {}", domain, domain.loading_message());

        let next = match self.client.fetch_roster().await {
            Ok(roster) => {
                let metrics: MetricMap<R> = aggregate(&self.client, &roster).await;
                let counts = reduce(&metrics);
                let scores = summarize_scores(&metrics);
                let high_risk = count_high_risk(&metrics);
                ViewState::Ready(Arc::new(ViewData {
                    roster,
                    metrics,
                    counts,
                    scores,
                    high_risk,
                }))
            }
            Err(e) => {
                log::warn!("{}: {}", domain, e);
                ViewState::Failed(ViewError::from_roster(domain, &e))
            }
        };

        self.commit(next);
    }

    /// Stale-response guard: a torn-down controller keeps its last state.
    fn commit(&self, next: ViewState<R>) {
        let mut slot = self.slot.lock();
        if slot.torn_down {
            log::debug!("{}: discarding {} result after teardown", R::DOMAIN, next.name());
            return;
        }
        log::info!("{}: {}", R::DOMAIN, next.name());
        slot.state = next;
    }
}
