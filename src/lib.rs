//! TeamPulse client: fetches per-developer metrics from the analytics API,
//! isolates per-developer failures, and derives the summaries the dashboard
//! views draw.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod view;

pub use api::ApiClient;
pub use config::ApiConfig;
pub use metrics::{MetricDomain, MetricRecord};
pub use view::{BurnoutView, CollaborationView, ProductivityView, ViewController, ViewState};
