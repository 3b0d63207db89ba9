//! Shared metric pipeline: roster fan-out, merge, and reduction.
//!
//! Every view runs the same pipeline; the metric domain is selected by the
//! record type parameter.

pub mod aggregate;
pub mod reduce;

pub use aggregate::{aggregate, MetricMap};
pub use reduce::{count_high_risk, reduce, summarize_scores, ScoreSummary, StatusCounts};
