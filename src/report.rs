//! Presentation-facing projection of a settled view.
//!
//! Rows follow roster order. Chart slices cover only the domain's known
//! categories and drop zero-valued ones; the full counts (zeros, `Error` and
//! unknown labels included) stay available alongside.

use serde::Serialize;

use crate::metrics::burnout::HIGH_RISK_SCORE;
use crate::metrics::{MetricDomain, MetricRecord, Tone};
use crate::pipeline::{ScoreSummary, StatusCounts};
use crate::types::{DeveloperId, Score, Status};
use crate::view::ViewData;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub developer_id: DeveloperId,
    pub name: String,
    pub score: Score,
    pub status: Status,
    pub tone: Tone,
    pub features: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSlice {
    pub label: Status,
    pub value: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewReport {
    pub domain: MetricDomain,
    pub title: String,
    pub generated_at: String,
    pub rows: Vec<ReportRow>,
    pub counts: StatusCounts,
    pub chart: Vec<ChartSlice>,
    pub scores: ScoreSummary,
    pub fallbacks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_risk: Option<usize>,
}

impl ViewReport {
    pub fn from_data<R: MetricRecord>(data: &ViewData<R>) -> Self {
        let rows = data
            .metrics
            .in_roster_order(&data.roster)
            .map(|(dev, record)| ReportRow {
                developer_id: dev.id,
                name: dev.name.clone(),
                score: record.score(),
                status: record.status().clone(),
                tone: record.tone(),
                features: record.feature_summary(),
            })
            .collect();

        ViewReport {
            domain: R::DOMAIN,
            title: R::DOMAIN.title().to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            rows,
            counts: data.counts.clone(),
            chart: chart_slices(R::DOMAIN, &data.counts),
            scores: data.scores.clone(),
            fallbacks: data.metrics.fallback_count(),
            high_risk: data.high_risk,
        }
    }

    /// Plain-text table for terminals.
    pub fn render_table(&self) -> String {
        let headers = ["Developer", "Score", "Status", "Features"];
        let cells: Vec<[String; 4]> = self
            .rows
            .iter()
            .map(|row| {
                [
                    row.name.clone(),
                    score_cell(row.score),
                    row.status.to_string(),
                    row.features.clone(),
                ]
            })
            .collect();

        let mut widths = headers.map(|h| h.chars().count());
        for row in &cells {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&format_line(&headers.map(String::from), &widths));
        out.push_str(&format_line(&widths.map(|w| "-".repeat(w)), &widths));
        for row in &cells {
            out.push_str(&format_line(row, &widths));
        }

        if !self.chart.is_empty() {
            let distribution: Vec<String> = self
                .chart
                .iter()
                .map(|s| format!("{}: {} ({:.0}%)", s.label, s.value, s.percent))
                .collect();
            out.push('\n');
            out.push_str(&distribution.join(" | "));
            out.push('\n');
        }
        if let Some(high_risk) = self.high_risk {
            out.push_str(&format!(
                "{} of {} developers at or above {:.0}% burnout risk.\n",
                high_risk,
                self.rows.len(),
                HIGH_RISK_SCORE
            ));
        }
        if self.fallbacks > 0 {
            out.push_str(&format!(
                "{} of {} developers have no {} data.\n",
                self.fallbacks,
                self.rows.len(),
                self.domain
            ));
        }
        out
    }
}

/// Non-empty known categories of `domain` with their share of the charted
/// total. `Error` and unknown labels are not drawn.
pub fn chart_slices(domain: MetricDomain, counts: &StatusCounts) -> Vec<ChartSlice> {
    let drawn: Vec<(Status, usize)> = domain
        .categories()
        .iter()
        .map(|status| (status.clone(), counts.get(status)))
        .filter(|(_, n)| *n > 0)
        .collect();
    let total: usize = drawn.iter().map(|(_, n)| n).sum();
    drawn
        .into_iter()
        .map(|(label, value)| ChartSlice {
            label,
            value,
            percent: value as f64 * 100.0 / total as f64,
        })
        .collect()
}

fn score_cell(score: Score) -> String {
    match score {
        Score::Value(_) => format!("{}%", score),
        Score::NotAvailable => score.to_string(),
    }
}

fn format_line(cells: &[String; 4], widths: &[usize; 4]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
        .collect();
    format!("{}\n", padded.join("  ").trim_end())
}
