pub mod export;

use crate::dataset::filters::{apply_filters, FilterSpec};
use crate::dataset::pick::Pick;
use crate::metrics::summary::{compute_metrics, EnrichedPick, MetricsSummary, RoiMode};
use crate::snapshot::cache::SnapshotCache;
use crate::snapshot::SnapshotSource;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Knobs that are configuration, not filters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportOptions {
    pub stake: f64,
    pub roi_mode: RoiMode,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            stake: 2.0,
            roi_mode: RoiMode::StakeNormalized,
        }
    }
}

/// Which snapshot dates a request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSelection {
    /// Most recent available date.
    Latest,
    Single(NaiveDate),
    /// Inclusive; an open end runs to the first/last available date.
    Range {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl DateSelection {
    /// Available dates covered by this selection. Dates with no snapshot
    /// are dropped; an empty set is a valid, empty selection.
    pub fn resolve(&self, available: &[NaiveDate]) -> BTreeSet<NaiveDate> {
        match *self {
            DateSelection::Latest => available.iter().max().copied().into_iter().collect(),
            DateSelection::Single(date) => available.iter().copied().filter(|d| *d == date).collect(),
            DateSelection::Range { from, to } => {
                let (from, to) = match (from, to) {
                    (Some(a), Some(b)) if a > b => (Some(b), Some(a)),
                    other => other,
                };
                available
                    .iter()
                    .copied()
                    .filter(|d| from.map_or(true, |f| *d >= f) && to.map_or(true, |t| *d <= t))
                    .collect()
            }
        }
    }
}

/// Everything the presentation layer renders for one request.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Report {
    pub dates: Vec<NaiveDate>,
    pub merged_count: usize,
    pub filtered_count: usize,
    pub removed_by_selection: usize,
    pub removed_by_range: usize,
    pub metrics: MetricsSummary,
    pub rows: Vec<EnrichedPick>,
}

impl Report {
    /// Download name, e.g. `resumen_2024-11-01.csv` or
    /// `resumen_2024-11-01_2024-11-07.csv`.
    pub fn csv_file_name(&self) -> String {
        match (self.dates.first(), self.dates.last()) {
            (Some(first), Some(last)) if first == last => format!("resumen_{first}.csv"),
            (Some(first), Some(last)) => format!("resumen_{first}_{last}.csv"),
            _ => "resumen.csv".to_string(),
        }
    }
}

/// Filter and aggregate an already-merged dataset. Pure.
pub fn build_report(
    picks: &[Pick],
    dates: &BTreeSet<NaiveDate>,
    filters: &FilterSpec,
    opts: &ReportOptions,
) -> Report {
    let filtered = apply_filters(picks, filters);
    let filtered_count = filtered.rows.len();
    let (rows, metrics) = compute_metrics(filtered.rows.iter().copied(), opts.stake, opts.roi_mode);

    Report {
        dates: dates.iter().copied().collect(),
        merged_count: picks.len(),
        filtered_count,
        removed_by_selection: filtered.removed_by_selection,
        removed_by_range: filtered.removed_by_range,
        metrics,
        rows,
    }
}

/// Load (through the cache), filter and aggregate.
pub fn compute<S: SnapshotSource>(
    cache: &SnapshotCache<S>,
    dates: &BTreeSet<NaiveDate>,
    filters: &FilterSpec,
    opts: &ReportOptions,
) -> Report {
    let picks = cache.picks(dates);
    let report = build_report(&picks, dates, filters, opts);
    tracing::debug!(
        dates = dates.len(),
        merged = report.merged_count,
        filtered = report.filtered_count,
        range_filters = filters.has_range_filters(),
        "report computed"
    );
    report
}
