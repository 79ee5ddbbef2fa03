use super::pick::{Pick, PickDefaults};
use crate::snapshot::SnapshotSource;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Load every requested date and concatenate the rows into one dataset.
///
/// Dates are visited ascending and each row keeps its position within its
/// snapshot, so the output order is (date, original row order). Dates with
/// no snapshot contribute nothing; snapshots that fail to load are skipped
/// with a warning. Never fails: no data is an empty dataset.
pub fn merge_snapshots<S>(source: &S, dates: &BTreeSet<NaiveDate>, defaults: &PickDefaults) -> Vec<Pick>
where
    S: SnapshotSource + ?Sized,
{
    let mut merged = Vec::new();

    for &date in dates {
        match source.load_rows(date) {
            Ok(Some(rows)) => {
                tracing::debug!(date = %date, rows = rows.len(), "snapshot loaded");
                merged.extend(rows.iter().map(|row| Pick::from_raw(date, row, defaults)));
            }
            Ok(None) => {
                tracing::debug!(date = %date, "no snapshot for date");
            }
            Err(e) => {
                tracing::warn!(date = %date, error = %e, "skipping malformed snapshot");
            }
        }
    }

    merged
}
