pub mod cache;
pub mod dir;

use crate::dataset::pick::RawRow;
use crate::errors::DashResult;
use chrono::NaiveDate;

/// Backing store of dated snapshots. Implementations own the storage format;
/// the rest of the crate only sees dates and loosely-typed rows.
/// Send + Sync required so one source can back every HTTP handler.
pub trait SnapshotSource: Send + Sync {
    /// Dates that have a snapshot, ascending.
    fn list_available_dates(&self) -> DashResult<Vec<NaiveDate>>;

    /// Rows for one date. `Ok(None)` means no snapshot exists for that date;
    /// `Err` means one exists but could not be read or parsed.
    fn load_rows(&self, date: NaiveDate) -> DashResult<Option<Vec<RawRow>>>;

    /// Fingerprint of the current contents. A change drops every cached
    /// result. `None` means the source cannot tell, so only explicit
    /// invalidation clears the cache.
    fn revision(&self) -> Option<u64> {
        None
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use super::SnapshotSource;
    use crate::dataset::pick::RawRow;
    use crate::errors::{DashError, DashResult};
    use chrono::NaiveDate;
    use portable_atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::collections::BTreeMap;

    pub enum Stored {
        Rows(Vec<RawRow>),
        Malformed,
    }

    /// In-memory source for tests. Counts `load_rows` calls.
    #[derive(Default)]
    pub struct MemorySource {
        pub snapshots: BTreeMap<NaiveDate, Stored>,
        pub loads: AtomicUsize,
        pub revision: AtomicU64,
    }

    impl MemorySource {
        pub fn with(mut self, date: NaiveDate, rows: serde_json::Value) -> Self {
            let rows = match rows {
                serde_json::Value::Array(items) => items
                    .into_iter()
                    .filter_map(|v| match v {
                        serde_json::Value::Object(m) => Some(m),
                        _ => None,
                    })
                    .collect(),
                _ => Vec::new(),
            };
            self.snapshots.insert(date, Stored::Rows(rows));
            self
        }

        pub fn with_malformed(mut self, date: NaiveDate) -> Self {
            self.snapshots.insert(date, Stored::Malformed);
            self
        }
    }

    impl SnapshotSource for MemorySource {
        fn list_available_dates(&self) -> DashResult<Vec<NaiveDate>> {
            Ok(self.snapshots.keys().copied().collect())
        }

        fn load_rows(&self, date: NaiveDate) -> DashResult<Option<Vec<RawRow>>> {
            self.loads.fetch_add(1, Ordering::Relaxed);
            match self.snapshots.get(&date) {
                None => Ok(None),
                Some(Stored::Rows(rows)) => Ok(Some(rows.clone())),
                Some(Stored::Malformed) => Err(DashError::Parse(format!("bad snapshot {date}"))),
            }
        }

        fn revision(&self) -> Option<u64> {
            Some(self.revision.load(Ordering::Relaxed))
        }
    }
}
