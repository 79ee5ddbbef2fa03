use super::SnapshotSource;
use crate::dataset::merger::merge_snapshots;
use crate::dataset::pick::{Pick, PickDefaults};
use crate::errors::DashResult;
use chrono::NaiveDate;
use portable_atomic::{AtomicU64, Ordering};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Read-through cache in front of a [`SnapshotSource`].
///
/// Merged datasets are keyed by the exact set of requested dates. The whole
/// cache is dropped when the source reports a new revision or on
/// [`SnapshotCache::invalidate`]. A miss just reloads, so callers never see
/// a difference except latency.
pub struct SnapshotCache<S> {
    source: S,
    defaults: PickDefaults,
    capacity: usize,
    inner: Mutex<CacheInner>,
    counters: CacheCounters,
}

#[derive(Default)]
struct CacheInner {
    revision: Option<u64>,
    dates: Option<Arc<Vec<NaiveDate>>>,
    frames: HashMap<BTreeSet<NaiveDate>, Arc<Vec<Pick>>>,
    /// Insertion order, oldest first, for eviction.
    order: VecDeque<BTreeSet<NaiveDate>>,
}

impl CacheInner {
    fn clear(&mut self) {
        self.dates = None;
        self.frames.clear();
        self.order.clear();
    }
}

// ── Counters (lock-free) ──

struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
    pub entries: usize,
    pub capacity: usize,
}

impl<S: SnapshotSource> SnapshotCache<S> {
    /// `capacity` bounds the number of cached date sets; 0 disables caching.
    pub fn new(source: S, defaults: PickDefaults, capacity: usize) -> Self {
        Self {
            source,
            defaults,
            capacity,
            inner: Mutex::new(CacheInner::default()),
            counters: CacheCounters {
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                invalidations: AtomicU64::new(0),
            },
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    // A poisoned lock only means another reader panicked mid-insert; the
    // map itself is still consistent.
    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop everything if the source changed since the last look.
    fn sync_revision(&self, inner: &mut CacheInner) {
        let current = self.source.revision();
        if current.is_none() || current == inner.revision {
            return;
        }
        if inner.revision.is_some() {
            self.counters.invalidations.fetch_add(1, Ordering::Relaxed);
            tracing::info!(entries = inner.frames.len(), "snapshot source changed, cache dropped");
        }
        inner.clear();
        inner.revision = current;
    }

    /// Available snapshot dates, ascending.
    pub fn available_dates(&self) -> DashResult<Arc<Vec<NaiveDate>>> {
        let mut inner = self.lock();
        self.sync_revision(&mut inner);
        if let Some(dates) = &inner.dates {
            return Ok(Arc::clone(dates));
        }
        let dates = Arc::new(self.source.list_available_dates()?);
        if self.capacity > 0 {
            inner.dates = Some(Arc::clone(&dates));
        }
        Ok(dates)
    }

    /// Merged dataset for exactly these dates.
    pub fn picks(&self, dates: &BTreeSet<NaiveDate>) -> Arc<Vec<Pick>> {
        let revision = {
            let mut inner = self.lock();
            self.sync_revision(&mut inner);
            if let Some(frame) = inner.frames.get(dates) {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(dates = dates.len(), "dataset cache hit");
                return Arc::clone(frame);
            }
            inner.revision
        };

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(dates = dates.len(), "dataset cache miss");
        let frame = Arc::new(merge_snapshots(&self.source, dates, &self.defaults));

        if self.capacity > 0 {
            let mut inner = self.lock();
            // Skip the insert if the source moved on while we were loading.
            if inner.revision == revision && !inner.frames.contains_key(dates) {
                while inner.frames.len() >= self.capacity {
                    let Some(oldest) = inner.order.pop_front() else {
                        break;
                    };
                    inner.frames.remove(&oldest);
                }
                inner.frames.insert(dates.clone(), Arc::clone(&frame));
                inner.order.push_back(dates.clone());
            }
        }

        frame
    }

    pub fn invalidate(&self) {
        let mut inner = self.lock();
        inner.clear();
        self.counters.invalidations.fetch_add(1, Ordering::Relaxed);
        tracing::info!("dataset cache invalidated");
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.lock().frames.len();
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            invalidations: self.counters.invalidations.load(Ordering::Relaxed),
            entries,
            capacity: self.capacity,
        }
    }
}
