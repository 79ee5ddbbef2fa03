use crate::config::AppConfig;
use crate::dataset::pick::PickDefaults;
use crate::report::ReportOptions;
use crate::snapshot::cache::SnapshotCache;
use crate::snapshot::dir::DirSnapshotSource;
use std::sync::Arc;

// ── Application shared state ──
//
// Read-only apart from the dataset cache, which guards itself.

pub struct AppState {
    pub config: AppConfig,
    pub cache: SnapshotCache<DirSnapshotSource>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Arc<Self> {
        let source = DirSnapshotSource::new(config.data_dir.clone(), config.snapshot_prefix.clone());
        let defaults = PickDefaults {
            sport: config.default_sport.clone(),
        };
        let cache = SnapshotCache::new(source, defaults, config.cache_capacity);
        Arc::new(Self { config, cache })
    }

    /// Stake and ROI mode from config; requests may override the ROI mode.
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            stake: self.config.stake,
            roi_mode: self.config.roi_mode,
        }
    }
}
