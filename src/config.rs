use crate::dataset::filters::PlayerMatch;
use crate::errors::{DashError, DashResult};
use crate::metrics::summary::RoiMode;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub snapshot_prefix: String,
    pub default_sport: String,
    /// Flat stake applied to every pick for profit/ROI.
    pub stake: f64,
    pub roi_mode: RoiMode,
    pub player_match: PlayerMatch,
    pub cache_capacity: usize,
    pub server_port: u16,
    pub dashboard_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("cache/public"),
            snapshot_prefix: "all_ev_plus_".into(),
            default_sport: "NBA".into(),
            stake: 2.0,
            roi_mode: RoiMode::StakeNormalized,
            player_match: PlayerMatch::Exact,
            cache_capacity: 32,
            server_port: 3001,
            dashboard_dir: PathBuf::from("dashboard/dist"),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> DashResult<Self> {
        dotenvy::dotenv().ok();

        let stake = env_var_or("STAKE", "2.0")
            .parse::<f64>()
            .map_err(|e| DashError::Config(format!("STAKE: {e}")))?;
        if !stake.is_finite() || stake <= 0.0 {
            return Err(DashError::Config(format!("STAKE must be positive, got {stake}")));
        }

        let roi_mode = env_var_or("ROI_MODE", "stake")
            .parse::<RoiMode>()
            .map_err(|e| DashError::Config(format!("ROI_MODE: {e}")))?;

        let player_match = env_var_or("PLAYER_MATCH", "exact")
            .parse::<PlayerMatch>()
            .map_err(|e| DashError::Config(format!("PLAYER_MATCH: {e}")))?;

        let cache_capacity = env_var_or("CACHE_CAPACITY", "32")
            .parse::<usize>()
            .map_err(|e| DashError::Config(format!("CACHE_CAPACITY: {e}")))?;

        let server_port = env_var_or("SERVER_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| DashError::Config(format!("SERVER_PORT: {e}")))?;

        Ok(Self {
            data_dir: PathBuf::from(env_var_or("DATA_DIR", "cache/public")),
            snapshot_prefix: env_var_or("SNAPSHOT_PREFIX", "all_ev_plus_"),
            default_sport: env_var_or("DEFAULT_SPORT", "NBA"),
            stake,
            roi_mode,
            player_match,
            cache_capacity,
            server_port,
            dashboard_dir: PathBuf::from(env_var_or("DASHBOARD_DIR", "dashboard/dist")),
        })
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
