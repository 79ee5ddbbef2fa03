mod config;
mod dataset;
mod errors;
mod metrics;
mod report;
mod server;
mod snapshot;
mod state;

use crate::snapshot::SnapshotSource;
use crate::state::AppState;

#[tokio::main]
async fn main() {
    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("picks_dashboard starting");

    // Load config
    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(cfg.clone());

    // Nothing to report on is allowed at startup (files may land later),
    // but worth a loud warning.
    match app_state.cache.source().list_available_dates() {
        Ok(dates) if dates.is_empty() => {
            tracing::warn!(dir = %cfg.data_dir.display(), "no snapshots found yet");
        }
        Ok(dates) => {
            tracing::info!(
                snapshots = dates.len(),
                first = ?dates.first(),
                last = ?dates.last(),
                "snapshot directory scanned"
            );
        }
        Err(e) => {
            tracing::error!(dir = %cfg.data_dir.display(), "cannot read snapshot directory: {e}");
            std::process::exit(1);
        }
    }

    tracing::info!(
        stake = cfg.stake,
        roi_mode = ?cfg.roi_mode,
        player_match = ?cfg.player_match,
        cache_capacity = cfg.cache_capacity,
        "report settings"
    );

    let app = server::router(app_state);

    let addr = format!("0.0.0.0:{}", cfg.server_port);
    tracing::info!("server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("bind error: {e}");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
    }
}
