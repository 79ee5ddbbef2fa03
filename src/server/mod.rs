pub mod query;
pub mod routes;

use crate::state::AppState;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

/// JSON + CSV API, with the static dashboard build served as fallback.
pub fn router(state: Arc<AppState>) -> Router {
    let dist = state.config.dashboard_dir.clone();

    Router::new()
        .route("/api/dates", get(routes::get_dates))
        .route("/api/facets", get(routes::get_facets))
        .route("/api/summary", get(routes::get_summary))
        .route("/api/export.csv", get(routes::get_export_csv))
        .route("/api/cache", get(routes::get_cache).delete(routes::clear_cache))
        .fallback_service(
            tower_http::services::ServeDir::new(&dist)
                .fallback(tower_http::services::ServeFile::new(dist.join("index.html"))),
        )
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .with_state(state)
}
