use super::query::ReportQuery;
use crate::dataset::filters::Facets;
use crate::errors::{DashError, DashResult};
use crate::report::{self, export, Report};
use crate::snapshot::cache::CacheStats;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Dates the query covers. Fails only when there are no snapshots at all.
fn selected_dates(state: &AppState, query: &ReportQuery) -> DashResult<BTreeSet<NaiveDate>> {
    let available = state.cache.available_dates()?;
    if available.is_empty() {
        return Err(DashError::NoSnapshots(
            state.cache.source().dir().display().to_string(),
        ));
    }
    Ok(query.date_selection()?.resolve(&available))
}

fn build(state: &AppState, query: &ReportQuery) -> DashResult<Report> {
    let dates = selected_dates(state, query)?;
    let filters = query.filter_spec(state.config.player_match)?;
    let opts = query.report_options(state.report_options())?;
    Ok(report::compute(&state.cache, &dates, &filters, &opts))
}

/// GET /api/dates -- available snapshot dates, ascending
pub async fn get_dates(
    State(state): State<Arc<AppState>>,
) -> DashResult<Json<serde_json::Value>> {
    let dates = state.cache.available_dates()?;
    Ok(Json(serde_json::json!({
        "dates": dates.as_slice(),
        "latest": dates.last(),
    })))
}

/// GET /api/facets -- filter options for the selected dates
pub async fn get_facets(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> DashResult<Json<Facets>> {
    let query = ReportQuery::from_pairs(pairs);
    let dates = selected_dates(&state, &query)?;
    let picks = state.cache.picks(&dates);
    Ok(Json(Facets::from_picks(&picks)))
}

/// GET /api/summary -- metrics and enriched rows
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> DashResult<Json<Report>> {
    let report = build(&state, &ReportQuery::from_pairs(pairs))?;
    tracing::info!(
        merged = report.merged_count,
        filtered = report.filtered_count,
        profit = report.metrics.total_profit,
        "summary served"
    );
    Ok(Json(report))
}

/// GET /api/export.csv -- the summary rows as a CSV download
pub async fn get_export_csv(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> DashResult<Response> {
    let report = build(&state, &ReportQuery::from_pairs(pairs))?;
    let body = export::to_csv_bytes(&report.rows)?;
    let disposition = format!("attachment; filename=\"{}\"", report.csv_file_name());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// GET /api/cache -- dataset cache counters
pub async fn get_cache(
    State(state): State<Arc<AppState>>,
) -> Json<CacheStats> {
    Json(state.cache.stats())
}

/// DELETE /api/cache -- drop cached datasets (e.g. after snapshots were rewritten in place)
pub async fn clear_cache(
    State(state): State<Arc<AppState>>,
) -> Json<CacheStats> {
    state.cache.invalidate();
    Json(state.cache.stats())
}

#[cfg(test)]
mod tests {
    use crate::config::AppConfig;
    use crate::state::AppState;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::path::Path;
    use tower::ServiceExt;

    fn seed(dir: &Path) {
        std::fs::write(
            dir.join("all_ev_plus_2024-11-01.json"),
            r#"[
                {"jugador": "Tatum", "tipo": "points", "lado": "over", "resultado": "✅ 31", "odds_american": 150, "probability": 0.7},
                {"jugador": "Brown", "tipo": "points", "lado": "under", "resultado": "❌ 12", "odds_american": -110, "probability": 0.55}
            ]"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("all_ev_plus_2024-11-02.json"),
            r#"[
                {"player": "Tatum", "bet_type": "rebounds", "side": "over", "result": "⛔ DNP", "odds_american": "+120"},
                {"player": "White", "bet_type": "points", "side": "over", "result": "✅", "odds_american": -200, "probability": 0.8}
            ]"#,
        )
        .unwrap();
        std::fs::write(dir.join("all_ev_plus_2024-11-03.json"), "{broken").unwrap();
    }

    fn app(dir: &Path) -> axum::Router {
        let config = AppConfig {
            data_dir: dir.to_path_buf(),
            dashboard_dir: dir.join("dist"),
            ..AppConfig::default()
        };
        crate::server::router(AppState::new(config))
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.into_body().collect().await.unwrap().to_bytes().to_vec();
        (status, headers, body)
    }

    fn json(body: &[u8]) -> serde_json::Value {
        serde_json::from_slice(body).unwrap()
    }

    #[tokio::test]
    async fn test_dates() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let (status, _, body) = get(app(tmp.path()), "/api/dates").await;
        assert_eq!(status, StatusCode::OK);
        let v = json(&body);
        assert_eq!(v["dates"].as_array().unwrap().len(), 3);
        assert_eq!(v["latest"], "2024-11-03");
    }

    #[tokio::test]
    async fn test_summary_over_range_skips_broken_file() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let (status, _, body) =
            get(app(tmp.path()), "/api/summary?from=2024-11-01&to=2024-11-03").await;
        assert_eq!(status, StatusCode::OK);
        let v = json(&body);
        assert_eq!(v["merged_count"], 4);
        assert_eq!(v["metrics"]["wins"], 2);
        assert_eq!(v["metrics"]["losses"], 1);
        assert_eq!(v["metrics"]["voids"], 1);
        assert_eq!(v["metrics"]["roi"], 25.0);
        assert_eq!(v["rows"][0]["player"], "Tatum");
        assert_eq!(v["rows"][0]["outcome"], "win");
        assert_eq!(v["rows"][0]["decimal_odds"], 2.5);
    }

    #[tokio::test]
    async fn test_summary_filters() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let (status, _, body) = get(
            app(tmp.path()),
            "/api/summary?from=2024-11-01&to=2024-11-02&side=over&prob_min=0.6&roi=count",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let v = json(&body);
        assert_eq!(v["filtered_count"], 2);
        assert_eq!(v["removed_by_selection"], 1);
        assert_eq!(v["removed_by_range"], 1);
        assert_eq!(v["metrics"]["roi_mode"], "count");
        // (3.0 + 1.0) / 2 picks
        assert_eq!(v["metrics"]["roi"], 200.0);
    }

    #[tokio::test]
    async fn test_player_search_mode() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let (_, _, body) = get(
            app(tmp.path()),
            "/api/summary?date=2024-11-01&player=tat&player_match=contains",
        )
        .await;
        assert_eq!(json(&body)["filtered_count"], 1);

        let (_, _, body) = get(app(tmp.path()), "/api/summary?date=2024-11-01&player=tat").await;
        assert_eq!(json(&body)["filtered_count"], 0);
    }

    #[tokio::test]
    async fn test_export_csv() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let (status, headers, body) = get(app(tmp.path()), "/api/export.csv?date=2024-11-02").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "text/csv; charset=utf-8");
        assert!(headers["content-disposition"]
            .to_str()
            .unwrap()
            .contains("resumen_2024-11-02.csv"));
        let text = String::from_utf8(body).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("date,sport,player"));
    }

    #[tokio::test]
    async fn test_bad_date_is_400() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let (status, _, body) = get(app(tmp.path()), "/api/summary?date=yesterday").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json(&body)["error"].as_str().unwrap().contains("invalid date"));
    }

    #[tokio::test]
    async fn test_no_snapshots_is_404() {
        let tmp = tempfile::tempdir().unwrap();
        let (status, _, _) = get(app(tmp.path()), "/api/summary").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_facets_and_cache() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let router = app(tmp.path());
        let (_, _, body) = get(router.clone(), "/api/facets?from=2024-11-01&to=2024-11-02").await;
        let v = json(&body);
        assert_eq!(v["sides"], serde_json::json!(["over", "under"]));
        assert_eq!(v["players"], serde_json::json!(["Brown", "Tatum", "White"]));

        get(router.clone(), "/api/summary?from=2024-11-01&to=2024-11-02").await;
        let (_, _, body) = get(router, "/api/cache").await;
        let v = json(&body);
        assert_eq!(v["hits"], 1);
        assert_eq!(v["misses"], 1);
    }

    #[tokio::test]
    async fn test_clear_cache() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let router = app(tmp.path());
        get(router.clone(), "/api/summary").await;

        let req = Request::builder()
            .method("DELETE")
            .uri("/api/cache")
            .body(Body::empty())
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let v = json(&body);
        assert_eq!(v["entries"], 0);
        assert_eq!(v["invalidations"], 1);
    }

    fn seed_commas(dir: &Path) {
        std::fs::write(
            dir.join("all_ev_plus_2024-11-05.json"),
            r#"[
                {"player": "Jackson, Jaren", "side": "over", "result": "✅ 20 pts, 5 reb", "odds_american": 100},
                {"player": "Jaren", "side": "under", "result": "❌", "odds_american": -110},
                {"player": "Jackson", "side": "over", "result": "⛔"}
            ]"#,
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_values_with_commas_match_exactly() {
        let tmp = tempfile::tempdir().unwrap();
        seed_commas(tmp.path());

        let (status, _, body) =
            get(app(tmp.path()), "/api/summary?player=Jackson%2C%20Jaren").await;
        assert_eq!(status, StatusCode::OK);
        let v = json(&body);
        assert_eq!(v["filtered_count"], 1);
        assert_eq!(v["metrics"]["wins"], 1);
        assert_eq!(v["metrics"]["losses"], 0);
        assert_eq!(v["rows"][0]["player"], "Jackson, Jaren");

        // ✅ 20 pts, 5 reb
        let (_, _, body) = get(
            app(tmp.path()),
            "/api/summary?result=%E2%9C%85%2020%20pts%2C%205%20reb",
        )
        .await;
        let v = json(&body);
        assert_eq!(v["filtered_count"], 1);
        assert_eq!(v["rows"][0]["result"], "✅ 20 pts, 5 reb");
    }

    #[tokio::test]
    async fn test_repeated_params_are_multiselect() {
        let tmp = tempfile::tempdir().unwrap();
        seed_commas(tmp.path());
        let (_, _, body) = get(
            app(tmp.path()),
            "/api/summary?player=Jaren&player=Jackson",
        )
        .await;
        let v = json(&body);
        assert_eq!(v["filtered_count"], 2);
        assert_eq!(v["removed_by_selection"], 1);
    }

    #[tokio::test]
    async fn test_bad_range_bound_is_json_400() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let (status, _, body) = get(app(tmp.path()), "/api/summary?prob_min=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let msg = json(&body)["error"].as_str().unwrap().to_string();
        assert!(msg.contains("invalid query"), "{msg}");
        assert!(msg.contains("prob_min"), "{msg}");
    }
}
