/// Error types for the dashboard service.
/// Bad snapshot content never surfaces here: missing files, malformed files,
/// unparseable numbers and unknown result markers all degrade to empty or
/// excluded data. Only the service boundary (config, listing, queries) fails.
#[derive(Debug, thiserror::Error)]
pub enum DashError {
    #[error("io error: {0}")]
    Io(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("no snapshots available in {0}")]
    NoSnapshots(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("export error: {0}")]
    Export(String),
}

impl From<std::io::Error> for DashError {
    fn from(e: std::io::Error) -> Self {
        DashError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for DashError {
    fn from(e: serde_json::Error) -> Self {
        DashError::Parse(e.to_string())
    }
}

impl From<csv::Error> for DashError {
    fn from(e: csv::Error) -> Self {
        DashError::Export(e.to_string())
    }
}

impl axum::response::IntoResponse for DashError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            DashError::InvalidDate(_) | DashError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            DashError::NoSnapshots(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, axum::Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub type DashResult<T> = Result<T, DashError>;
