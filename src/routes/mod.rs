// Read-only HTTP query API

mod http;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::history_repo::HistoryRepo;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) history_repo: Arc<HistoryRepo>,
    pub(crate) config: AppConfig,
}

pub fn app(history_repo: Arc<HistoryRepo>, config: AppConfig) -> Router {
    let state = AppState {
        history_repo,
        config,
    };
    Router::new()
        .route("/", get(|| async { "perfwatch: host metrics history" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/history", get(http::history_handler)) // GET /api/history?limit=N
        .route("/api/latest", get(http::latest_handler)) // GET /api/latest
        .route("/api/issues", get(http::issues_handler)) // GET /api/issues?limit=N
        .route("/api/forecast", get(http::forecast_handler)) // GET /api/forecast?limit=N
        .route("/api/digest", get(http::digest_handler)) // GET /api/digest?limit=N
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
