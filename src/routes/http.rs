// GET handlers: version, history queries, issues, forecast, digest

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use super::AppState;
use crate::version::{NAME, VERSION};
use crate::{advisor, anomaly, forecast};

#[derive(Debug, Deserialize)]
pub(super) struct WindowQuery {
    limit: Option<usize>,
}

impl WindowQuery {
    fn limit(&self, state: &AppState) -> usize {
        self.limit.unwrap_or(state.config.history.window_size)
    }
}

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/history: last N snapshots, oldest first.
pub(super) async fn history_handler(
    State(state): State<AppState>,
    Query(q): Query<WindowQuery>,
) -> impl IntoResponse {
    axum::Json(state.history_repo.recent(q.limit(&state)))
}

/// GET /api/latest: newest snapshot, 404 when history is empty.
pub(super) async fn latest_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.history_repo.recent(1).pop() {
        Some(s) => axum::Json(s).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// GET /api/issues: newest snapshot checked against the N before it.
pub(super) async fn issues_handler(
    State(state): State<AppState>,
    Query(q): Query<WindowQuery>,
) -> impl IntoResponse {
    let issues = match state.history_repo.latest_with_window(q.limit(&state)) {
        Some((latest, window)) => anomaly::detect(&latest, &window),
        None => Vec::new(),
    };
    let messages: Vec<String> = issues.iter().map(|i| i.to_string()).collect();
    axum::Json(serde_json::json!({
        "issues": issues,
        "messages": messages,
    }))
}

/// GET /api/forecast: trends over the last N snapshots.
pub(super) async fn forecast_handler(
    State(state): State<AppState>,
    Query(q): Query<WindowQuery>,
) -> impl IntoResponse {
    let window = state.history_repo.recent(q.limit(&state));
    let report = forecast::forecast(&window);
    axum::Json(serde_json::json!({
        "report": report,
        "messages": report.messages(),
    }))
}

/// GET /api/digest: plain-text digest for summarizers, 204 when empty.
pub(super) async fn digest_handler(
    State(state): State<AppState>,
    Query(q): Query<WindowQuery>,
) -> impl IntoResponse {
    match advisor::digest(&state.history_repo.recent(q.limit(&state))) {
        Some(text) => text.into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
