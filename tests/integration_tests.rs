// Integration tests: HTTP query endpoints

mod common;

use axum_test::TestServer;
use common::*;
use perfwatch::config::AppConfig;
use perfwatch::history_repo::HistoryRepo;
use perfwatch::routes;
use std::sync::Arc;
use tempfile::TempDir;

const TEST_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[history]
path = "data/test.jsonl"
window_size = 10

[monitoring]
sample_interval_ms = 1000
stats_log_interval_secs = 60
"#;

async fn test_server(dir: &TempDir) -> (TestServer, Arc<HistoryRepo>) {
    let config = AppConfig::load_from_str(TEST_CONFIG).unwrap();
    let repo = Arc::new(HistoryRepo::open(dir.path().join("h.jsonl")).await.unwrap());
    let server = TestServer::new(routes::app(repo.clone(), config)).unwrap();
    (server, repo)
}

#[tokio::test]
async fn test_root_endpoint() {
    let dir = TempDir::new().unwrap();
    let (server, _) = test_server(&dir).await;
    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("perfwatch: host metrics history");
}

#[tokio::test]
async fn test_version_endpoint() {
    let dir = TempDir::new().unwrap();
    let (server, _) = test_server(&dir).await;
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json.get("name").and_then(|v| v.as_str()), Some("perfwatch"));
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_empty_history_endpoints() {
    let dir = TempDir::new().unwrap();
    let (server, _) = test_server(&dir).await;

    let json: serde_json::Value = server.get("/api/history").await.json();
    assert_eq!(json, serde_json::json!([]));

    server.get("/api/latest").await.assert_status_not_found();

    let json: serde_json::Value = server.get("/api/issues").await.json();
    assert_eq!(json["messages"], serde_json::json!([]));

    let json: serde_json::Value = server.get("/api/forecast").await.json();
    assert_eq!(
        json["messages"],
        serde_json::json!(["insufficient history for forecasting."])
    );

    let response = server.get("/api/digest").await;
    response.assert_status(axum::http::StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_history_limit_and_order() {
    let dir = TempDir::new().unwrap();
    let (server, repo) = test_server(&dir).await;
    for h in 0..4 {
        repo.append(minimal_snapshot(at_hours(h as f64)))
            .await
            .unwrap();
    }

    let json: serde_json::Value = server
        .get("/api/history")
        .add_query_param("limit", 2)
        .await
        .json();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries[0]["timestamp"].as_str().unwrap().starts_with("2024-03-01T10:00:00"));
    assert!(entries[1]["timestamp"].as_str().unwrap().starts_with("2024-03-01T11:00:00"));

    let latest: serde_json::Value = server.get("/api/latest").await.json();
    assert_eq!(latest, entries[1]);
}

#[tokio::test]
async fn test_issues_use_latest_against_preceding_window() {
    let dir = TempDir::new().unwrap();
    let (server, repo) = test_server(&dir).await;
    repo.append(snapshot_at(at_hours(0.0), 40.0, 40.0, 50.0))
        .await
        .unwrap();
    repo.append(snapshot_at(at_hours(1.0), 40.0, 40.0, 50.0))
        .await
        .unwrap();
    repo.append(snapshot_at(at_hours(2.0), 80.0, 90.0, 50.0))
        .await
        .unwrap();

    let json: serde_json::Value = server.get("/api/issues").await.json();
    let messages = json["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(
        messages[0],
        "Unusual CPU spike: 80.0% (recent average 40.0%)"
    );
    assert_eq!(messages[1], "High memory usage detected");
    assert_eq!(json["issues"][1]["kind"], "high");
}

#[tokio::test]
async fn test_forecast_endpoint() {
    let dir = TempDir::new().unwrap();
    let (server, repo) = test_server(&dir).await;
    repo.append(snapshot_at(at_hours(0.0), 10.0, 40.0, 50.0))
        .await
        .unwrap();
    repo.append(snapshot_at(at_hours(1.0), 10.0, 40.0, 60.0))
        .await
        .unwrap();

    let json: serde_json::Value = server.get("/api/forecast").await.json();
    assert_eq!(json["report"]["status"], "trends");
    assert_eq!(
        json["messages"],
        serde_json::json!([
            "Disk will reach capacity in ~4.0 hours.",
            "Memory usage stable (no growth detected).",
            "CPU usage stable (no growth detected)."
        ])
    );
}

#[tokio::test]
async fn test_digest_endpoint() {
    let dir = TempDir::new().unwrap();
    let (server, repo) = test_server(&dir).await;
    repo.append(snapshot_at(at_hours(0.0), 10.0, 40.0, 50.0))
        .await
        .unwrap();

    let response = server.get("/api/digest").await;
    response.assert_status_ok();
    response.assert_text("Time: 2024-03-01T08:00:00Z, CPU: 10.0%, Memory: 40.0%, Disk: 50.0%");
}
