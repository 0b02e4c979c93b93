// Dump recent history as JSON, followed by the issue check and forecast
// the query API would return for the same window.
//
// Usage: cargo run --example dump_history -- [PATH] [LIMIT]
//   PATH   default: ./data/metrics_history.jsonl
//   LIMIT  default: 5

use perfwatch::history_repo::HistoryRepo;
use perfwatch::{anomaly, forecast};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let path = args
        .get(1)
        .map(String::as_str)
        .unwrap_or("./data/metrics_history.jsonl");
    let limit: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(5);

    let repo = HistoryRepo::open(path).await?;
    let snapshots = repo.recent(limit);
    println!("{}", serde_json::to_string_pretty(&snapshots)?);

    if let Some((latest, window)) = repo.latest_with_window(limit) {
        for issue in anomaly::detect(&latest, &window) {
            println!("issue: {}", issue);
        }
    }
    for line in forecast::forecast(&snapshots).messages() {
        println!("forecast: {}", line);
    }
    Ok(())
}
