// Background monitor: sample the host on an interval, check the fresh sample
// against the recent window, then append it to history.

use crate::anomaly::{self, Issue};
use crate::history_repo::{HistoryRepo, StoreError};
use crate::models::Snapshot;
use crate::sysinfo_repo::SysinfoRepo;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::{Duration, interval};
use tracing::Instrument;

/// Repos, counters and shutdown for the worker.
pub struct WorkerDeps {
    pub sysinfo_repo: Arc<SysinfoRepo>,
    pub history_repo: Arc<HistoryRepo>,
    pub samples_saved_total: Arc<AtomicU64>,
    pub issues_flagged_total: Arc<AtomicU64>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Worker timing and logging config.
pub struct WorkerConfig {
    pub sample_interval_ms: u64,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
    /// Baseline size for anomaly checks.
    pub window_size: usize,
}

/// Checks `snapshot` against the last `window_size` stored snapshots, then
/// appends it. The window is read before the append so the fresh sample is
/// never part of its own baseline.
pub async fn record(
    history_repo: &HistoryRepo,
    snapshot: Snapshot,
    window_size: usize,
) -> Result<Vec<Issue>, StoreError> {
    let window = history_repo.recent(window_size);
    let issues = anomaly::detect(&snapshot, &window);
    for issue in &issues {
        tracing::warn!(
            resource = ?issue.resource,
            value = issue.value,
            operation = "detect",
            "{}",
            issue
        );
    }
    history_repo.append(snapshot).await?;
    Ok(issues)
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let worker_span = tracing::span!(
        tracing::Level::DEBUG,
        "worker",
        sample_interval_ms = config.sample_interval_ms
    );
    tokio::spawn(run(deps, config).instrument(worker_span))
}

async fn run(deps: WorkerDeps, config: WorkerConfig) {
    let WorkerDeps {
        sysinfo_repo,
        history_repo,
        samples_saved_total,
        issues_flagged_total,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        sample_interval_ms,
        stats_log_interval_secs,
        window_size,
    } = config;

    let mut tick = interval(Duration::from_millis(sample_interval_ms));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
    stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let snapshot = match sysinfo_repo.sample().await {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::warn!(error = %e, operation = "sample", "sampling failed");
                        continue;
                    }
                };
                match record(&history_repo, snapshot, window_size).await {
                    Ok(issues) => {
                        samples_saved_total.fetch_add(1, Ordering::Relaxed);
                        issues_flagged_total.fetch_add(issues.len() as u64, Ordering::Relaxed);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, operation = "append", "history append failed");
                    }
                }
            }
            _ = &mut shutdown_rx => {
                tracing::debug!("Worker shutting down");
                break;
            }
            _ = stats_log_tick.tick() => {
                tracing::info!(
                    samples_saved_total = samples_saved_total.load(Ordering::Relaxed),
                    issues_flagged_total = issues_flagged_total.load(Ordering::Relaxed),
                    history_len = history_repo.len(),
                    "app stats"
                );
            }
        }
    }
}
