use anyhow::Result;
use perfwatch::*;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

const USAGE: &str = "usage: perfwatch [serve | monitor | history [N] | forecast [N] | report [N]]";

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("serve");
    let limit = args.get(2).map(|s| parse_limit(s)).transpose()?;

    let app_config = config::AppConfig::load()?;
    let window = limit.unwrap_or(app_config.history.window_size);
    let history_repo = Arc::new(history_repo::HistoryRepo::open(&app_config.history.path).await?);

    match command {
        "serve" => serve(app_config, history_repo).await,
        "monitor" => monitor(&app_config, &history_repo).await,
        "history" => {
            let snapshots = history_repo.recent(window);
            println!("{}", serde_json::to_string_pretty(&snapshots)?);
            Ok(())
        }
        "forecast" => {
            let report = forecast::forecast(&history_repo.recent(window));
            for line in report.messages() {
                println!("{}", line);
            }
            Ok(())
        }
        "report" => {
            let summarizer = advisor::OpenAiAdvisor::from_env(app_config.advisor.clone())?;
            let text = advisor::analyze(&summarizer, &history_repo.recent(window)).await?;
            println!("{}", text);
            Ok(())
        }
        other => anyhow::bail!("unknown command {:?}\n{}", other, USAGE),
    }
}

fn parse_limit(s: &str) -> Result<usize> {
    match s.parse::<usize>() {
        Ok(0) => anyhow::bail!("limit must be at least 1\n{}", USAGE),
        Ok(n) => Ok(n),
        Err(_) => anyhow::bail!("invalid limit {:?}\n{}", s, USAGE),
    }
}

async fn monitor(
    app_config: &config::AppConfig,
    history_repo: &history_repo::HistoryRepo,
) -> Result<()> {
    let sysinfo_repo = sysinfo_repo::SysinfoRepo::new(app_config.monitoring.top_processes);
    let snapshot = sysinfo_repo.sample().await?;

    println!("CPU usage:    {:.1}%", snapshot.cpu_percent);
    println!(
        "Memory usage: {:.1}% ({} GB / {} GB)",
        snapshot.memory.percent,
        snapshot.memory.used >> 30,
        snapshot.memory.total >> 30
    );
    println!(
        "Disk usage:   {:.1}% ({} GB / {} GB)",
        snapshot.disk.percent,
        snapshot.disk.used >> 30,
        snapshot.disk.total >> 30
    );
    println!("Network sent: {} MB", snapshot.network.bytes_sent >> 20);
    println!("Network recv: {} MB", snapshot.network.bytes_recv >> 20);

    let issues = worker::record(history_repo, snapshot, app_config.history.window_size).await?;
    if issues.is_empty() {
        println!("No issues detected");
    } else {
        for issue in &issues {
            println!("- {}", issue);
        }
    }
    Ok(())
}

async fn serve(
    app_config: config::AppConfig,
    history_repo: Arc<history_repo::HistoryRepo>,
) -> Result<()> {
    let sysinfo_repo = Arc::new(sysinfo_repo::SysinfoRepo::new(
        app_config.monitoring.top_processes,
    ));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            sysinfo_repo,
            history_repo: history_repo.clone(),
            samples_saved_total: Arc::new(AtomicU64::new(0)),
            issues_flagged_total: Arc::new(AtomicU64::new(0)),
            shutdown_rx,
        },
        worker::WorkerConfig {
            sample_interval_ms: app_config.monitoring.sample_interval_ms,
            stats_log_interval_secs: app_config.monitoring.stats_log_interval_secs,
            window_size: app_config.history.window_size,
        },
    );

    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let app = routes::app(history_repo, app_config);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
            let _ = worker_handle.await;
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_limit_accepts_positive() {
        assert_eq!(parse_limit("12").unwrap(), 12);
    }

    #[test]
    fn parse_limit_rejects_zero_and_garbage() {
        let err = parse_limit("0").unwrap_err().to_string();
        assert!(err.contains("at least 1"));
        assert!(err.contains("usage:"));
        assert!(parse_limit("-3").is_err());
        assert!(parse_limit("ten").is_err());
    }
}
