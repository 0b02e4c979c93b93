// Host sampling via sysinfo. Produces one Snapshot per call.

use crate::models::*;
use chrono::Utc;
use std::path::Path;
use std::sync::{Arc, Mutex};
use sysinfo::{Disks, Networks, ProcessesToUpdate, System};
use tracing::instrument;

const BYTES_PER_MB: u64 = 1024 * 1024;

struct Probe {
    sys: System,
    disks: Disks,
    networks: Networks,
    /// CPU usage needs two refreshes at least MINIMUM_CPU_UPDATE_INTERVAL apart.
    cpu_primed: bool,
}

pub struct SysinfoRepo {
    probe: Arc<Mutex<Probe>>,
    top_processes: usize,
}

impl SysinfoRepo {
    pub fn new(top_processes: usize) -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        Self {
            probe: Arc::new(Mutex::new(Probe {
                sys,
                disks: Disks::new_with_refreshed_list(),
                networks: Networks::new_with_refreshed_list(),
                cpu_primed: false,
            })),
            top_processes,
        }
    }

    /// Samples CPU, memory, root filesystem, network and disk I/O counters,
    /// uptime and the busiest processes. The first call blocks for the CPU
    /// measurement interval.
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "sample"))]
    pub async fn sample(&self) -> anyhow::Result<Snapshot> {
        let probe = self.probe.clone();
        let top_n = self.top_processes;
        tokio::task::spawn_blocking(move || {
            let mut probe = probe
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            let Probe {
                sys,
                disks,
                networks,
                cpu_primed,
            } = &mut *probe;

            if !*cpu_primed {
                sys.refresh_cpu_usage();
                sys.refresh_processes(ProcessesToUpdate::All, true);
                std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
                *cpu_primed = true;
            }
            sys.refresh_cpu_usage();
            sys.refresh_memory();
            sys.refresh_processes(ProcessesToUpdate::All, true);
            disks.refresh(false);
            networks.refresh(true);

            let memory = usage(sys.total_memory(), sys.available_memory());
            let disk = root_disk(disks);
            let network = networks
                .list()
                .values()
                .fold(NetworkCounters::default(), |acc, data| NetworkCounters {
                    bytes_sent: acc.bytes_sent.saturating_add(data.total_transmitted()),
                    bytes_recv: acc.bytes_recv.saturating_add(data.total_received()),
                });
            let (read, written) = disks.list().iter().fold((0u64, 0u64), |(r, w), d| {
                let u = d.usage();
                (
                    r.saturating_add(u.total_read_bytes),
                    w.saturating_add(u.total_written_bytes),
                )
            });

            let mut snapshot = Snapshot::new(
                Utc::now(),
                f64::from(sys.global_cpu_usage()),
                memory,
                disk,
                network,
            );
            snapshot.uptime_secs = Some(System::uptime());
            snapshot.disk_io = Some(DiskIoStats {
                read_mb: read / BYTES_PER_MB,
                write_mb: written / BYTES_PER_MB,
            });
            snapshot.top_processes = Some(top_processes(sys, top_n));
            Ok(snapshot)
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }
}

fn usage(total: u64, available: u64) -> UsageStats {
    let used = total.saturating_sub(available);
    UsageStats {
        percent: percent_of(used, total),
        used,
        total,
    }
}

fn percent_of(part: u64, total: u64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Filesystem mounted at `/`, else the first one listed.
fn root_disk(disks: &Disks) -> UsageStats {
    let list = disks.list();
    list.iter()
        .find(|d| d.mount_point() == Path::new("/"))
        .or_else(|| list.first())
        .map(|d| usage(d.total_space(), d.available_space()))
        .unwrap_or(UsageStats {
            percent: 0.0,
            used: 0,
            total: 0,
        })
}

fn top_processes(sys: &System, n: usize) -> Vec<ProcessInfo> {
    let total_memory = sys.total_memory();
    let mut procs: Vec<ProcessInfo> = sys
        .processes()
        .values()
        .map(|p| ProcessInfo {
            pid: p.pid().as_u32(),
            name: p.name().to_string_lossy().into_owned(),
            cpu_percent: f64::from(p.cpu_usage()),
            memory_percent: percent_of(p.memory(), total_memory),
        })
        .collect();
    procs.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent));
    procs.truncate(n);
    procs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_handles_zero_total() {
        let u = usage(0, 0);
        assert_eq!(u.percent, 0.0);
        assert_eq!(u.used, 0);
    }

    #[test]
    fn usage_is_used_over_total() {
        let u = usage(200, 50);
        assert_eq!(u.used, 150);
        assert_eq!(u.percent, 75.0);
    }
}
