// Shared test helpers

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use perfwatch::models::*;

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
}

/// `base_time()` plus a (possibly fractional) number of hours.
pub fn at_hours(hours: f64) -> DateTime<Utc> {
    base_time() + Duration::milliseconds((hours * 3_600_000.0) as i64)
}

pub fn snapshot_at(timestamp: DateTime<Utc>, cpu: f64, memory: f64, disk: f64) -> Snapshot {
    Snapshot::new(
        timestamp,
        cpu,
        UsageStats {
            percent: memory,
            used: (memory * 160_000_000.0) as u64,
            total: 16_000_000_000,
        },
        UsageStats {
            percent: disk,
            used: (disk * 5_000_000_000.0) as u64,
            total: 500_000_000_000,
        },
        NetworkCounters {
            bytes_sent: 1_000,
            bytes_recv: 2_000,
        },
    )
}

/// Snapshot with all three resources at quiet levels.
pub fn minimal_snapshot(timestamp: DateTime<Utc>) -> Snapshot {
    snapshot_at(timestamp, 10.0, 40.0, 50.0)
}

pub fn cpu(cpu: f64) -> Snapshot {
    snapshot_at(base_time(), cpu, 40.0, 50.0)
}
