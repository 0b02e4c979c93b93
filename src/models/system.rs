// Snapshot: one sampled observation of host resource usage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DiskIoStats, GpuStats, NetworkCounters, ProcessInfo};

/// Usage of a sized resource (memory, or the root filesystem).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    pub percent: f64,
    /// Bytes.
    pub used: u64,
    /// Bytes.
    pub total: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Malformed(String),
}

/// One timestamped measurement. Never mutated once built; the history store
/// only appends and clones these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub cpu_percent: f64,
    pub memory: UsageStats,
    pub disk: UsageStats,
    pub network: NetworkCounters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_io: Option<DiskIoStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_processes: Option<Vec<ProcessInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu: Option<GpuStats>,
}

impl Snapshot {
    /// Snapshot with only the core fields set.
    pub fn new(
        timestamp: DateTime<Utc>,
        cpu_percent: f64,
        memory: UsageStats,
        disk: UsageStats,
        network: NetworkCounters,
    ) -> Self {
        Self {
            timestamp,
            cpu_percent,
            memory,
            disk,
            network,
            uptime_secs: None,
            disk_io: None,
            top_processes: None,
            gpu: None,
        }
    }

    /// Parse a producer-supplied JSON record. Missing or mistyped core fields
    /// are reported, never defaulted.
    pub fn from_json(s: &str) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot =
            serde_json::from_str(s).map_err(|e| SnapshotError::Malformed(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Rejects percentages the analyzers cannot compare (NaN, infinities).
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let fields = [
            ("cpu_percent", self.cpu_percent),
            ("memory.percent", self.memory.percent),
            ("disk.percent", self.disk.percent),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(SnapshotError::Malformed(format!(
                    "{} is not a finite number ({})",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
