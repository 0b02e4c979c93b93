// Process and GPU attachments (pass-through; never inspected by the analyzers)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
    pub memory_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuStats {
    pub name: String,
    /// Load in percent.
    pub load: f64,
    /// MiB.
    pub memory_used: f64,
    /// MiB.
    pub memory_total: f64,
}
