// Domain models

mod network;
mod process;
mod storage;
mod system;

pub use network::NetworkCounters;
pub use process::{GpuStats, ProcessInfo};
pub use storage::DiskIoStats;
pub use system::{Snapshot, SnapshotError, UsageStats};
