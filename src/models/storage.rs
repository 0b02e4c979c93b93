// Disk I/O model

use serde::{Deserialize, Serialize};

/// Cumulative disk I/O in whole MiB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskIoStats {
    pub read_mb: u64,
    pub write_mb: u64,
}
