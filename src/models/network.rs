// Network counter model

use serde::{Deserialize, Serialize};

/// Cumulative interface counters summed over all interfaces, since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}
