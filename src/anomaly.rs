// Anomaly detection: absolute thresholds, then deviation from the recent mean.

use serde::Serialize;
use std::fmt;

use crate::models::Snapshot;

/// Resources the analyzers look at, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Cpu,
    Memory,
    Disk,
}

impl Resource {
    pub fn value(self, s: &Snapshot) -> f64 {
        match self {
            Resource::Cpu => s.cpu_percent,
            Resource::Memory => s.memory.percent,
            Resource::Disk => s.disk.percent,
        }
    }

    /// Percent above which usage is always flagged.
    pub fn high_threshold(self) -> f64 {
        match self {
            Resource::Cpu => 85.0,
            Resource::Memory => 85.0,
            Resource::Disk => 90.0,
        }
    }

    /// Multiple of the window mean above which usage counts as a spike.
    pub fn spike_multiplier(self) -> f64 {
        match self {
            Resource::Cpu | Resource::Memory => 1.5,
            Resource::Disk => 1.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    High,
    AboveNormal { mean: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub resource: Resource,
    #[serde(flatten)]
    pub kind: IssueKind,
    pub value: f64,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.resource, self.kind) {
            (Resource::Cpu, IssueKind::High) => write!(f, "High CPU usage detected"),
            (Resource::Memory, IssueKind::High) => write!(f, "High memory usage detected"),
            (Resource::Disk, IssueKind::High) => write!(f, "Disk space running low"),
            (Resource::Cpu, IssueKind::AboveNormal { mean }) => write!(
                f,
                "Unusual CPU spike: {:.1}% (recent average {:.1}%)",
                self.value, mean
            ),
            (Resource::Memory, IssueKind::AboveNormal { mean }) => write!(
                f,
                "Memory usage above normal: {:.1}% (recent average {:.1}%)",
                self.value, mean
            ),
            (Resource::Disk, IssueKind::AboveNormal { mean }) => write!(
                f,
                "Disk usage above normal: {:.1}% (recent average {:.1}%)",
                self.value, mean
            ),
        }
    }
}

/// Flags `fresh` against fixed thresholds and against the mean of `window`.
/// At most one issue per resource, ordered CPU, memory, disk.
pub fn detect(fresh: &Snapshot, window: &[Snapshot]) -> Vec<Issue> {
    [Resource::Cpu, Resource::Memory, Resource::Disk]
        .into_iter()
        .filter_map(|r| check(r, fresh, window))
        .collect()
}

fn check(resource: Resource, fresh: &Snapshot, window: &[Snapshot]) -> Option<Issue> {
    let value = resource.value(fresh);
    if value > resource.high_threshold() {
        return Some(Issue {
            resource,
            kind: IssueKind::High,
            value,
        });
    }
    let mean = mean(window.iter().map(|s| resource.value(s)))?;
    (value > mean * resource.spike_multiplier()).then_some(Issue {
        resource,
        kind: IssueKind::AboveNormal { mean },
        value,
    })
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_nothing_is_none() {
        assert_eq!(mean(std::iter::empty()), None);
        assert_eq!(mean([2.0, 4.0].into_iter()), Some(3.0));
    }
}
