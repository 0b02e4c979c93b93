// Two-point linear trend forecasts over a history window.

use serde::Serialize;
use std::fmt;

use crate::anomaly::Resource;
use crate::models::Snapshot;

const NS_PER_HOUR: f64 = 3_600_000_000_000.0;
const MS_PER_HOUR: f64 = 3_600_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "trend", rename_all = "snake_case")]
pub enum Forecast {
    /// Disk or memory: hours until 100% at the current growth rate.
    ReachesCapacity { resource: Resource, hours: f64 },
    /// CPU: projected value one hour out.
    TrendingUp { resource: Resource, projected: f64 },
    Stable { resource: Resource },
}

impl fmt::Display for Forecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Forecast::ReachesCapacity { resource, hours } => write!(
                f,
                "{} will reach capacity in ~{:.1} hours.",
                label(resource),
                hours
            ),
            Forecast::TrendingUp {
                resource,
                projected,
            } => write!(
                f,
                "{} usage trending upward, may reach ~{:.1}% in 1 hour.",
                label(resource),
                projected
            ),
            Forecast::Stable { resource } => {
                write!(f, "{} usage stable (no growth detected).", label(resource))
            }
        }
    }
}

fn label(resource: Resource) -> &'static str {
    match resource {
        Resource::Cpu => "CPU",
        Resource::Memory => "Memory",
        Resource::Disk => "Disk",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "forecasts", rename_all = "snake_case")]
pub enum ForecastReport {
    /// Fewer than two snapshots.
    Insufficient,
    /// Last timestamp is not after the first.
    InvalidWindow,
    /// Disk, memory, CPU.
    Trends(Vec<Forecast>),
}

impl ForecastReport {
    pub fn messages(&self) -> Vec<String> {
        match self {
            ForecastReport::Insufficient => vec!["insufficient history for forecasting.".into()],
            ForecastReport::InvalidWindow => vec!["invalid time window for forecasting.".into()],
            ForecastReport::Trends(forecasts) => forecasts.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Growth between the first and last snapshot of `window`, extrapolated
/// linearly. Projections are not clamped to 0..=100.
pub fn forecast(window: &[Snapshot]) -> ForecastReport {
    let [first, .., last] = window else {
        return ForecastReport::Insufficient;
    };

    let elapsed = last.timestamp - first.timestamp;
    // Nanoseconds overflow past ~292 years; milliseconds are plenty there.
    let elapsed_hours = match elapsed.num_nanoseconds() {
        Some(ns) => ns as f64 / NS_PER_HOUR,
        None => elapsed.num_milliseconds() as f64 / MS_PER_HOUR,
    };
    if elapsed_hours <= 0.0 {
        return ForecastReport::InvalidWindow;
    }

    let growth = |r: Resource| (r.value(last) - r.value(first)) / elapsed_hours;

    let mut out = Vec::with_capacity(3);
    for resource in [Resource::Disk, Resource::Memory] {
        let g = growth(resource);
        out.push(if g > 0.0 {
            Forecast::ReachesCapacity {
                resource,
                hours: (100.0 - resource.value(last)) / g,
            }
        } else {
            Forecast::Stable { resource }
        });
    }

    let cpu = Resource::Cpu;
    let g = growth(cpu);
    out.push(if g > 0.0 {
        Forecast::TrendingUp {
            resource: cpu,
            projected: cpu.value(last) + g,
        }
    } else {
        Forecast::Stable { resource: cpu }
    });

    ForecastReport::Trends(out)
}
