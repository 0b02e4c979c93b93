// JSON Lines codec: one Snapshot object per line, in append order.

use crate::models::Snapshot;

/// First line that failed to decode (1-based) and why.
#[derive(Debug)]
pub(super) struct CorruptLog {
    pub(super) line: usize,
    pub(super) reason: String,
}

pub(super) fn encode_line(snapshot: &Snapshot) -> serde_json::Result<String> {
    let mut line = serde_json::to_string(snapshot)?;
    line.push('\n');
    Ok(line)
}

/// Decode a whole log. Blank lines are skipped; any other bad line fails the
/// whole log.
pub(super) fn decode_log(content: &str) -> Result<Vec<Snapshot>, CorruptLog> {
    let mut out = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let snapshot: Snapshot = serde_json::from_str(line).map_err(|e| CorruptLog {
            line: idx + 1,
            reason: e.to_string(),
        })?;
        out.push(snapshot);
    }
    Ok(out)
}

pub(super) fn encode_log(snapshots: &[Snapshot]) -> serde_json::Result<String> {
    let mut out = String::new();
    for s in snapshots {
        out.push_str(&encode_line(s)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NetworkCounters, UsageStats};
    use chrono::{TimeZone, Utc};

    fn snapshot(cpu: f64) -> Snapshot {
        let usage = UsageStats {
            percent: 10.0,
            used: 1,
            total: 10,
        };
        Snapshot::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            cpu,
            usage,
            usage,
            NetworkCounters::default(),
        )
    }

    #[test]
    fn encoded_line_is_single_line() {
        let line = encode_line(&snapshot(12.5)).unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(line.trim_end().lines().count(), 1);
        assert!(line.contains("\"cpu_percent\":12.5"));
        assert!(!line.contains("gpu"));
    }

    #[test]
    fn decode_skips_blank_lines() {
        let log = encode_log(&[snapshot(1.0), snapshot(2.0)]).unwrap();
        let padded = format!("\n{}\n\n", log);
        let decoded = decode_log(&padded).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[1].cpu_percent, 2.0);
    }

    #[test]
    fn decode_reports_first_bad_line() {
        let mut log = encode_log(&[snapshot(1.0)]).unwrap();
        log.push_str("{\"timestamp\": \"not a time\"\n");
        let err = decode_log(&log).unwrap_err();
        assert_eq!(err.line, 2);
        assert!(!err.reason.is_empty());
    }

    #[test]
    fn decode_rejects_missing_core_field() {
        let err = decode_log("{\"timestamp\":\"2024-05-01T12:00:00Z\",\"cpu_percent\":1.0}")
            .unwrap_err();
        assert_eq!(err.line, 1);
    }
}
