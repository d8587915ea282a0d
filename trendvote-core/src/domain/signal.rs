//! Signal records — the engine's only output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Directional intent of an emitted signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => f.write_str("LONG"),
            Direction::Short => f.write_str("SHORT"),
        }
    }
}

/// An emitted LONG/SHORT signal. Immutable once created; the engine hands it
/// to sinks and keeps no history beyond what the cooldown gate needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub direction: Direction,
    /// Which sources produced the signal, e.g. "AIQ1+RR" (primary + confirming).
    pub trigger_label: String,
    pub bar_timestamp: DateTime<Utc>,
    pub bar_index: usize,
    /// Sources agreeing with `direction` at emission time.
    pub confluence_aligned: usize,
    /// Enabled-and-available sources counted at emission time.
    pub confluence_total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn direction_opposite() {
        assert_eq!(Direction::Long.opposite(), Direction::Short);
        assert_eq!(Direction::Short.opposite(), Direction::Long);
    }

    #[test]
    fn signal_record_serialization_roundtrip() {
        let record = SignalRecord {
            direction: Direction::Long,
            trigger_label: "AIQ1+RR".into(),
            bar_timestamp: Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap(),
            bar_index: 100,
            confluence_aligned: 5,
            confluence_total: 7,
        };
        let json = serde_json::to_string(&record).unwrap();
        let deser: SignalRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record.direction, deser.direction);
        assert_eq!(record.trigger_label, deser.trigger_label);
        assert_eq!(record.confluence_aligned, deser.confluence_aligned);
    }
}
