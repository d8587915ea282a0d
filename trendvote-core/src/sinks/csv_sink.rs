//! Append-only CSV signal log.
//!
//! One row per emitted signal. A write failure downgrades the sink to a
//! no-op after a single warning; it never propagates into the engine.

use std::fs::File;
use std::path::Path;

use serde::Serialize;
use tracing::warn;

use super::SignalSink;
use crate::domain::SignalRecord;

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    timestamp: String,
    bar_index: usize,
    direction: String,
    trigger: &'a str,
    aligned: usize,
    total: usize,
}

pub struct CsvSink {
    writer: Option<csv::Writer<File>>,
}

impl CsvSink {
    /// Create (truncating) the signal log at `path`. Header row is written
    /// on the first record.
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: Some(csv::Writer::from_writer(file)),
        })
    }

    fn disable(&mut self, err: &csv::Error) {
        warn!(error = %err, "signal log write failed; disabling CSV sink");
        self.writer = None;
    }
}

impl SignalSink for CsvSink {
    fn on_signal(&mut self, record: &SignalRecord) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        let row = CsvRow {
            timestamp: record.bar_timestamp.to_rfc3339(),
            bar_index: record.bar_index,
            direction: record.direction.to_string(),
            trigger: &record.trigger_label,
            aligned: record.confluence_aligned,
            total: record.confluence_total,
        };
        let result = writer.serialize(&row).and_then(|_| Ok(writer.flush()?));
        if let Err(err) = result {
            self.disable(&err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Direction;
    use chrono::{TimeZone, Utc};

    #[test]
    fn writes_one_row_per_signal() {
        let dir = std::env::temp_dir().join("trendvote_csv_sink_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("signals.csv");
        let mut sink = CsvSink::create(&path).unwrap();
        let record = SignalRecord {
            direction: Direction::Long,
            trigger_label: "AIQ1+RR".into(),
            bar_timestamp: Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap(),
            bar_index: 42,
            confluence_aligned: 5,
            confluence_total: 7,
        };
        sink.on_signal(&record);
        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "timestamp,bar_index,direction,trigger,aligned,total"
        );
        let row = lines.next().unwrap();
        assert!(row.contains("LONG"));
        assert!(row.contains("AIQ1+RR"));
        assert!(row.contains(",42,"));
    }
}
