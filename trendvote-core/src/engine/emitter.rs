//! Signal emission and sink fan-out.

use chrono::{DateTime, Utc};

use crate::domain::{Direction, SignalRecord};
use crate::engine::confluence::ConfluenceSnapshot;
use crate::engine::gates::GateReason;
use crate::sinks::SignalSink;

/// Owns the sink list and builds the immutable `SignalRecord` at emission
/// time. Sinks are notified in registration order.
pub struct SignalEmitter {
    sinks: Vec<Box<dyn SignalSink>>,
}

impl SignalEmitter {
    pub fn new(sinks: Vec<Box<dyn SignalSink>>) -> Self {
        Self { sinks }
    }

    /// Build the record for a signal that passed every gate and fan it out.
    pub fn emit(
        &mut self,
        direction: Direction,
        primary_key: &str,
        confirming_key: &str,
        snapshot: ConfluenceSnapshot,
        bar_timestamp: DateTime<Utc>,
        bar_index: usize,
    ) -> SignalRecord {
        let record = SignalRecord {
            direction,
            trigger_label: format!("{primary_key}+{confirming_key}"),
            bar_timestamp,
            bar_index,
            confluence_aligned: snapshot.aligned(direction),
            confluence_total: snapshot.total,
        };
        for sink in &mut self.sinks {
            sink.on_signal(&record);
        }
        record
    }

    pub fn notify_window_opened(&mut self, direction: Direction, timestamp: DateTime<Utc>) {
        for sink in &mut self.sinks {
            sink.on_window_opened(direction, timestamp);
        }
    }

    pub fn notify_window_expired(&mut self, direction: Direction, timestamp: DateTime<Utc>) {
        for sink in &mut self.sinks {
            sink.on_window_expired(direction, timestamp);
        }
    }

    pub fn notify_gated(
        &mut self,
        direction: Direction,
        reason: GateReason,
        snapshot: &ConfluenceSnapshot,
        timestamp: DateTime<Utc>,
    ) {
        for sink in &mut self.sinks {
            sink.on_confirmed_but_gated(direction, reason, snapshot, timestamp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::{RecordingSink, SinkEvent};
    use chrono::TimeZone;

    #[test]
    fn emit_builds_label_and_snapshot_fields() {
        let mut emitter = SignalEmitter::new(Vec::new());
        let snapshot = ConfluenceSnapshot {
            bull: 5,
            bear: 1,
            total: 7,
        };
        let ts = Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap();
        let record = emitter.emit(Direction::Long, "AIQ1", "RR", snapshot, ts, 100);
        assert_eq!(record.trigger_label, "AIQ1+RR");
        assert_eq!(record.confluence_aligned, 5);
        assert_eq!(record.confluence_total, 7);
        assert_eq!(record.bar_index, 100);
    }

    #[test]
    fn all_sinks_see_every_event() {
        // Two recording sinks behind the same emitter.
        struct Probe(std::rc::Rc<std::cell::RefCell<RecordingSink>>);
        impl SignalSink for Probe {
            fn on_signal(&mut self, record: &SignalRecord) {
                self.0.borrow_mut().on_signal(record);
            }
            fn on_window_opened(&mut self, direction: Direction, timestamp: DateTime<Utc>) {
                self.0.borrow_mut().on_window_opened(direction, timestamp);
            }
        }
        let a = std::rc::Rc::new(std::cell::RefCell::new(RecordingSink::new()));
        let b = std::rc::Rc::new(std::cell::RefCell::new(RecordingSink::new()));
        let mut emitter =
            SignalEmitter::new(vec![Box::new(Probe(a.clone())), Box::new(Probe(b.clone()))]);
        let ts = Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap();
        emitter.notify_window_opened(Direction::Short, ts);
        emitter.emit(
            Direction::Short,
            "AIQ1",
            "DT",
            ConfluenceSnapshot::default(),
            ts,
            0,
        );
        for sink in [&a, &b] {
            let sink = sink.borrow();
            assert_eq!(sink.events[0], SinkEvent::WindowOpened(Direction::Short));
            assert_eq!(sink.signals.len(), 1);
        }
    }
}
