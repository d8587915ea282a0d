//! Signal sinks — where engine events go.
//!
//! The engine is sink-agnostic: it fans every event out to an ordered list
//! of `SignalSink` implementations and never looks at the result. Sinks must
//! absorb their own failures; a broken sink is a degraded observer, never a
//! dead engine.

mod csv_sink;
mod tracing_sink;

pub use csv_sink::CsvSink;
pub use tracing_sink::TracingSink;

use chrono::{DateTime, Utc};

use crate::domain::{Direction, SignalRecord};
use crate::engine::{ConfluenceSnapshot, GateReason};

/// Observer interface for engine events. All methods default to no-ops so a
/// sink implements only what it cares about.
pub trait SignalSink {
    /// A signal passed every gate and fired.
    fn on_signal(&mut self, record: &SignalRecord) {
        let _ = record;
    }

    /// A primary flip opened (or replaced) a trigger window.
    fn on_window_opened(&mut self, direction: Direction, timestamp: DateTime<Utc>) {
        let _ = (direction, timestamp);
    }

    /// A window aged out without firing.
    fn on_window_expired(&mut self, direction: Direction, timestamp: DateTime<Utc>) {
        let _ = (direction, timestamp);
    }

    /// A confirmation was found but a gate vetoed it.
    fn on_confirmed_but_gated(
        &mut self,
        direction: Direction,
        reason: GateReason,
        snapshot: &ConfluenceSnapshot,
        timestamp: DateTime<Utc>,
    ) {
        let _ = (direction, reason, snapshot, timestamp);
    }
}

/// Everything a sink can observe, as data. Used by `RecordingSink`.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Signal(SignalRecord),
    WindowOpened(Direction),
    WindowExpired(Direction),
    Gated {
        direction: Direction,
        reason: GateReason,
    },
}

/// In-memory sink for tests and replay summaries.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub signals: Vec<SignalRecord>,
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SignalSink for RecordingSink {
    fn on_signal(&mut self, record: &SignalRecord) {
        self.signals.push(record.clone());
        self.events.push(SinkEvent::Signal(record.clone()));
    }

    fn on_window_opened(&mut self, direction: Direction, _timestamp: DateTime<Utc>) {
        self.events.push(SinkEvent::WindowOpened(direction));
    }

    fn on_window_expired(&mut self, direction: Direction, _timestamp: DateTime<Utc>) {
        self.events.push(SinkEvent::WindowExpired(direction));
    }

    fn on_confirmed_but_gated(
        &mut self,
        direction: Direction,
        reason: GateReason,
        _snapshot: &ConfluenceSnapshot,
        _timestamp: DateTime<Utc>,
    ) {
        self.events.push(SinkEvent::Gated { direction, reason });
    }
}
