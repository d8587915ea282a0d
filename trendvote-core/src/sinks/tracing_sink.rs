//! Structured-log sink.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::SignalSink;
use crate::domain::{Direction, SignalRecord};
use crate::engine::{ConfluenceSnapshot, GateReason};

/// Emits every engine event as a tracing event. Signals log at INFO,
/// lifecycle noise at DEBUG.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl SignalSink for TracingSink {
    fn on_signal(&mut self, record: &SignalRecord) {
        info!(
            direction = %record.direction,
            trigger = %record.trigger_label,
            aligned = record.confluence_aligned,
            total = record.confluence_total,
            bar = record.bar_index,
            timestamp = %record.bar_timestamp,
            "signal"
        );
    }

    fn on_window_opened(&mut self, direction: Direction, timestamp: DateTime<Utc>) {
        debug!(%direction, %timestamp, "trigger window opened");
    }

    fn on_window_expired(&mut self, direction: Direction, timestamp: DateTime<Utc>) {
        debug!(%direction, %timestamp, "trigger window expired unconfirmed");
    }

    fn on_confirmed_but_gated(
        &mut self,
        direction: Direction,
        reason: GateReason,
        snapshot: &ConfluenceSnapshot,
        timestamp: DateTime<Utc>,
    ) {
        debug!(
            %direction,
            %reason,
            bull = snapshot.bull,
            bear = snapshot.bear,
            total = snapshot.total,
            %timestamp,
            "confirmation gated"
        );
    }
}
