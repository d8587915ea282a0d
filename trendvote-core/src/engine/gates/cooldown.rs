//! Post-signal cooldown, counted in bars or in wall-clock seconds.
//!
//! The mode is fixed at construction. The bar counter increments at the top
//! of every processed bar, so a bar cooldown of N re-arms on the Nth bar
//! after the signal bar. Cooldown only vetoes emission; windows open and
//! confirmations are evaluated normally while it is active.

use chrono::{DateTime, Utc};

use crate::engine::config::CooldownMode;

#[derive(Debug)]
pub struct CooldownGate {
    mode: CooldownMode,
    bars_since_signal: Option<u32>,
    last_signal_at: Option<DateTime<Utc>>,
}

impl CooldownGate {
    pub fn new(mode: CooldownMode) -> Self {
        Self {
            mode,
            bars_since_signal: None,
            last_signal_at: None,
        }
    }

    /// Called once at the start of every processed bar.
    pub fn on_bar(&mut self) {
        if let Some(bars) = self.bars_since_signal.as_mut() {
            *bars += 1;
        }
    }

    pub fn record_signal(&mut self, at: DateTime<Utc>) {
        self.bars_since_signal = Some(0);
        self.last_signal_at = Some(at);
    }

    pub fn passes(&self, now: DateTime<Utc>) -> bool {
        match self.mode {
            CooldownMode::Disabled => true,
            CooldownMode::Bars(min_bars) => match self.bars_since_signal {
                None => true,
                Some(bars) => bars >= min_bars,
            },
            CooldownMode::Seconds(min_seconds) => match self.last_signal_at {
                None => true,
                Some(t) => (now - t).num_seconds() >= i64::from(min_seconds),
            },
        }
    }
}
