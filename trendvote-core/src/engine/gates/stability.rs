//! Dual-trigger stability gate.
//!
//! Watches the last flip time of a designated pair of sources and vetoes
//! confirmations whose partner trigger is in a bad phase. The two roles are
//! asymmetric:
//! - a trigger-B confirmation is rejected while trigger-A's last flip is
//!   younger than `min_seconds_since_flip` (too soon after the partner
//!   turned); if trigger-A has never flipped, the confirmation passes;
//! - a trigger-A confirmation requires trigger-B's last flip to sit inside
//!   `[partner_min_seconds, partner_max_seconds]`; no partner flip on record
//!   means no corroboration, so it is rejected.
//! Confirmations from any other source pass untouched.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::engine::config::StabilityConfig;
use crate::engine::flip::FlipEvent;

#[derive(Debug)]
pub struct StabilityGate {
    config: Option<StabilityConfig>,
    last_flip: HashMap<String, DateTime<Utc>>,
}

impl StabilityGate {
    pub fn new(config: Option<StabilityConfig>) -> Self {
        Self {
            config,
            last_flip: HashMap::new(),
        }
    }

    /// Record this bar's flips. Tracked for the configured pair only; both
    /// polarities count as "the trigger moved".
    pub fn record_flips(&mut self, flips: &[FlipEvent]) {
        let Some(config) = &self.config else {
            return;
        };
        for flip in flips {
            if flip.key == config.trigger_a || flip.key == config.trigger_b {
                self.last_flip.insert(flip.key.clone(), flip.timestamp);
            }
        }
    }

    /// Whether a confirmation credited to `confirming_key` passes at `now`.
    pub fn passes(&self, confirming_key: &str, now: DateTime<Utc>) -> bool {
        let Some(config) = &self.config else {
            return true;
        };
        if confirming_key == config.trigger_b {
            match self.last_flip.get(&config.trigger_a) {
                None => true,
                Some(&t) => (now - t).num_seconds() >= config.min_seconds_since_flip,
            }
        } else if confirming_key == config.trigger_a {
            match self.last_flip.get(&config.trigger_b) {
                None => false,
                Some(&t) => {
                    let elapsed = (now - t).num_seconds();
                    elapsed >= config.partner_min_seconds
                        && elapsed <= config.partner_max_seconds
                }
            }
        } else {
            true
        }
    }
}
