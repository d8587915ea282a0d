//! Trend sources — the capability the engine consumes.
//!
//! A trend source is any per-bar re-evaluated indicator that can answer
//! "which way are you leaning right now". The engine never sees indicator
//! internals; it sees a key, an availability flag, and a `TrendValue` read
//! once per bar. Sources must never reference engine state.

mod atr_band;
mod ema_trend;
mod factory;
mod registry;
mod scripted;

pub use atr_band::AtrBandSource;
pub use ema_trend::EmaTrendSource;
pub use factory::{build_registry, create_source, SourceConfig, SourceFactoryError};
pub use registry::{resolve_primary, SourceEntry, SourceRead, SourceRegistry};
pub use scripted::ScriptedSource;

use crate::domain::{Bar, Direction};

/// A single per-bar trend read.
///
/// `Bool` sources lean one way or the other on every bar. `Signed` sources
/// vote by sign and may abstain: zero (and NaN, which the engine treats as
/// zero) casts no vote but still counts toward the confluence total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrendValue {
    Bool(bool),
    Signed(f64),
}

impl TrendValue {
    /// Direction of this read, with a minimum magnitude for signed sources.
    ///
    /// A `Signed` value with `|v| < min_magnitude` abstains, which is how
    /// per-source thresholds (e.g. a minimum wave count) pass through.
    pub fn direction(&self, min_magnitude: f64) -> Option<Direction> {
        match *self {
            TrendValue::Bool(true) => Some(Direction::Long),
            TrendValue::Bool(false) => Some(Direction::Short),
            TrendValue::Signed(v) => {
                // Malformed reads (NaN) are no-votes, never errors.
                if v.is_nan() || v.abs() < min_magnitude.max(f64::MIN_POSITIVE) {
                    None
                } else if v > 0.0 {
                    Some(Direction::Long)
                } else if v < 0.0 {
                    Some(Direction::Short)
                } else {
                    None
                }
            }
        }
    }
}

/// Trait for trend sources.
///
/// # Contract
/// - `on_bar` is called exactly once per bar, in bar order, for every
///   *available* source — enabled or not — so that flip history stays intact
///   when the enabled set changes mid-session.
/// - `value` must be a pure read of state established by the last `on_bar`.
/// - Implementations absorb their own data problems: a source that cannot
///   produce a read for a bar returns `Signed(0.0)` (no vote), never panics.
pub trait TrendSource: std::fmt::Debug {
    /// Stable identifier used in trigger labels and priority lists (e.g. "RR").
    fn key(&self) -> &str;

    /// Whether a live backing implementation was found at startup.
    /// Fixed after capability resolution; an unavailable source is excluded
    /// from counting and never receives `on_bar`.
    fn is_available(&self) -> bool {
        true
    }

    /// Advance internal state with the completed bar.
    fn on_bar(&mut self, bar: &Bar);

    /// Current trend read, re-evaluated once per bar.
    fn value(&self) -> TrendValue;
}
