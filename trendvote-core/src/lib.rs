//! trendvote-core — a bar-driven trend-confluence signal engine.
//!
//! The engine consumes completed bars, polls a set of pluggable trend
//! sources, and emits LONG/SHORT signals when a primary-trigger flip is
//! confirmed by a second source inside a bounded window and the confluence
//! vote clears its threshold. Stability, choppiness, and cooldown gates
//! veto low-quality setups; a vetoed setup is logged, never an error.
//!
//! Everything is deterministic and synchronous: same bars, same
//! configuration, same signals.

pub mod domain;
pub mod engine;
pub mod fingerprint;
pub mod sinks;
pub mod sources;

pub use domain::{Bar, Direction, SignalRecord};
pub use engine::{ConfigError, EngineConfig, SignalEngine};
pub use sinks::SignalSink;
pub use sources::{SourceConfig, SourceRegistry, TrendSource};
