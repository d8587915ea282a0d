//! The signal engine: flip detection, trigger windows, confluence
//! arbitration, quality gates, and emission.

pub mod config;
pub mod confluence;
mod emitter;
mod event_loop;
pub mod flip;
pub mod gates;
pub mod window;

pub use config::{ConfigError, ConfluencePolicy, CooldownMode, EngineConfig, StabilityConfig};
pub use confluence::ConfluenceSnapshot;
pub use event_loop::SignalEngine;
pub use flip::{FlipDetector, FlipDirection, FlipEvent};
pub use gates::{ChoppinessFilter, CooldownGate, GateReason, StabilityGate};
pub use window::{TriggerWindow, WindowEvent, WindowState};
