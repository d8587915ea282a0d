//! Quality gates — checks that stand between a confirmed window and an
//! emitted signal.
//!
//! Gates run in a fixed order (confluence threshold, stability, choppiness,
//! cooldown) and the first failure wins. A failed gate never closes the
//! window; the same window may pass on a later bar.

mod choppiness;
mod cooldown;
mod stability;

pub use choppiness::ChoppinessFilter;
pub use cooldown::CooldownGate;
pub use stability::StabilityGate;

use serde::Serialize;

/// Which gate rejected a confirmed setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateReason {
    Confluence,
    Stability,
    Choppiness,
    Cooldown,
}

impl std::fmt::Display for GateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GateReason::Confluence => "confluence",
            GateReason::Stability => "stability",
            GateReason::Choppiness => "choppiness",
            GateReason::Cooldown => "cooldown",
        };
        f.write_str(name)
    }
}
