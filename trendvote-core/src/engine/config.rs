//! Engine configuration and construction-time validation.
//!
//! Everything here is a runtime parameter, never a constant: the host hands
//! the engine a fully-populated `EngineConfig` and the one fatal error class
//! in the whole core is a misconfiguration caught here, before any bar is
//! processed.

use serde::{Deserialize, Serialize};

/// Errors raised at engine construction. Per-bar conditions are never errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("both cooldown_bars and cooldown_seconds are set; pick one mode")]
    ConflictingCooldown,
    #[error("primary_chain is empty")]
    EmptyPrimaryChain,
    #[error("no source in the primary chain {0:?} is available")]
    PrimaryUnresolved(Vec<String>),
    #[error("minimum confluence must be >= 1 (got {0})")]
    ZeroMinConfluence(usize),
    #[error("stability partner window is inverted: min {min}s > max {max}s")]
    StabilityWindowInverted { min: i64, max: i64 },
    #[error("stability trigger {0:?} is not a registered source")]
    UnknownStabilityTrigger(String),
}

/// How the effective minimum confluence is derived from the enabled count.
///
/// `Fixed` always uses the parameter; `UnanimousWhenFew` requires every
/// counted source to agree while few are enabled and falls back to the
/// parameter above that.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConfluencePolicy {
    Fixed { min: usize },
    UnanimousWhenFew { min: usize, unanimity_at_or_below: usize },
}

impl ConfluencePolicy {
    pub fn min(&self) -> usize {
        match *self {
            ConfluencePolicy::Fixed { min } => min,
            ConfluencePolicy::UnanimousWhenFew { min, .. } => min,
        }
    }

    /// Effective minimum for a bar counting `total` sources.
    pub fn effective_minimum(&self, total: usize) -> usize {
        match *self {
            ConfluencePolicy::Fixed { min } => min,
            ConfluencePolicy::UnanimousWhenFew {
                min,
                unanimity_at_or_below,
            } => {
                if total <= unanimity_at_or_below {
                    total
                } else {
                    min
                }
            }
        }
    }
}

impl Default for ConfluencePolicy {
    fn default() -> Self {
        ConfluencePolicy::Fixed { min: 5 }
    }
}

/// Dual-trigger stability gate parameters. All bounds are configuration,
/// not literals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StabilityConfig {
    pub trigger_a: String,
    pub trigger_b: String,
    /// A trigger-B confirmation is rejected while trigger-A's last flip is
    /// younger than this.
    #[serde(default = "default_min_seconds_since_flip")]
    pub min_seconds_since_flip: i64,
    /// A trigger-A confirmation requires trigger-B's last flip to be at
    /// least this old...
    #[serde(default = "default_partner_min_seconds")]
    pub partner_min_seconds: i64,
    /// ...and at most this old.
    #[serde(default = "default_partner_max_seconds")]
    pub partner_max_seconds: i64,
}

fn default_min_seconds_since_flip() -> i64 {
    30
}

fn default_partner_min_seconds() -> i64 {
    10
}

fn default_partner_max_seconds() -> i64 {
    180
}

/// Cooldown mode after validation. Exactly one mode is active per session;
/// switching modes mid-session is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownMode {
    Disabled,
    Bars(u32),
    Seconds(u32),
}

/// Full engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Priority chain for the primary trigger; the first available source
    /// wins at construction time.
    pub primary_chain: Vec<String>,
    #[serde(default)]
    pub confluence_policy: ConfluencePolicy,
    /// Bars after a primary flip during which a confirmation may still fire.
    #[serde(default = "default_max_bars_after_flip")]
    pub max_bars_after_flip: u32,
    /// Bar-counted cooldown. Mutually exclusive with `cooldown_seconds`.
    #[serde(default)]
    pub cooldown_bars: Option<u32>,
    /// Time-based cooldown. Mutually exclusive with `cooldown_bars`.
    #[serde(default)]
    pub cooldown_seconds: Option<u32>,
    /// Choppiness rate limit over the trailing minute; `None` disables.
    #[serde(default = "default_max_flips_per_minute")]
    pub max_flips_per_minute: Option<usize>,
    #[serde(default)]
    pub stability: Option<StabilityConfig>,
}

fn default_max_bars_after_flip() -> u32 {
    3
}

fn default_max_flips_per_minute() -> Option<usize> {
    Some(6)
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            primary_chain: Vec::new(),
            confluence_policy: ConfluencePolicy::default(),
            max_bars_after_flip: default_max_bars_after_flip(),
            cooldown_bars: Some(10),
            cooldown_seconds: None,
            max_flips_per_minute: default_max_flips_per_minute(),
            stability: None,
        }
    }
}

impl EngineConfig {
    /// Fail-fast validation. Returns the resolved cooldown mode.
    pub fn validate(&self) -> Result<CooldownMode, ConfigError> {
        if self.primary_chain.is_empty() {
            return Err(ConfigError::EmptyPrimaryChain);
        }
        if self.confluence_policy.min() == 0 {
            return Err(ConfigError::ZeroMinConfluence(0));
        }
        if let Some(stability) = &self.stability {
            if stability.partner_min_seconds > stability.partner_max_seconds {
                return Err(ConfigError::StabilityWindowInverted {
                    min: stability.partner_min_seconds,
                    max: stability.partner_max_seconds,
                });
            }
        }
        match (self.cooldown_bars, self.cooldown_seconds) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingCooldown),
            (Some(0), None) | (None, Some(0)) | (None, None) => Ok(CooldownMode::Disabled),
            (Some(bars), None) => Ok(CooldownMode::Bars(bars)),
            (None, Some(seconds)) => Ok(CooldownMode::Seconds(seconds)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> EngineConfig {
        EngineConfig {
            primary_chain: vec!["AIQ1".into()],
            ..EngineConfig::default()
        }
    }

    #[test]
    fn default_config_validates_to_bar_cooldown() {
        assert_eq!(base_config().validate().unwrap(), CooldownMode::Bars(10));
    }

    #[test]
    fn both_cooldown_modes_is_fatal() {
        let mut config = base_config();
        config.cooldown_seconds = Some(120);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ConflictingCooldown)
        ));
    }

    #[test]
    fn time_based_cooldown_resolves() {
        let mut config = base_config();
        config.cooldown_bars = None;
        config.cooldown_seconds = Some(120);
        assert_eq!(config.validate().unwrap(), CooldownMode::Seconds(120));
    }

    #[test]
    fn zero_cooldown_is_disabled() {
        let mut config = base_config();
        config.cooldown_bars = Some(0);
        assert_eq!(config.validate().unwrap(), CooldownMode::Disabled);
    }

    #[test]
    fn empty_primary_chain_is_fatal() {
        let config = EngineConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyPrimaryChain)
        ));
    }

    #[test]
    fn inverted_stability_window_is_fatal() {
        let mut config = base_config();
        config.stability = Some(StabilityConfig {
            trigger_a: "RR".into(),
            trigger_b: "DT".into(),
            min_seconds_since_flip: 30,
            partner_min_seconds: 200,
            partner_max_seconds: 100,
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::StabilityWindowInverted { .. })
        ));
    }

    #[test]
    fn unanimity_policy_requires_all_when_few_enabled() {
        let policy = ConfluencePolicy::UnanimousWhenFew {
            min: 4,
            unanimity_at_or_below: 4,
        };
        assert_eq!(policy.effective_minimum(3), 3);
        assert_eq!(policy.effective_minimum(4), 4);
        assert_eq!(policy.effective_minimum(6), 4);
    }

    #[test]
    fn fixed_policy_ignores_total() {
        let policy = ConfluencePolicy::Fixed { min: 5 };
        assert_eq!(policy.effective_minimum(2), 5);
        assert_eq!(policy.effective_minimum(8), 5);
    }
}
