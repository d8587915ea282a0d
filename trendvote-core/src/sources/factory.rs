//! Source factory — converts serializable `SourceConfig` entries into a
//! runtime `SourceRegistry`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{AtrBandSource, EmaTrendSource, SourceRegistry, TrendSource};

/// Errors that can occur during source construction.
#[derive(Debug, thiserror::Error)]
pub enum SourceFactoryError {
    #[error("Unknown source type: {0}")]
    UnknownSource(String),
    #[error("Duplicate source key: {0}")]
    DuplicateKey(String),
}

/// Configuration of a single trend source.
///
/// Uses `BTreeMap` for deterministic key ordering during serialization →
/// hashing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    /// Stable key, used in trigger labels and the primary chain.
    pub key: String,
    /// Source type name, e.g. "ema_trend" or "atr_band".
    pub source_type: String,
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Per-source vote threshold (minimum |value| for signed sources).
    #[serde(default)]
    pub min_magnitude: f64,
}

fn default_enabled() -> bool {
    true
}

fn param(config: &SourceConfig, name: &str, default: f64) -> f64 {
    config.params.get(name).copied().unwrap_or(default)
}

fn param_usize(config: &SourceConfig, name: &str, default: usize) -> usize {
    config
        .params
        .get(name)
        .copied()
        .map(|v| v as usize)
        .unwrap_or(default)
}

/// Create a trend source from a `SourceConfig`.
pub fn create_source(config: &SourceConfig) -> Result<Box<dyn TrendSource>, SourceFactoryError> {
    match config.source_type.as_str() {
        "ema_trend" => {
            let period = param_usize(config, "period", 20);
            Ok(Box::new(EmaTrendSource::new(&config.key, period)))
        }
        "atr_band" => {
            let period = param_usize(config, "period", 14);
            let multiplier = param(config, "multiplier", 2.0);
            Ok(Box::new(AtrBandSource::new(&config.key, period, multiplier)))
        }
        other => Err(SourceFactoryError::UnknownSource(other.to_string())),
    }
}

/// Build a registry from an ordered list of source configs.
///
/// List order becomes registry priority order, which in turn is the
/// confirmation tie-break order.
pub fn build_registry(configs: &[SourceConfig]) -> Result<SourceRegistry, SourceFactoryError> {
    let mut registry = SourceRegistry::new();
    for config in configs {
        if registry.contains(&config.key) {
            return Err(SourceFactoryError::DuplicateKey(config.key.clone()));
        }
        let source = create_source(config)?;
        registry.register(source, config.enabled, config.min_magnitude);
    }
    Ok(registry)
}
