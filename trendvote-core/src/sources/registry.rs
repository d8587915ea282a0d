//! Source registry — the fixed, priority-ordered capability list.
//!
//! Backing indicators are resolved once at startup and treated uniformly
//! afterwards: after construction, the set and order of entries never
//! changes. Only the per-entry `enabled` flag is live; it is re-read at the
//! start of every bar and may be toggled between bars by a host UI without
//! disturbing flip history.

use super::{TrendSource, TrendValue};
use crate::domain::Bar;

/// One registered source plus its engine-facing configuration.
#[derive(Debug)]
pub struct SourceEntry {
    pub source: Box<dyn TrendSource>,
    /// Live user toggle; re-read each bar.
    pub enabled: bool,
    /// Minimum |value| for a signed source to cast a vote (pass-through
    /// per-source threshold, e.g. a minimum wave count). Ignored by bool
    /// sources.
    pub min_magnitude: f64,
}

/// Priority-ordered list of trend sources.
///
/// Registration order is load-bearing: it is the documented tie-break for
/// confirmation scanning. Two engines built from the same registration
/// sequence behave identically.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    entries: Vec<SourceEntry>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source at the next (lowest) priority position.
    pub fn register(&mut self, source: Box<dyn TrendSource>, enabled: bool, min_magnitude: f64) {
        self.entries.push(SourceEntry {
            source,
            enabled,
            min_magnitude,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    /// Toggle a source's enabled flag. Returns false if the key is unknown.
    /// Takes effect on the next processed bar; flip history of every other
    /// source is untouched.
    pub fn set_enabled(&mut self, key: &str, enabled: bool) -> bool {
        match self.entry_mut(key) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn is_enabled(&self, key: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.source.key() == key && e.enabled)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.source.key() == key)
    }

    fn entry_mut(&mut self, key: &str) -> Option<&mut SourceEntry> {
        self.entries.iter_mut().find(|e| e.source.key() == key)
    }

    /// Drive `on_bar` for every available source (enabled or not) and return
    /// the per-bar reads in priority order.
    pub fn advance(&mut self, bar: &Bar) -> Vec<SourceRead> {
        let mut reads = Vec::with_capacity(self.entries.len());
        for entry in &mut self.entries {
            if !entry.source.is_available() {
                continue;
            }
            entry.source.on_bar(bar);
            reads.push(SourceRead {
                key: entry.source.key().to_string(),
                enabled: entry.enabled,
                value: entry.source.value(),
                min_magnitude: entry.min_magnitude,
            });
        }
        reads
    }
}

/// Snapshot of one source for the current bar. Transient: rebuilt every bar.
#[derive(Debug, Clone)]
pub struct SourceRead {
    pub key: String,
    pub enabled: bool,
    pub value: TrendValue,
    pub min_magnitude: f64,
}

impl SourceRead {
    /// Thresholded direction, used for confluence voting.
    pub fn direction(&self) -> Option<crate::domain::Direction> {
        self.value.direction(self.min_magnitude)
    }

    /// Raw direction, ignoring the vote threshold. Flip detection and
    /// confirmation alignment read this: a signed source's trend is its
    /// sign, even when the vote abstains.
    pub fn raw_direction(&self) -> Option<crate::domain::Direction> {
        self.value.direction(0.0)
    }
}

/// Resolve the primary trigger from a priority chain of keys.
///
/// The chain lists candidates best-first (specialized implementation, then
/// progressively more generic fallbacks); the first entry present and
/// available in the registry wins. `None` means the chain is unresolvable,
/// which callers treat as a construction-time error.
pub fn resolve_primary(registry: &SourceRegistry, chain: &[String]) -> Option<String> {
    chain.iter().find_map(|key| {
        registry
            .entries()
            .iter()
            .find(|e| e.source.key() == key.as_str() && e.source.is_available())
            .map(|e| e.source.key().to_string())
    })
}
