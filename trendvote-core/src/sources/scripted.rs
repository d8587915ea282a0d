//! Scripted source — deterministic reads for tests and demos.

use super::{TrendSource, TrendValue};
use crate::domain::Bar;

/// Replays a fixed sequence of trend values, one per bar.
///
/// After the script runs out the last value is held, so a short script like
/// `[false, true]` models "flips up on bar 1 and stays up".
#[derive(Debug)]
pub struct ScriptedSource {
    key: String,
    values: Vec<TrendValue>,
    cursor: Option<usize>,
    available: bool,
}

impl ScriptedSource {
    pub fn new(key: &str, values: Vec<TrendValue>) -> Self {
        Self {
            key: key.to_string(),
            values,
            cursor: None,
            available: true,
        }
    }

    pub fn from_bools(key: &str, ups: &[bool]) -> Self {
        Self::new(key, ups.iter().map(|&b| TrendValue::Bool(b)).collect())
    }

    pub fn from_signed(key: &str, values: &[f64]) -> Self {
        Self::new(key, values.iter().map(|&v| TrendValue::Signed(v)).collect())
    }

    /// A source with no backing implementation — permanently excluded.
    pub fn unavailable(key: &str) -> Self {
        Self {
            key: key.to_string(),
            values: Vec::new(),
            cursor: None,
            available: false,
        }
    }
}

impl TrendSource for ScriptedSource {
    fn key(&self) -> &str {
        &self.key
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn on_bar(&mut self, _bar: &Bar) {
        let next = match self.cursor {
            None => 0,
            Some(i) => i + 1,
        };
        self.cursor = Some(next.min(self.values.len().saturating_sub(1)));
    }

    fn value(&self) -> TrendValue {
        match self.cursor {
            Some(i) if !self.values.is_empty() => self.values[i],
            _ => TrendValue::Signed(0.0),
        }
    }
}
