//! Per-source flip detection.
//!
//! A flip is an edge on a source's raw direction between consecutive bars:
//! Up when the current read is long and the previous was not, Down when the
//! current read is short and the previous was not. Raw direction ignores the
//! per-source vote threshold; a signed source flips on the sign of its value
//! alone, so flip detection and confluence voting can disagree on the same
//! bar by design of the threshold.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::Direction;
use crate::sources::SourceRead;

/// Flip polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum FlipDirection {
    Up,
    Down,
}

impl FlipDirection {
    pub fn direction(self) -> Direction {
        match self {
            FlipDirection::Up => Direction::Long,
            FlipDirection::Down => Direction::Short,
        }
    }

    fn from_edge(prev: Option<Direction>, current: Option<Direction>) -> Option<Self> {
        match current {
            Some(Direction::Long) if prev != Some(Direction::Long) => Some(FlipDirection::Up),
            Some(Direction::Short) if prev != Some(Direction::Short) => Some(FlipDirection::Down),
            _ => None,
        }
    }
}

/// A detected flip on one source at one bar.
#[derive(Debug, Clone, PartialEq)]
pub struct FlipEvent {
    pub key: String,
    pub direction: FlipDirection,
    pub bar_index: usize,
    pub timestamp: DateTime<Utc>,
}

/// Tracks each source's previous raw direction across bars.
///
/// Previous state is kept for every available source, enabled or not, so
/// toggling a source mid-session never manufactures a flip out of stale
/// history. The first read of a source records state and emits nothing.
#[derive(Debug, Default)]
pub struct FlipDetector {
    prev: HashMap<String, Option<Direction>>,
}

impl FlipDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one bar and return flips for the enabled sources, in read
    /// (priority) order.
    pub fn detect(
        &mut self,
        reads: &[SourceRead],
        bar_index: usize,
        timestamp: DateTime<Utc>,
    ) -> Vec<FlipEvent> {
        let mut flips = Vec::new();
        for read in reads {
            let current = read.raw_direction();
            let prev = self.prev.insert(read.key.clone(), current);
            let Some(prev) = prev else {
                continue;
            };
            if !read.enabled {
                continue;
            }
            if let Some(direction) = FlipDirection::from_edge(prev, current) {
                flips.push(FlipEvent {
                    key: read.key.clone(),
                    direction,
                    bar_index,
                    timestamp,
                });
            }
        }
        flips
    }
}
