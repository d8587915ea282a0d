//! Trigger window state machine and the confirmation scan.
//!
//! A primary-trigger flip opens a bounded window: the signal thesis
//! ("primary just turned") stays actionable for `max_bars_after_flip` bars
//! after the flip bar, then expires silently. At most one window is open at
//! a time; an opposite flip replaces the current window rather than
//! coexisting with it.

use crate::domain::Direction;
use crate::engine::flip::{FlipDirection, FlipEvent};
use crate::sources::SourceRead;

/// Window state. `bars_elapsed` is 0 on the flip bar itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Closed,
    OpenLong { bars_elapsed: u32 },
    OpenShort { bars_elapsed: u32 },
}

/// State transition visible to observers this bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    Opened(Direction),
    Expired(Direction),
}

#[derive(Debug)]
pub struct TriggerWindow {
    state: WindowState,
    max_bars_after_flip: u32,
}

impl TriggerWindow {
    pub fn new(max_bars_after_flip: u32) -> Self {
        Self {
            state: WindowState::Closed,
            max_bars_after_flip,
        }
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    /// Direction of the open window, if any.
    pub fn direction(&self) -> Option<Direction> {
        match self.state {
            WindowState::Closed => None,
            WindowState::OpenLong { .. } => Some(Direction::Long),
            WindowState::OpenShort { .. } => Some(Direction::Short),
        }
    }

    /// Advance one bar. A primary flip opens (or replaces) the window at
    /// zero elapsed bars; otherwise an open window ages and expires once its
    /// age exceeds the bound.
    pub fn on_bar(&mut self, primary_flip: Option<FlipDirection>) -> Option<WindowEvent> {
        if let Some(flip) = primary_flip {
            let direction = flip.direction();
            self.state = match direction {
                Direction::Long => WindowState::OpenLong { bars_elapsed: 0 },
                Direction::Short => WindowState::OpenShort { bars_elapsed: 0 },
            };
            return Some(WindowEvent::Opened(direction));
        }
        match self.state {
            WindowState::Closed => None,
            WindowState::OpenLong { bars_elapsed } => {
                if bars_elapsed + 1 > self.max_bars_after_flip {
                    self.state = WindowState::Closed;
                    Some(WindowEvent::Expired(Direction::Long))
                } else {
                    self.state = WindowState::OpenLong {
                        bars_elapsed: bars_elapsed + 1,
                    };
                    None
                }
            }
            WindowState::OpenShort { bars_elapsed } => {
                if bars_elapsed + 1 > self.max_bars_after_flip {
                    self.state = WindowState::Closed;
                    Some(WindowEvent::Expired(Direction::Short))
                } else {
                    self.state = WindowState::OpenShort {
                        bars_elapsed: bars_elapsed + 1,
                    };
                    None
                }
            }
        }
    }

    /// Close after a signal fires. One signal per window.
    pub fn close(&mut self) {
        self.state = WindowState::Closed;
    }
}

/// Scan for a confirming source while a window is open.
///
/// Two passes over the reads in priority order, primary excluded:
/// 1. a source that flipped in the window's direction *this bar*;
/// 2. a source already trending in the window's direction.
/// Fresh flips outrank steady alignment regardless of priority, so the
/// trigger label credits the newest evidence. Alignment uses the raw
/// direction; vote thresholds belong to confluence, not confirmation.
pub fn find_confirmation(
    direction: Direction,
    primary_key: &str,
    reads: &[SourceRead],
    flips: &[FlipEvent],
) -> Option<String> {
    let flipped_with = |read: &SourceRead| {
        flips
            .iter()
            .any(|f| f.key == read.key && f.direction.direction() == direction)
    };
    let candidates = || {
        reads
            .iter()
            .filter(|r| r.enabled && r.key != primary_key)
    };
    if let Some(read) = candidates().find(|r| flipped_with(r)) {
        return Some(read.key.clone());
    }
    candidates()
        .find(|r| r.raw_direction() == Some(direction))
        .map(|r| r.key.clone())
}
