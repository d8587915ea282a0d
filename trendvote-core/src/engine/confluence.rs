//! Confluence counting — the per-bar vote tally.

use serde::Serialize;

use crate::domain::Direction;
use crate::sources::SourceRead;

/// One bar's vote tally over the enabled, available sources.
///
/// Every counted source contributes to `total` whether or not it votes, so
/// `bull + bear <= total` and the shortfall is the abstention count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfluenceSnapshot {
    pub bull: usize,
    pub bear: usize,
    pub total: usize,
}

impl ConfluenceSnapshot {
    /// Votes aligned with `direction`.
    pub fn aligned(&self, direction: Direction) -> usize {
        match direction {
            Direction::Long => self.bull,
            Direction::Short => self.bear,
        }
    }

    pub fn abstained(&self) -> usize {
        self.total - self.bull - self.bear
    }
}

/// Tally the enabled reads for one bar. Votes use each source's thresholded
/// direction; a threshold shortfall abstains but still counts toward total.
pub fn tally(reads: &[SourceRead]) -> ConfluenceSnapshot {
    let mut snapshot = ConfluenceSnapshot::default();
    for read in reads {
        if !read.enabled {
            continue;
        }
        snapshot.total += 1;
        match read.direction() {
            Some(Direction::Long) => snapshot.bull += 1,
            Some(Direction::Short) => snapshot.bear += 1,
            None => {}
        }
    }
    snapshot
}
