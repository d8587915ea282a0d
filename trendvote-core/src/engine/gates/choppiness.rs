//! Choppiness filter — a flip-rate limiter over a trailing 60 seconds.
//!
//! Every flip from every enabled source lands in one shared log. When the
//! trailing-minute count exceeds the configured maximum the market is
//! treated as churn and confirmations are vetoed until the log drains.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

const WINDOW_SECONDS: i64 = 60;

#[derive(Debug)]
pub struct ChoppinessFilter {
    max_flips_per_minute: Option<usize>,
    recent: VecDeque<DateTime<Utc>>,
}

impl ChoppinessFilter {
    pub fn new(max_flips_per_minute: Option<usize>) -> Self {
        Self {
            max_flips_per_minute,
            recent: VecDeque::new(),
        }
    }

    pub fn record(&mut self, at: DateTime<Utc>) {
        if self.max_flips_per_minute.is_none() {
            return;
        }
        self.recent.push_back(at);
    }

    /// Drop entries older than the trailing window. Called once per bar with
    /// the bar timestamp; flip timestamps never run ahead of it.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let cutoff = now - Duration::seconds(WINDOW_SECONDS);
        while let Some(&front) = self.recent.front() {
            if front < cutoff {
                self.recent.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn recent_count(&self) -> usize {
        self.recent.len()
    }

    pub fn passes(&self) -> bool {
        match self.max_flips_per_minute {
            None => true,
            Some(max) => self.recent.len() <= max,
        }
    }
}
