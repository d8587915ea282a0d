//! EMA-slope trend source — a self-hosted fallback indicator.
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1]
//! Seed: SMA of the first `period` close values.
//! Trend read: sign of close - EMA. Abstains (zero) until seeded.

use super::{TrendSource, TrendValue};
use crate::domain::Bar;

#[derive(Debug)]
pub struct EmaTrendSource {
    key: String,
    period: usize,
    alpha: f64,
    seed_sum: f64,
    seed_count: usize,
    ema: Option<f64>,
    delta: f64,
}

impl EmaTrendSource {
    pub fn new(key: &str, period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            key: key.to_string(),
            period,
            alpha: 2.0 / (period as f64 + 1.0),
            seed_sum: 0.0,
            seed_count: 0,
            ema: None,
            delta: 0.0,
        }
    }
}

impl TrendSource for EmaTrendSource {
    fn key(&self) -> &str {
        &self.key
    }

    fn on_bar(&mut self, bar: &Bar) {
        if bar.close.is_nan() {
            // Void bar: hold state, abstain this bar.
            self.delta = 0.0;
            return;
        }
        match self.ema {
            None => {
                self.seed_sum += bar.close;
                self.seed_count += 1;
                if self.seed_count >= self.period {
                    let seed = self.seed_sum / self.period as f64;
                    self.ema = Some(seed);
                    self.delta = bar.close - seed;
                } else {
                    self.delta = 0.0;
                }
            }
            Some(prev) => {
                let ema = self.alpha * bar.close + (1.0 - self.alpha) * prev;
                self.ema = Some(ema);
                self.delta = bar.close - ema;
            }
        }
    }

    fn value(&self) -> TrendValue {
        TrendValue::Signed(self.delta)
    }
}
