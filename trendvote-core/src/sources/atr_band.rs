//! ATR-band trend source with wave counting — a self-hosted fallback
//! indicator in the solar-wave family.
//!
//! Direction flips when the close crosses an ATR-multiple band around hl2;
//! bands ratchet (support only rises, resistance only falls) while the trend
//! holds. The read is a signed wave count: +n after n bars of uptrend, -n
//! after n bars of downtrend, so a `min_magnitude` on the registry entry
//! acts as a minimum-wave-count vote threshold.

use super::{TrendSource, TrendValue};
use crate::domain::Bar;

#[derive(Debug)]
pub struct AtrBandSource {
    key: String,
    period: usize,
    multiplier: f64,
    prev_close: Option<f64>,
    // Wilder ATR seed: SMA of the first `period` true ranges.
    tr_sum: f64,
    tr_count: usize,
    atr: Option<f64>,
    upper_band: f64,
    lower_band: f64,
    trending_up: bool,
    wave_count: i64,
}

impl AtrBandSource {
    pub fn new(key: &str, period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        assert!(multiplier > 0.0, "band multiplier must be > 0");
        Self {
            key: key.to_string(),
            period,
            multiplier,
            prev_close: None,
            tr_sum: 0.0,
            tr_count: 0,
            atr: None,
            upper_band: f64::MAX,
            lower_band: f64::MIN,
            trending_up: true,
            wave_count: 0,
        }
    }

    fn true_range(&self, bar: &Bar) -> f64 {
        match self.prev_close {
            Some(pc) => (bar.high - bar.low)
                .max((bar.high - pc).abs())
                .max((bar.low - pc).abs()),
            None => bar.high - bar.low,
        }
    }
}

impl TrendSource for AtrBandSource {
    fn key(&self) -> &str {
        &self.key
    }

    fn on_bar(&mut self, bar: &Bar) {
        if bar.is_void() {
            return;
        }
        let tr = self.true_range(bar);
        let prev_close = self.prev_close;
        self.prev_close = Some(bar.close);

        let atr = match self.atr {
            None => {
                self.tr_sum += tr;
                self.tr_count += 1;
                if self.tr_count < self.period {
                    return;
                }
                let seed = self.tr_sum / self.period as f64;
                self.atr = Some(seed);
                seed
            }
            Some(prev) => {
                // Wilder smoothing
                let atr = (prev * (self.period as f64 - 1.0) + tr) / self.period as f64;
                self.atr = Some(atr);
                atr
            }
        };

        let hl2 = (bar.high + bar.low) / 2.0;
        let basic_upper = hl2 + self.multiplier * atr;
        let basic_lower = hl2 - self.multiplier * atr;

        if self.wave_count == 0 {
            // First bar with a valid ATR: start trending up from support.
            self.upper_band = basic_upper;
            self.lower_band = basic_lower;
            self.trending_up = true;
            self.wave_count = 1;
            return;
        }

        // Bands only tighten while price respects them.
        self.upper_band = match prev_close {
            Some(pc) if pc <= self.upper_band => basic_upper.min(self.upper_band),
            _ => basic_upper,
        };
        self.lower_band = match prev_close {
            Some(pc) if pc >= self.lower_band => basic_lower.max(self.lower_band),
            _ => basic_lower,
        };

        if self.trending_up && bar.close < self.lower_band {
            self.trending_up = false;
            self.wave_count = 1;
        } else if !self.trending_up && bar.close > self.upper_band {
            self.trending_up = true;
            self.wave_count = 1;
        } else {
            self.wave_count += 1;
        }
    }

    fn value(&self) -> TrendValue {
        if self.atr.is_none() {
            return TrendValue::Signed(0.0);
        }
        let signed = if self.trending_up {
            self.wave_count as f64
        } else {
            -(self.wave_count as f64)
        };
        TrendValue::Signed(signed)
    }
}
