//! Deterministic simulated prices for demos without network access.
//!
//! Each ticker gets its own RNG stream derived from `(seed, ticker)` via
//! BLAKE3, so a series does not depend on which other tickers were fetched
//! or in what order.

use chrono::{Datelike, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, PriceBar, PriceSource};
use crate::window::DateWindow;

/// Random-walk daily closes over the window's weekdays.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    seed: u64,
    start_price: f64,
    daily_volatility: f64,
}

impl SyntheticSource {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            start_price: 10_000.0,
            daily_volatility: 0.012,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Sub-seed for one ticker.
    pub fn sub_seed(&self, symbol: &str) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(symbol.as_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    fn rng_for(&self, symbol: &str) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(symbol))
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new(42)
    }
}

impl PriceSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, symbol: &str, window: &DateWindow) -> Result<Vec<PriceBar>, DataError> {
        if !window.is_valid() {
            return Err(DataError::InvalidWindow(window.label()));
        }
        let mut rng = self.rng_for(symbol);
        // Per-ticker drift so sectors diverge over the window.
        let drift: f64 = rng.gen_range(-0.0015..0.0025);
        let mut close = self.start_price * rng.gen_range(0.5..1.5);

        let mut bars = Vec::new();
        for date in window.start.iter_days().take_while(|d| window.contains(*d)) {
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }
            let open = close;
            let shock: f64 = rng.gen_range(-1.0..1.0) * self.daily_volatility;
            close = (open * (1.0 + drift + shock)).max(0.01);
            let wiggle = rng.gen_range(0.0..self.daily_volatility) * open;
            bars.push(PriceBar {
                date,
                open,
                high: open.max(close) + wiggle,
                low: (open.min(close) - wiggle).max(0.01),
                close,
            });
        }
        Ok(bars)
    }
}
