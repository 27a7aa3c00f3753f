//! Synthetic series generator, the substitute source when retrieval fails.
//!
//! Shape is fixed (`days` consecutive records ending today, at most
//! `MAX_SYNTHETIC_DAYS`); values are random but follow a plausible price path.

use super::DailyRecord;
use crate::clock::{Clock, SystemClock};
use crate::domain::instrument;
use crate::error::FallbackError;
use crate::shared::{round_to, Instrument};
use chrono::{Datelike, Duration, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};

/// Upper bound on a synthetic series (ten years and change). Longer requests
/// get the most recent `MAX_SYNTHETIC_DAYS` days.
pub const MAX_SYNTHETIC_DAYS: u32 = 3660;

/// Produces a substitute series. Output is never merged with real data.
pub trait FallbackGenerator: Send + Sync {
    fn generate(&self, instrument: &Instrument, days: u32) -> Result<Vec<DailyRecord>, FallbackError>;
}

/// Random-walk generator parameterized by the instrument profile table.
pub struct SyntheticGenerator {
    rng: Mutex<StdRng>,
    clock: Arc<dyn Clock>,
}

impl SyntheticGenerator {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Reproducible output for tests and demos.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl Default for SyntheticGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackGenerator for SyntheticGenerator {
    fn generate(&self, instrument: &Instrument, days: u32) -> Result<Vec<DailyRecord>, FallbackError> {
        if days == 0 {
            return Err(FallbackError::InvalidLength { days });
        }
        let days = days.min(MAX_SYNTHETIC_DAYS);

        let mut rng = self
            .rng
            .lock()
            .map_err(|_| FallbackError::Generation("rng lock poisoned".into()))?;

        let profile = instrument::profile(instrument);
        let mult = profile.volatility_multiplier;
        let crypto = instrument.is_usd_pair();
        let base_volume = if crypto { 100_000_000.0 } else { 20_000_000.0 };
        let today = self.clock.today();

        let mut out = Vec::with_capacity(days as usize);
        let mut previous_close = profile.base_price;

        for offset in (0..days).rev() {
            let date = today - Duration::days(offset as i64);
            let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
            let volume_factor = match (weekend, crypto) {
                (false, _) => 1.0,
                (true, true) => 0.8,
                (true, false) => 0.3,
            };

            let daily_return = (rng.gen::<f64>() - 0.5) * 0.06 * mult;
            let volatility = (0.005 + rng.gen::<f64>() * 0.04) * mult;

            let open = previous_close * (1.0 + (rng.gen::<f64>() - 0.5) * 0.005);
            let close = open * (1.0 + daily_return);

            let range = (close - open).abs() + volatility * open * rng.gen::<f64>() * 2.0;
            let high = open.max(close) + range * rng.gen::<f64>();
            // Keep prices positive on violent synthetic days.
            let low = (open.min(close) - range * rng.gen::<f64>()).max(open.min(close) * 0.01);

            let volume = base_volume * (0.5 + rng.gen::<f64>()) * volume_factor * (1.0 + volatility * 3.0);
            let liquidity =
                (100.0 - volatility * 800.0 + (rng.gen::<f64>() - 0.5) * 15.0).max(30.0).min(100.0);
            let performance = (close - open) / open;

            let record = DailyRecord {
                date,
                open: round_to(open, 2),
                close: round_to(close, 2),
                high: round_to(high, 2),
                low: round_to(low, 2),
                volume: volume.round(),
                volatility: round_to(volatility, 4),
                liquidity: round_to(liquidity, 1),
                performance: round_to(performance, 4),
            };
            previous_close = record.close;
            out.push(record);
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn generator() -> SyntheticGenerator {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 30, 9, 0, 0).unwrap());
        SyntheticGenerator::with_seed(7).with_clock(Arc::new(clock))
    }

    #[test]
    fn test_exact_length_consecutive_ending_today() {
        let series = generator().generate(&Instrument::from("BTC-USD"), 180).unwrap();
        assert_eq!(series.len(), 180);
        assert_eq!(series.last().unwrap().date, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
        for pair in series.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
        }
    }

    #[test]
    fn test_values_are_plausible() {
        let series = generator().generate(&Instrument::from("AAPL"), 365).unwrap();
        for r in &series {
            assert!(r.is_consistent(), "inconsistent record: {r:?}");
            assert!(r.low > 0.0);
            assert!(r.volume >= 0.0);
            assert!((30.0..=100.0).contains(&r.liquidity));
        }
        // First open stays near the profile base price.
        assert!((series[0].open - 175.0).abs() < 1.0);
    }

    #[test]
    fn test_unknown_instrument_uses_default_base() {
        let series = generator().generate(&Instrument::from("UNLISTED"), 1).unwrap();
        assert!((series[0].open - 100.0).abs() < 0.5);
    }

    #[test]
    fn test_same_seed_same_series() {
        let a = generator().generate(&Instrument::from("SPY"), 30).unwrap();
        let b = generator().generate(&Instrument::from("SPY"), 30).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_invalid_length() {
        let g = generator();
        assert_eq!(
            g.generate(&Instrument::from("SPY"), 0),
            Err(FallbackError::InvalidLength { days: 0 })
        );
    }

    #[test]
    fn test_long_requests_are_clamped() {
        let series = generator()
            .generate(&Instrument::from("SPY"), MAX_SYNTHETIC_DAYS + 500)
            .unwrap();
        assert_eq!(series.len(), MAX_SYNTHETIC_DAYS as usize);
        assert!(series.windows(2).all(|w| w[1].date - w[0].date == Duration::days(1)));
    }
}
