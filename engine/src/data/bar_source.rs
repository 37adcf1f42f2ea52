// Tick sources: each call hands the engine the bars that became available
// since the previous tick.
use super::csv_parser::BarCsvParser;
use crate::error::EngineError;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::models::PriceBar;
use shared::utils::round_to;
use std::path::Path;

pub trait BarSource {
    /// Next ordered batch of bars. An empty batch means the source is exhausted.
    fn next_batch(&mut self) -> Result<Vec<PriceBar>, EngineError>;
}

/// Random-walk bar simulator: each bar opens at the previous close, high and
/// low stray up to 0.2 from the open, the close lands between them and volume
/// is 1..=10. Prices are rounded to cents, bars are one minute apart.
pub struct RandomWalkSource {
    rng: StdRng,
    current_price: f64,
    next_timestamp: DateTime<Utc>,
    bars_per_tick: usize,
}

impl RandomWalkSource {
    pub fn new(start_price: f64, start_time: DateTime<Utc>, bars_per_tick: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            current_price: start_price,
            next_timestamp: start_time,
            bars_per_tick: bars_per_tick.max(1),
        }
    }

    fn next_bar(&mut self) -> PriceBar {
        let open = self.current_price;
        let high = open + self.rng.gen_range(0.0..0.2);
        let low = open - self.rng.gen_range(0.0..0.2);
        let close = self.rng.gen_range(low..=high);
        let volume = self.rng.gen_range(1..=10);
        self.current_price = close;

        let timestamp = self.next_timestamp;
        self.next_timestamp = timestamp + Duration::minutes(1);

        PriceBar {
            timestamp,
            open: round_to(open, 2),
            high: round_to(high, 2),
            low: round_to(low, 2),
            close: round_to(close, 2),
            volume,
        }
    }
}

impl BarSource for RandomWalkSource {
    fn next_batch(&mut self) -> Result<Vec<PriceBar>, EngineError> {
        Ok((0..self.bars_per_tick).map(|_| self.next_bar()).collect())
    }
}

/// Replays a CSV bar file in fixed-size batches.
pub struct CsvReplaySource {
    bars: std::vec::IntoIter<PriceBar>,
    bars_per_tick: usize,
}

impl CsvReplaySource {
    pub fn open(path: impl AsRef<Path>, bars_per_tick: usize) -> Result<Self, EngineError> {
        let bars = BarCsvParser::load_bars_from_csv(path.as_ref())?;
        tracing::info!(path = %path.as_ref().display(), bars = bars.len(), "Loaded replay file");
        Ok(Self::from_bars(bars, bars_per_tick))
    }

    pub fn from_bars(bars: Vec<PriceBar>, bars_per_tick: usize) -> Self {
        Self {
            bars: bars.into_iter(),
            bars_per_tick: bars_per_tick.max(1),
        }
    }
}

impl BarSource for CsvReplaySource {
    fn next_batch(&mut self) -> Result<Vec<PriceBar>, EngineError> {
        Ok(self.bars.by_ref().take(self.bars_per_tick).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_random_walk_bars_are_well_formed() {
        let mut source = RandomWalkSource::new(200.0, start(), 50, Some(7));
        let bars = source.next_batch().unwrap();
        assert_eq!(bars.len(), 50);
        assert_eq!(bars[0].open, 200.0);
        for pair in bars.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, Duration::minutes(1));
            assert_eq!(pair[1].open, pair[0].close);
        }
        for bar in &bars {
            assert!(bar.low <= bar.close && bar.close <= bar.high, "{:?}", bar);
            assert!((1..=10).contains(&bar.volume));
            assert_eq!(round_to(bar.close, 2), bar.close);
        }
    }

    #[test]
    fn test_random_walk_is_reproducible_with_seed() {
        let a = RandomWalkSource::new(100.0, start(), 10, Some(42)).next_batch().unwrap();
        let b = RandomWalkSource::new(100.0, start(), 10, Some(42)).next_batch().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_walk_continues_across_ticks() {
        let mut source = RandomWalkSource::new(100.0, start(), 3, Some(1));
        let first = source.next_batch().unwrap();
        let second = source.next_batch().unwrap();
        assert_eq!(second[0].timestamp, first[2].timestamp + Duration::minutes(1));
    }

    #[test]
    fn test_replay_batches_until_exhausted() {
        let bars = RandomWalkSource::new(100.0, start(), 7, Some(3)).next_batch().unwrap();
        let mut replay = CsvReplaySource::from_bars(bars.clone(), 3);
        assert_eq!(replay.next_batch().unwrap(), bars[0..3].to_vec());
        assert_eq!(replay.next_batch().unwrap(), bars[3..6].to_vec());
        assert_eq!(replay.next_batch().unwrap(), bars[6..7].to_vec());
        assert!(replay.next_batch().unwrap().is_empty());
    }
}
