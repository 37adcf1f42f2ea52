// Exponential Moving Average (EMA) indicator implementation
//
//   k      = 2 / (period + 1)
//   EMA_t  = close_t * k + EMA_{t-1} * (1 - k)
//
// Seeded with the SMA of the first `period` closes. The seed and every step are
// quantised by the configured RoundingPolicy.
use super::rounding::{quantize, RoundingPolicy};
use super::sma::sma;
use super::IndicatorCalculator;
use crate::error::EngineError;
use serde_json::Value;
use shared::models::PriceBar;

fn smoothing(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Full EMA sequence over `prices`, first element being the SMA seed.
///
/// Requires `prices.len() >= 2 * period`. The result has
/// `prices.len() - period + 1` values; element `j` belongs to bar `period - 1 + j`.
pub fn ema(prices: &[f64], period: usize, rounding: RoundingPolicy) -> Result<Vec<f64>, EngineError> {
    let required = 2 * period.max(1);
    if period == 0 || prices.len() < required {
        return Err(EngineError::insufficient(format!("EMA({})", period), required, prices.len()));
    }

    let precision = rounding.resolve(prices[0]);
    let k = smoothing(period);

    let mut previous = quantize(sma(&prices[..period], period)?, precision);
    let mut emas = Vec::with_capacity(prices.len() - period + 1);
    emas.push(previous);

    for &price in &prices[period..] {
        previous = quantize(price * k + previous * (1.0 - k), precision);
        emas.push(previous);
    }
    Ok(emas)
}

/// Streaming EMA over closing prices.
#[derive(Debug, Clone)]
pub struct Ema {
    name: String,
    period: usize,
    k: f64,
    rounding: RoundingPolicy,
    precision: Option<u32>,
    seed: Vec<f64>,
    last: Option<f64>,
    bars: usize,
}

impl Ema {
    /// # Panics
    /// If `period` is zero.
    pub fn new(period: usize, rounding: RoundingPolicy) -> Self {
        assert!(period > 0, "EMA period must be greater than 0");
        Self {
            name: format!("EMA({})", period),
            period,
            k: smoothing(period),
            rounding,
            precision: None,
            seed: Vec::with_capacity(period),
            last: None,
            bars: 0,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Precision resolved from the first price, if any price has been seen.
    pub fn precision(&self) -> Option<u32> {
        self.precision
    }

    /// Extends the recurrence with one closing price.
    pub fn push(&mut self, price: f64) -> Option<f64> {
        if self.bars == 0 {
            self.precision = self.rounding.resolve(price);
        }
        self.bars += 1;

        match self.last {
            Some(previous) => {
                self.last = Some(quantize(price * self.k + previous * (1.0 - self.k), self.precision));
            }
            None => {
                self.seed.push(price);
                if let Ok(mean) = sma(&self.seed, self.period) {
                    self.last = Some(quantize(mean, self.precision));
                    self.seed = Vec::new();
                }
            }
        }
        self.last
    }
}

impl IndicatorCalculator for Ema {
    type Output = f64;

    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period, "precision": self.precision })
    }

    fn warmup_bars(&self) -> usize {
        2 * self.period
    }

    fn bars_seen(&self) -> usize {
        self.bars
    }

    fn update(&mut self, bar: &PriceBar) -> Option<f64> {
        self.push(bar.close)
    }

    fn value(&self) -> Result<f64, EngineError> {
        match self.last {
            Some(value) if self.is_ready() => Ok(value),
            _ => Err(EngineError::insufficient(self.name.clone(), self.warmup_bars(), self.bars)),
        }
    }
}
