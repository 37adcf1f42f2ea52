// Relative Strength Index (RSI) indicator implementation
//
// Rolling-mean variant: average gain and loss are plain means over the last
// `window` deltas, taken over however many bars exist while the window fills.
// The first bar has no predecessor and contributes a zero delta.
//
//   RS  = avg_gain / avg_loss
//   RSI = 100 - 100 / (1 + RS),   and 100 whenever avg_loss == 0
//
// Deltas between extreme closes can overflow to infinity; infinite gains and
// losses together read 50.
use super::ring_buffer::RingBuffer;
use super::IndicatorCalculator;
use crate::error::EngineError;
use serde_json::Value;
use shared::models::PriceBar;

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    // Both sides overflowed; treat as balanced.
    if avg_gain.is_infinite() && avg_loss.is_infinite() {
        return 50.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

fn split_delta(delta: f64) -> (f64, f64) {
    (delta.max(0.0), (-delta).max(0.0))
}

/// RSI for every bar of `closes`, same length and alignment.
pub fn rsi(closes: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return Vec::new();
    }
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    let mut result = Vec::with_capacity(closes.len());

    for i in 0..closes.len() {
        let delta = if i == 0 { 0.0 } else { closes[i] - closes[i - 1] };
        let (gain, loss) = split_delta(delta);
        gains.push(gain);
        losses.push(loss);

        let start = (i + 1).saturating_sub(window);
        let count = (i + 1 - start) as f64;
        let avg_gain = gains[start..=i].iter().sum::<f64>() / count;
        let avg_loss = losses[start..=i].iter().sum::<f64>() / count;
        result.push(rsi_from_averages(avg_gain, avg_loss));
    }
    result
}

/// Streaming RSI; keeps only the last `window` gains and losses.
#[derive(Debug, Clone)]
pub struct Rsi {
    name: String,
    window: usize,
    gains: RingBuffer,
    losses: RingBuffer,
    previous_close: Option<f64>,
    last: Option<f64>,
    bars: usize,
}

impl Rsi {
    /// # Panics
    /// If `window` is zero.
    pub fn new(window: usize) -> Self {
        assert!(window > 0, "RSI window must be greater than 0");
        Self {
            name: format!("RSI({})", window),
            window,
            gains: RingBuffer::new(window),
            losses: RingBuffer::new(window),
            previous_close: None,
            last: None,
            bars: 0,
        }
    }

    pub fn push(&mut self, close: f64) -> f64 {
        let delta = self.previous_close.map_or(0.0, |previous| close - previous);
        let (gain, loss) = split_delta(delta);
        self.gains.push(gain);
        self.losses.push(loss);
        self.previous_close = Some(close);
        self.bars += 1;

        let avg_gain = self.gains.mean().unwrap_or(0.0);
        let avg_loss = self.losses.mean().unwrap_or(0.0);
        let value = rsi_from_averages(avg_gain, avg_loss);
        self.last = Some(value);
        value
    }
}

impl IndicatorCalculator for Rsi {
    type Output = f64;

    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "window": self.window })
    }

    fn warmup_bars(&self) -> usize {
        // min_periods = 1: defined from the first bar
        1
    }

    fn bars_seen(&self) -> usize {
        self.bars
    }

    fn update(&mut self, bar: &PriceBar) -> Option<f64> {
        Some(self.push(bar.close))
    }

    fn value(&self) -> Result<f64, EngineError> {
        self.last
            .ok_or_else(|| EngineError::insufficient(self.name.clone(), self.warmup_bars(), self.bars))
    }
}
