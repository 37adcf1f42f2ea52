// On-Balance-Volume (OBV) and its exponentially weighted trendline
//
// OBV starts at zero and adds the bar volume on an up-close, subtracts it on a
// down-close and carries over on an unchanged close.
//
// The trendline is a bias-adjusted exponentially weighted mean with span S:
//   alpha = 2 / (S + 1)
//   num_t = x_t + (1 - alpha) * num_{t-1}
//   den_t = 1   + (1 - alpha) * den_{t-1}
//   ewm_t = num_t / den_t
// which weights x_{t-j} by (1 - alpha)^j and is defined from the first value.
use super::IndicatorCalculator;
use crate::error::EngineError;
use serde::Serialize;
use serde_json::Value;
use shared::models::PriceBar;
use std::cmp::Ordering;

fn obv_step(previous_obv: i64, previous_close: f64, close: f64, volume: u64) -> i64 {
    let volume = i64::try_from(volume).unwrap_or(i64::MAX);
    match close.partial_cmp(&previous_close) {
        Some(Ordering::Greater) => previous_obv.saturating_add(volume),
        Some(Ordering::Less) => previous_obv.saturating_sub(volume),
        _ => previous_obv,
    }
}

/// OBV for each bar; `closes` and `volumes` must be aligned.
pub fn obv(closes: &[f64], volumes: &[u64]) -> Vec<i64> {
    let mut result = Vec::with_capacity(closes.len());
    for (i, (&close, &volume)) in closes.iter().zip(volumes).enumerate() {
        let value = if i == 0 {
            0
        } else {
            obv_step(result[i - 1], closes[i - 1], close, volume)
        };
        result.push(value);
    }
    result
}

/// Bias-adjusted exponentially weighted mean of `values` with the given span.
pub fn ewm_mean(values: &[f64], span: usize) -> Vec<f64> {
    let mut ewm = Ewm::new(span);
    values.iter().map(|&v| ewm.push(v)).collect()
}

#[derive(Debug, Clone)]
struct Ewm {
    decay: f64,
    numerator: f64,
    denominator: f64,
}

impl Ewm {
    fn new(span: usize) -> Self {
        let alpha = 2.0 / (span as f64 + 1.0);
        Self {
            decay: 1.0 - alpha,
            numerator: 0.0,
            denominator: 0.0,
        }
    }

    fn push(&mut self, value: f64) -> f64 {
        self.numerator = value + self.decay * self.numerator;
        self.denominator = 1.0 + self.decay * self.denominator;
        self.numerator / self.denominator
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObvValue {
    pub obv: i64,
    pub trend: f64,
}

/// Streaming OBV with its trendline.
#[derive(Debug, Clone)]
pub struct Obv {
    name: String,
    span: usize,
    trend: Ewm,
    previous_close: Option<f64>,
    last: Option<ObvValue>,
    bars: usize,
}

impl Obv {
    /// # Panics
    /// If `span` is zero.
    pub fn new(span: usize) -> Self {
        assert!(span > 0, "OBV trend span must be greater than 0");
        Self {
            name: "OBV".to_string(),
            span,
            trend: Ewm::new(span),
            previous_close: None,
            last: None,
            bars: 0,
        }
    }

    pub fn push(&mut self, close: f64, volume: u64) -> ObvValue {
        let obv = match (self.previous_close, self.last) {
            (Some(previous_close), Some(last)) => obv_step(last.obv, previous_close, close, volume),
            _ => 0,
        };
        let value = ObvValue {
            obv,
            trend: self.trend.push(obv as f64),
        };
        self.previous_close = Some(close);
        self.last = Some(value);
        self.bars += 1;
        value
    }
}

impl IndicatorCalculator for Obv {
    type Output = ObvValue;

    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "span": self.span })
    }

    fn warmup_bars(&self) -> usize {
        1
    }

    fn bars_seen(&self) -> usize {
        self.bars
    }

    fn update(&mut self, bar: &PriceBar) -> Option<ObvValue> {
        Some(self.push(bar.close, bar.volume))
    }

    fn value(&self) -> Result<ObvValue, EngineError> {
        self.last
            .ok_or_else(|| EngineError::insufficient(self.name.clone(), self.warmup_bars(), self.bars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obv_first_bar_is_zero() {
        assert_eq!(obv(&[100.0], &[1000]), vec![0]);
    }

    #[test]
    fn test_obv_direction() {
        let closes = [10.0, 11.0, 10.5, 10.5, 12.0];
        let volumes = [5, 3, 4, 9, 2];
        assert_eq!(obv(&closes, &volumes), vec![0, 3, -1, -1, 1]);
    }

    #[test]
    fn test_obv_equal_closes_carry_over() {
        let closes = [10.0, 10.0, 10.0];
        assert_eq!(obv(&closes, &[7, 8, 9]), vec![0, 0, 0]);
    }

    #[test]
    fn test_ewm_mean_matches_closed_form() {
        // span 3 -> alpha 0.5; weights 1, 0.5, 0.25 from newest to oldest
        let values = [1.0, 2.0, 3.0];
        let ewm = ewm_mean(&values, 3);
        assert_eq!(ewm[0], 1.0);
        assert!((ewm[1] - (2.0 + 0.5) / 1.5).abs() < 1e-12);
        assert!((ewm[2] - (3.0 + 1.0 + 0.25) / 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_ewm_of_constant_is_constant() {
        assert!(ewm_mean(&[4.0; 10], 20).iter().all(|&v| (v - 4.0).abs() < 1e-12));
    }

    #[test]
    fn test_streaming_matches_batch() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + ((i * 5) % 9) as f64 - 4.0).collect();
        let volumes: Vec<u64> = (0..50).map(|i| 1 + (i % 10) as u64).collect();
        let expected_obv = obv(&closes, &volumes);
        let expected_trend = ewm_mean(&expected_obv.iter().map(|&v| v as f64).collect::<Vec<_>>(), 20);

        let mut streaming = Obv::new(20);
        for i in 0..closes.len() {
            let value = streaming.push(closes[i], volumes[i]);
            assert_eq!(value.obv, expected_obv[i]);
            assert_eq!(value.trend, expected_trend[i]);
        }
    }
}
