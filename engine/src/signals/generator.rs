// Streaming signal generator: evaluates the three detectors one bar at a time.
use super::crossover::{crossover, threshold};
use shared::models::{PriceBar, Signal, SignalKind, SignalSource};

/// Indicator values available for the bar being evaluated. `None` marks an
/// input still inside its warm-up window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignalInputs {
    pub ema: Option<(f64, f64)>,
    pub obv: Option<(f64, f64)>,
    pub rsi: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct SignalGenerator {
    rsi_buy_threshold: f64,
    rsi_sell_threshold: f64,
    previous_ema: Option<(f64, f64)>,
    previous_obv: Option<(f64, f64)>,
}

impl SignalGenerator {
    pub fn new(rsi_buy_threshold: f64, rsi_sell_threshold: f64) -> Self {
        Self {
            rsi_buy_threshold,
            rsi_sell_threshold,
            previous_ema: None,
            previous_obv: None,
        }
    }

    /// Evaluates every detector for `bar` and remembers this bar's pairs for
    /// the next call. Returns one signal per detector, in source order.
    pub fn evaluate(&mut self, bar: &PriceBar, inputs: SignalInputs) -> Vec<Signal> {
        let ema = Self::step(&mut self.previous_ema, inputs.ema);
        let obv = Self::step(&mut self.previous_obv, inputs.obv);
        let rsi = inputs
            .rsi
            .map_or(SignalKind::None, |v| threshold(v, self.rsi_buy_threshold, self.rsi_sell_threshold));

        [
            (SignalSource::EmaCrossover, ema),
            (SignalSource::ObvCrossover, obv),
            (SignalSource::RsiThreshold, rsi),
        ]
        .into_iter()
        .map(|(source, kind)| Signal {
            timestamp: bar.timestamp,
            kind,
            source,
            price: bar.close,
        })
        .collect()
    }

    fn step(previous: &mut Option<(f64, f64)>, current: Option<(f64, f64)>) -> SignalKind {
        let kind = current.map_or(SignalKind::None, |pair| crossover(*previous, pair));
        *previous = current;
        kind
    }
}
