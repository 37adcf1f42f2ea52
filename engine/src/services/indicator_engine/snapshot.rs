// Read-only views of an IndicatorEngine session
use super::IndicatorEngine;
use crate::indicators::{Ema, IndicatorCalculator};
use shared::models::{Indicator, IndicatorSnapshot, Signal};

impl IndicatorEngine {
    /// Consistent copy of the session: bars, every derived series aligned to
    /// them, and the signals emitted so far. Repeated calls without ingestion
    /// return equal snapshots.
    pub fn snapshot(&self) -> IndicatorSnapshot {
        let len = self.series.len();
        let indicators = vec![
            Self::ema_series(&self.ema_short, &self.history.ema_short, len),
            Self::ema_series(&self.ema_long, &self.history.ema_long, len),
            Indicator {
                name: self.rsi.name().to_string(),
                parameters: self.rsi.parameters(),
                values: self.history.rsi.clone(),
            },
            Indicator {
                name: self.obv.name().to_string(),
                parameters: self.obv.parameters(),
                values: self.history.obv.clone(),
            },
            Indicator {
                name: format!("OBV_TREND({})", self.config.obv_trend_span),
                parameters: self.obv.parameters(),
                values: self.history.obv_trend.clone(),
            },
        ];

        IndicatorSnapshot {
            symbol: self.symbol.clone(),
            state: self.state,
            bars: self.series.bars().to_vec(),
            indicators,
            signals: self.history.signals.clone(),
        }
    }

    /// Signals emitted since the session became steady, oldest first.
    pub fn signals(&self) -> &[Signal] {
        &self.history.signals
    }

    // An EMA series stays blank until its own warm-up is satisfied.
    fn ema_series(ema: &Ema, values: &[Option<f64>], len: usize) -> Indicator {
        let values = if ema.is_ready() { values.to_vec() } else { vec![None; len] };
        Indicator {
            name: ema.name().to_string(),
            parameters: ema.parameters(),
            values,
        }
    }
}
