// Bar ingestion for IndicatorEngine. Validation happens before any state is
// touched, so a rejected bar (or batch) leaves the session unchanged.
use super::IndicatorEngine;
use crate::data::price_series::validate_bar;
use crate::error::EngineError;
use crate::indicators::IndicatorCalculator;
use crate::signals::SignalInputs;
use shared::models::{IndicatorRow, IndicatorValues, PriceBar, SessionState};

impl IndicatorEngine {
    /// Appends one bar and advances every calculator. Returns the bar's row
    /// once the session is steady, `None` while warming up.
    pub fn ingest(&mut self, bar: PriceBar) -> Result<Option<IndicatorRow>, EngineError> {
        self.ensure_open()?;
        if let Err(e) = self.series.validate_next(&bar) {
            tracing::warn!(symbol = %self.symbol, error = %e, "Rejected bar");
            return Err(e);
        }
        Ok(self.apply(bar))
    }

    /// Appends `bars` in order. The whole batch is validated first; if any bar
    /// is rejected nothing is appended. Returns the rows of the steady bars.
    pub fn ingest_batch(&mut self, bars: &[PriceBar]) -> Result<Vec<IndicatorRow>, EngineError> {
        self.ensure_open()?;
        let mut previous = self.series.last();
        for (idx, bar) in bars.iter().enumerate() {
            if let Err(e) = validate_bar(bar, previous) {
                tracing::warn!(symbol = %self.symbol, index = idx, error = %e, "Rejected batch");
                return Err(e);
            }
            previous = Some(bar);
        }

        let rows: Vec<IndicatorRow> = bars.iter().filter_map(|bar| self.apply(bar.clone())).collect();
        tracing::debug!(symbol = %self.symbol, bars = bars.len(), rows = rows.len(), "Batch ingested");
        Ok(rows)
    }

    // Infallible once the bar is validated.
    fn apply(&mut self, bar: PriceBar) -> Option<IndicatorRow> {
        let ema_short = self.ema_short.update(&bar);
        let ema_long = self.ema_long.update(&bar);
        let rsi = self.rsi.update(&bar);
        let obv = self.obv.update(&bar);

        self.history.ema_short.push(ema_short);
        self.history.ema_long.push(ema_long);
        self.history.rsi.push(rsi);
        self.history.obv.push(obv.map(|v| v.obv as f64));
        self.history.obv_trend.push(obv.map(|v| v.trend));

        // Detectors only see values from calculators past their warm-up, so the
        // first evaluable pair has no predecessor and reads None.
        let emas_ready = self.ema_short.is_ready() && self.ema_long.is_ready();
        let obv_ready = self.obv.is_ready();
        let rsi_ready = self.rsi.is_ready();
        let signals = self.signals.evaluate(
            &bar,
            SignalInputs {
                ema: ema_short.zip(ema_long).filter(|_| emas_ready),
                obv: obv.filter(|_| obv_ready).map(|v| (v.obv as f64, v.trend)),
                rsi: rsi.filter(|_| rsi_ready),
            },
        );

        tracing::debug!(
            symbol = %self.symbol,
            timestamp = %bar.timestamp,
            close = bar.close,
            ?ema_short,
            ?ema_long,
            ?rsi,
            "Bar ingested"
        );
        self.series.push(bar);
        self.advance_state();

        if self.state != SessionState::Steady {
            return None;
        }
        let (Some(ema_short), Some(ema_long), Some(rsi), Some(obv)) = (ema_short, ema_long, rsi, obv) else {
            return None;
        };
        self.history.signals.extend(signals.iter().cloned());
        let bar = self.series.last()?.clone();
        Some(IndicatorRow {
            bar,
            values: IndicatorValues {
                ema_short,
                ema_long,
                rsi,
                obv: obv.obv as f64,
                obv_trend: obv.trend,
            },
            signals,
        })
    }

    fn advance_state(&mut self) {
        let next = if self.series.len() >= self.warmup {
            SessionState::Steady
        } else {
            SessionState::Warming
        };
        if next != self.state {
            tracing::info!(symbol = %self.symbol, from = ?self.state, to = ?next, bars = self.series.len(), "Session state changed");
            self.state = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndicatorConfig;
    use chrono::{Duration, TimeZone, Utc};
    use shared::models::SignalKind;

    fn bar(minute: i64, close: f64, volume: u64) -> PriceBar {
        let ts = Utc.with_ymd_and_hms(2024, 5, 6, 14, 0, 0).unwrap() + Duration::minutes(minute);
        PriceBar::new(ts, close, close, close, close, volume)
    }

    fn small_config() -> IndicatorConfig {
        let mut config = IndicatorConfig::new(2, 3);
        config.rsi_window = 3;
        config.obv_trend_span = 4;
        config
    }

    #[test]
    fn test_warming_until_requirement_met() {
        let mut engine = IndicatorEngine::new("XYZ", small_config()).unwrap();
        assert_eq!(engine.warmup_bars(), 6);
        for i in 0..5 {
            assert!(engine.ingest(bar(i, 10.0 + i as f64, 5)).unwrap().is_none());
            assert_eq!(engine.state(), SessionState::Warming);
        }
        let row = engine.ingest(bar(5, 15.0, 5)).unwrap().unwrap();
        assert_eq!(engine.state(), SessionState::Steady);
        assert_eq!(row.bar.close, 15.0);
        assert_eq!(row.signals.len(), 3);
        assert_eq!(row.values.obv, 25.0);
        assert_eq!(row.values.rsi, 100.0);
    }

    #[test]
    fn test_rejected_bar_leaves_state_unchanged() {
        let mut engine = IndicatorEngine::new("XYZ", small_config()).unwrap();
        engine.ingest(bar(3, 10.0, 1)).unwrap();
        let err = engine.ingest(bar(2, 11.0, 1)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidBar(_)));
        assert_eq!(engine.len(), 1);

        let mut broken = bar(4, 11.0, 1);
        broken.close = f64::NAN;
        assert!(engine.ingest(broken).is_err());
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.rsi().unwrap(), 100.0);
    }

    #[test]
    fn test_batch_is_atomic() {
        let mut engine = IndicatorEngine::new("XYZ", small_config()).unwrap();
        let mut bars: Vec<PriceBar> = (0..4).map(|i| bar(i, 10.0, 1)).collect();
        bars[2].high = 9.0;
        assert!(engine.ingest_batch(&bars).is_err());
        assert!(engine.is_empty());
        assert_eq!(engine.state(), SessionState::Uninitialized);
    }

    #[test]
    fn test_batch_matches_single_ingest() {
        let bars: Vec<PriceBar> = (0..12).map(|i| bar(i, 10.0 + ((i * 7) % 5) as f64, 2 + i as u64)).collect();

        let mut batched = IndicatorEngine::new("XYZ", small_config()).unwrap();
        let batch_rows = batched.ingest_batch(&bars).unwrap();

        let mut single = IndicatorEngine::new("XYZ", small_config()).unwrap();
        let single_rows: Vec<IndicatorRow> = bars.iter().filter_map(|b| single.ingest(b.clone()).unwrap()).collect();

        assert_eq!(batch_rows.len(), 7);
        assert_eq!(batch_rows, single_rows);
    }

    #[test]
    fn test_ingest_after_close_fails() {
        let mut engine = IndicatorEngine::new("XYZ", small_config()).unwrap();
        engine.ingest(bar(0, 10.0, 1)).unwrap();
        engine.close();
        assert!(matches!(engine.ingest(bar(1, 10.0, 1)), Err(EngineError::SessionClosed(_))));
        assert!(matches!(engine.ingest_batch(&[bar(1, 10.0, 1)]), Err(EngineError::SessionClosed(_))));
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.obv().unwrap(), 0);
    }

    #[test]
    fn test_first_steady_bar_has_no_ema_crossover() {
        let mut config = IndicatorConfig::new(2, 3);
        config.rsi_window = 2;
        config.obv_trend_span = 2;
        config.rounding = crate::indicators::RoundingPolicy::Disabled;
        let mut engine = IndicatorEngine::new("XYZ", config).unwrap();

        for (i, close) in [10.0, 9.0, 8.0, 7.0, 6.0].into_iter().enumerate() {
            assert!(engine.ingest(bar(i as i64, close, 1)).unwrap().is_none());
        }
        // Short EMA sits below the long one while EMA(3) is still warming;
        // that pair must not count as the previous one.
        assert!(matches!(engine.ema_long(), Err(EngineError::InsufficientData { required: 6, available: 5, .. })));

        let row = engine.ingest(bar(5, 20.0, 1)).unwrap().unwrap();
        assert_eq!(row.signal(shared::models::SignalSource::EmaCrossover), SignalKind::None);
        assert!(row.values.ema_short > row.values.ema_long);
    }

    #[test]
    fn test_rsi_threshold_signals_in_steady_state() {
        let mut engine = IndicatorEngine::new("XYZ", small_config()).unwrap();
        let rows = engine.ingest_batch(&(0..8).map(|i| bar(i, 10.0 + i as f64, 1)).collect::<Vec<_>>()).unwrap();
        assert!(rows.iter().all(|r| r.signal(shared::models::SignalSource::RsiThreshold) == SignalKind::Sell));
    }
}
