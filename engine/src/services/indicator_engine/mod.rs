// engine/src/services/indicator_engine/mod.rs
// Per-symbol indicator session. Owns the bar history, one streaming
// calculator per indicator, the signal generator and the bar-aligned history
// that snapshots are built from. Ingestion lives in `ingest`, read-only views
// in `snapshot`.
use crate::config::IndicatorConfig;
use crate::data::PriceSeries;
use crate::error::EngineError;
use crate::indicators::{Ema, IndicatorCalculator, Obv, Rsi};
use crate::signals::SignalGenerator;
use shared::models::{SessionState, Signal};

pub mod ingest;
pub mod snapshot;

/// Bar-aligned outputs recorded for every ingested bar.
#[derive(Debug, Clone, Default)]
struct History {
    ema_short: Vec<Option<f64>>,
    ema_long: Vec<Option<f64>>,
    rsi: Vec<Option<f64>>,
    obv: Vec<Option<f64>>,
    obv_trend: Vec<Option<f64>>,
    signals: Vec<Signal>,
}

pub struct IndicatorEngine {
    symbol: String,
    config: IndicatorConfig,
    warmup: usize,
    state: SessionState,
    series: PriceSeries,
    ema_short: Ema,
    ema_long: Ema,
    rsi: Rsi,
    obv: Obv,
    signals: SignalGenerator,
    history: History,
}

impl IndicatorEngine {
    pub fn new(symbol: impl Into<String>, config: IndicatorConfig) -> Result<Self, EngineError> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(EngineError::ConfigError("symbol must not be empty".to_string()));
        }
        config.validate()?;

        let warmup = config.warmup_bars();
        tracing::info!(
            symbol = %symbol,
            short = config.short_ema_period,
            long = config.long_ema_period,
            rsi_window = config.rsi_window,
            obv_trend_span = config.obv_trend_span,
            warmup,
            "Indicator session created"
        );

        Ok(IndicatorEngine {
            ema_short: Ema::new(config.short_ema_period, config.rounding),
            ema_long: Ema::new(config.long_ema_period, config.rounding),
            rsi: Rsi::new(config.rsi_window),
            obv: Obv::new(config.obv_trend_span),
            signals: SignalGenerator::new(config.rsi_buy_threshold, config.rsi_sell_threshold),
            symbol,
            config,
            warmup,
            state: SessionState::Uninitialized,
            series: PriceSeries::new(),
            history: History::default(),
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Bars required before rows and signals are emitted. The session turns
    /// steady on the bar that brings the length up to this count.
    pub fn warmup_bars(&self) -> usize {
        self.warmup
    }

    /// Number of accepted bars.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn ema_short(&self) -> Result<f64, EngineError> {
        self.ema_short.value()
    }

    pub fn ema_long(&self) -> Result<f64, EngineError> {
        self.ema_long.value()
    }

    pub fn rsi(&self) -> Result<f64, EngineError> {
        self.rsi.value()
    }

    pub fn obv(&self) -> Result<i64, EngineError> {
        self.obv.value().map(|v| v.obv)
    }

    pub fn obv_trend(&self) -> Result<f64, EngineError> {
        self.obv.value().map(|v| v.trend)
    }

    /// Ends the session. Further ingestion fails with `SessionClosed`; reads
    /// keep working. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;
        tracing::info!(
            symbol = %self.symbol,
            bars = self.series.len(),
            signals = self.history.signals.len(),
            "Indicator session closed"
        );
    }

    fn ensure_open(&self) -> Result<(), EngineError> {
        if self.state == SessionState::Closed {
            tracing::warn!(symbol = %self.symbol, "Rejected bar for closed session");
            return Err(EngineError::SessionClosed(self.symbol.clone()));
        }
        Ok(())
    }
}
