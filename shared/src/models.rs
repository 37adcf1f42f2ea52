use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV observation. Bars are immutable once appended to a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    pub fn new(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        PriceBar { timestamp, open, high, low, close, volume }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Buy,
    Sell,
    None,
}

impl SignalKind {
    /// Buy becomes Sell and vice versa; None stays None.
    pub fn inverted(self) -> Self {
        match self {
            SignalKind::Buy => SignalKind::Sell,
            SignalKind::Sell => SignalKind::Buy,
            SignalKind::None => SignalKind::None,
        }
    }
}

/// Which detector produced a signal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SignalSource {
    EmaCrossover,
    ObvCrossover,
    RsiThreshold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub timestamp: DateTime<Utc>,
    pub kind: SignalKind,
    pub source: SignalSource,
    /// Close of the bar the signal was evaluated on.
    pub price: f64,
}

/// Indicator values for a single bar once every calculator is warmed up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorValues {
    pub ema_short: f64,
    pub ema_long: f64,
    pub rsi: f64,
    pub obv: f64,
    pub obv_trend: f64,
}

/// Everything the engine hands to a persistence sink for one processed bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub bar: PriceBar,
    pub values: IndicatorValues,
    pub signals: Vec<Signal>,
}

impl IndicatorRow {
    pub fn signal(&self, source: SignalSource) -> SignalKind {
        self.signals
            .iter()
            .find(|s| s.source == source)
            .map_or(SignalKind::None, |s| s.kind)
    }
}

/// A named, bar-aligned derived series. `None` marks warm-up positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub name: String,
    pub parameters: serde_json::Value,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SessionState {
    Uninitialized,
    Warming,
    Steady,
    Closed,
}

/// Read-only view of a session, aligned bar for bar with `bars`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub symbol: String,
    pub state: SessionState,
    pub bars: Vec<PriceBar>,
    pub indicators: Vec<Indicator>,
    pub signals: Vec<Signal>,
}

impl IndicatorSnapshot {
    pub fn indicator(&self, name: &str) -> Option<&Indicator> {
        self.indicators.iter().find(|i| i.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar() -> PriceBar {
        PriceBar::new(Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap(), 10.0, 10.2, 9.9, 10.1, 7)
    }

    #[test]
    fn inverted_swaps_buy_and_sell() {
        assert_eq!(SignalKind::Buy.inverted(), SignalKind::Sell);
        assert_eq!(SignalKind::Sell.inverted(), SignalKind::Buy);
        assert_eq!(SignalKind::None.inverted(), SignalKind::None);
    }

    #[test]
    fn row_signal_lookup_defaults_to_none() {
        let b = bar();
        let row = IndicatorRow {
            bar: b.clone(),
            values: IndicatorValues { ema_short: 1.0, ema_long: 1.0, rsi: 50.0, obv: 0.0, obv_trend: 0.0 },
            signals: vec![Signal { timestamp: b.timestamp, kind: SignalKind::Buy, source: SignalSource::RsiThreshold, price: b.close }],
        };
        assert_eq!(row.signal(SignalSource::RsiThreshold), SignalKind::Buy);
        assert_eq!(row.signal(SignalSource::EmaCrossover), SignalKind::None);
    }

    #[test]
    fn price_bar_serializes_with_rfc3339_timestamp() {
        let json = serde_json::to_string(&bar()).unwrap();
        assert!(json.contains("\"timestamp\":\"2024-01-02T09:30:00Z\""));
        assert!(json.contains("\"volume\":7"));
    }
}
