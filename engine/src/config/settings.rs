// Engine settings, loaded from a JSON file or the embedded default
use crate::error::EngineError;
use crate::indicators::RoundingPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = include_str!("../../config/default.json");

fn default_rsi_window() -> usize {
    14
}

fn default_obv_trend_span() -> usize {
    20
}

fn default_rsi_buy_threshold() -> f64 {
    30.0
}

fn default_rsi_sell_threshold() -> f64 {
    70.0
}

/// Periods and thresholds for one indicator session.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct IndicatorConfig {
    pub short_ema_period: usize,
    pub long_ema_period: usize,
    #[serde(default = "default_rsi_window")]
    pub rsi_window: usize,
    #[serde(default = "default_obv_trend_span")]
    pub obv_trend_span: usize,
    #[serde(default = "default_rsi_buy_threshold")]
    pub rsi_buy_threshold: f64,
    #[serde(default = "default_rsi_sell_threshold")]
    pub rsi_sell_threshold: f64,
    #[serde(default)]
    pub rounding: RoundingPolicy,
}

impl IndicatorConfig {
    /// EMA periods with every other option at its default.
    pub fn new(short_ema_period: usize, long_ema_period: usize) -> Self {
        IndicatorConfig {
            short_ema_period,
            long_ema_period,
            rsi_window: default_rsi_window(),
            obv_trend_span: default_obv_trend_span(),
            rsi_buy_threshold: default_rsi_buy_threshold(),
            rsi_sell_threshold: default_rsi_sell_threshold(),
            rounding: RoundingPolicy::default(),
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let positive = [
            ("short_ema_period", self.short_ema_period),
            ("long_ema_period", self.long_ema_period),
            ("rsi_window", self.rsi_window),
            ("obv_trend_span", self.obv_trend_span),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(EngineError::ConfigError(format!("{} must be greater than 0", name)));
        }
        if self.long_ema_period <= self.short_ema_period {
            return Err(EngineError::ConfigError(format!(
                "long_ema_period ({}) must exceed short_ema_period ({})",
                self.long_ema_period, self.short_ema_period
            )));
        }
        let in_range = |v: f64| v.is_finite() && (0.0..=100.0).contains(&v);
        if !in_range(self.rsi_buy_threshold) || !in_range(self.rsi_sell_threshold) {
            return Err(EngineError::ConfigError("RSI thresholds must lie within [0, 100]".to_string()));
        }
        if self.rsi_buy_threshold >= self.rsi_sell_threshold {
            return Err(EngineError::ConfigError(format!(
                "rsi_buy_threshold ({}) must be below rsi_sell_threshold ({})",
                self.rsi_buy_threshold, self.rsi_sell_threshold
            )));
        }
        Ok(())
    }

    /// Bars needed before every calculator produces defined output. Reaching
    /// this length is enough; it does not have to be exceeded.
    pub fn warmup_bars(&self) -> usize {
        [
            2 * self.long_ema_period,
            2 * self.short_ema_period,
            self.rsi_window,
            self.obv_trend_span,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        IndicatorConfig::new(12, 26)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedSettings {
    RandomWalk {
        start_price: f64,
        bars_per_tick: usize,
        #[serde(default)]
        seed: Option<u64>,
    },
    Csv {
        path: PathBuf,
        bars_per_tick: usize,
    },
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TickSettings {
    pub interval_ms: u64,
    #[serde(default)]
    pub max_ticks: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OutputSettings {
    pub csv_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EngineSettings {
    pub symbol: String,
    pub indicators: IndicatorConfig,
    pub feed: FeedSettings,
    pub tick: TickSettings,
    pub output: OutputSettings,
}

impl EngineSettings {
    pub fn load_default() -> Result<Self, EngineError> {
        Self::from_json(DEFAULT_CONFIG)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, EngineError> {
        let settings: EngineSettings = serde_json::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.symbol.trim().is_empty() {
            return Err(EngineError::ConfigError("symbol must not be empty".to_string()));
        }
        if self.tick.interval_ms == 0 {
            return Err(EngineError::ConfigError("tick.interval_ms must be greater than 0".to_string()));
        }
        self.indicators.validate()
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        // Mirrors config/default.json
        EngineSettings {
            symbol: "XYZ".to_string(),
            indicators: IndicatorConfig::default(),
            feed: FeedSettings::RandomWalk {
                start_price: 200.0,
                bars_per_tick: 5,
                seed: None,
            },
            tick: TickSettings {
                interval_ms: 60_000,
                max_ticks: Some(1440),
            },
            output: OutputSettings {
                csv_path: PathBuf::from("indicators.csv"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_embedded_default_matches_default_impl() {
        assert_eq!(EngineSettings::load_default().unwrap(), EngineSettings::default());
    }

    #[test]
    fn test_indicator_defaults_fill_missing_fields() {
        let config: IndicatorConfig = serde_json::from_str(r#"{"short_ema_period": 5, "long_ema_period": 10}"#).unwrap();
        assert_eq!(config, IndicatorConfig::new(5, 10));
        assert_eq!(config.rsi_window, 14);
        assert_eq!(config.obv_trend_span, 20);
        assert_eq!(config.rounding, RoundingPolicy::Inferred);
    }

    #[test]
    fn test_warmup_is_longest_requirement() {
        assert_eq!(IndicatorConfig::new(12, 26).warmup_bars(), 52);
        let mut config = IndicatorConfig::new(2, 3);
        assert_eq!(config.warmup_bars(), 20);
        config.obv_trend_span = 2;
        config.rsi_window = 2;
        assert_eq!(config.warmup_bars(), 6);
    }

    #[test]
    fn test_validate_rejects_bad_periods() {
        assert!(IndicatorConfig::new(0, 26).validate().is_err());
        assert!(IndicatorConfig::new(26, 26).validate().is_err());
        assert!(IndicatorConfig::new(30, 26).validate().is_err());
        let mut config = IndicatorConfig::new(12, 26);
        config.rsi_window = 0;
        assert!(matches!(config.validate(), Err(EngineError::ConfigError(msg)) if msg.contains("rsi_window")));
    }

    #[test]
    fn test_validate_rejects_bad_thresholds() {
        let mut config = IndicatorConfig::new(12, 26);
        config.rsi_buy_threshold = 80.0;
        assert!(config.validate().is_err());
        config.rsi_buy_threshold = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_with_csv_feed() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "symbol": "AAPL",
                "indicators": {{ "short_ema_period": 12, "long_ema_period": 26, "rounding": {{ "fixed": 2 }} }},
                "feed": {{ "kind": "csv", "path": "bars.csv", "bars_per_tick": 10 }},
                "tick": {{ "interval_ms": 500 }},
                "output": {{ "csv_path": "out.csv" }}
            }}"#
        )
        .unwrap();
        let settings = EngineSettings::from_file(file.path()).unwrap();
        assert_eq!(settings.symbol, "AAPL");
        assert_eq!(settings.indicators.rounding, RoundingPolicy::Fixed(2));
        assert_eq!(settings.feed, FeedSettings::Csv { path: PathBuf::from("bars.csv"), bars_per_tick: 10 });
        assert_eq!(settings.tick.max_ticks, None);
    }

    #[test]
    fn test_from_json_reports_parse_errors() {
        assert!(matches!(EngineSettings::from_json("{"), Err(EngineError::ConfigParseError { .. })));
    }
}
