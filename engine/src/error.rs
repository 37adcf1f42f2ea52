use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// A value was requested before the calculator's warm-up window filled.
    /// Recoverable: feed more bars and ask again.
    #[error("Insufficient data for {indicator}: need {required} bars, have {available}")]
    InsufficientData {
        indicator: String,
        required: usize,
        available: usize,
    },

    /// The bar was rejected and no state was mutated.
    #[error("Invalid bar: {0}")]
    InvalidBar(String),

    #[error("Session for '{0}' is closed")]
    SessionClosed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Configuration parse error: {source}")]
    ConfigParseError {
        #[from]
        source: serde_json::Error,
    },

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),
}

impl EngineError {
    pub fn insufficient(indicator: impl Into<String>, required: usize, available: usize) -> Self {
        EngineError::InsufficientData {
            indicator: indicator.into(),
            required,
            available,
        }
    }

    /// True for errors a caller should answer by waiting for more bars.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EngineError::InsufficientData { .. })
    }
}
