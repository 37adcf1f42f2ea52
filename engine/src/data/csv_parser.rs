use crate::error::EngineError;
use csv::{ReaderBuilder, StringRecord};
use shared::models::PriceBar;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

// Field parsing for the bar log format
pub mod bar_format {
    use crate::error::EngineError;
    use chrono::{DateTime, NaiveDateTime, Utc};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

    // Accepts RFC 3339 or a naive "YYYY-MM-DD HH:MM:SS[.fff]" taken as UTC
    pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, EngineError> {
        let s = s.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
            return Ok(ts.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(|naive| naive.and_utc())
            .ok_or_else(|| EngineError::CsvDataFormatError(format!("Failed to parse timestamp '{}'", s)))
    }

    pub fn parse_price(s: &str) -> Result<f64, EngineError> {
        s.trim()
            .parse::<f64>()
            .map_err(|e| EngineError::CsvDataFormatError(format!("Failed to parse price '{}': {}", s, e)))
    }

    // Volume must be a non-negative integer; "7.0" is tolerated.
    pub fn parse_volume(s: &str) -> Result<u64, EngineError> {
        let s = s.trim();
        if let Ok(v) = s.parse::<u64>() {
            return Ok(v);
        }
        match s.parse::<f64>() {
            Ok(v) if v < 0.0 => Err(EngineError::CsvDataFormatError(format!("Negative volume '{}'", s))),
            Ok(v) if v.fract() == 0.0 && v <= u64::MAX as f64 => Ok(v as u64),
            _ => Err(EngineError::CsvDataFormatError(format!("Failed to parse volume '{}'", s))),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::{Datelike, Timelike};

        #[test]
        fn test_parse_timestamp_rfc3339() {
            let ts = parse_timestamp("2024-12-30T18:20:00Z").unwrap();
            assert_eq!(ts.year(), 2024);
            assert_eq!(ts.hour(), 18);
        }

        #[test]
        fn test_parse_timestamp_naive() {
            let ts = parse_timestamp("2024-12-30 18:20:05").unwrap();
            assert_eq!(ts.minute(), 20);
            assert_eq!(ts.second(), 5);
            assert!(parse_timestamp("2024-12-30 18:20:05.250000").is_ok());
        }

        #[test]
        fn test_parse_timestamp_invalid() {
            assert!(parse_timestamp("30/12/2024 18:20").is_err());
        }

        #[test]
        fn test_parse_volume() {
            assert_eq!(parse_volume("7").unwrap(), 7);
            assert_eq!(parse_volume("7.0").unwrap(), 7);
            assert!(parse_volume("-3").unwrap_err().to_string().contains("Negative volume"));
            assert!(parse_volume("1.5").is_err());
        }

        #[test]
        fn test_parse_price() {
            assert_eq!(parse_price(" 123.45 ").unwrap(), 123.45);
            assert!(parse_price("abc").is_err());
        }
    }
}

pub struct BarCsvParser;

impl BarCsvParser {
    // CSV Header: timestamp,open,high,low,close,volume (extra columns are ignored)
    // Example Row: 2024-05-06 14:00:00,200.0,200.12,199.91,200.05,7
    pub fn load_bars_from_csv(file_path: impl AsRef<Path>) -> Result<Vec<PriceBar>, EngineError> {
        let file = File::open(file_path.as_ref())?;
        Self::load_bars(BufReader::new(file))
    }

    pub fn load_bars<R: Read>(reader: R) -> Result<Vec<PriceBar>, EngineError> {
        let mut rdr = ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(reader);
        let headers = rdr.headers()?.clone();

        let mut bars = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2;
            let record = result?;
            let field = |name: &str| Self::require_field(&record, &headers, name, line);

            let timestamp = bar_format::parse_timestamp(field("timestamp")?).map_err(|e| Self::at_line(e, line))?;
            let open = bar_format::parse_price(field("open")?).map_err(|e| Self::at_line(e, line))?;
            let high = bar_format::parse_price(field("high")?).map_err(|e| Self::at_line(e, line))?;
            let low = bar_format::parse_price(field("low")?).map_err(|e| Self::at_line(e, line))?;
            let close = bar_format::parse_price(field("close")?).map_err(|e| Self::at_line(e, line))?;
            let volume = bar_format::parse_volume(field("volume")?).map_err(|e| Self::at_line(e, line))?;

            bars.push(PriceBar { timestamp, open, high, low, close, volume });
        }
        tracing::debug!(count = bars.len(), "Loaded bars from CSV");
        Ok(bars)
    }

    fn require_field<'a>(record: &'a StringRecord, headers: &StringRecord, name: &str, line: usize) -> Result<&'a str, EngineError> {
        headers
            .iter()
            .position(|header| header == name)
            .and_then(|pos| record.get(pos))
            .ok_or_else(|| EngineError::CsvDataFormatError(format!("Missing '{}' field in CSV record at line {}", name, line)))
    }

    fn at_line(err: EngineError, line: usize) -> EngineError {
        match err {
            EngineError::CsvDataFormatError(msg) => EngineError::CsvDataFormatError(format!("{} at line {}", msg, line)),
            other => other,
        }
    }
}
