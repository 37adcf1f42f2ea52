// Append-only CSV log of processed rows. The header is written once, when the
// file is new or empty; later sessions keep appending under it.
use crate::error::EngineError;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use shared::models::{IndicatorRow, SignalKind, SignalSource};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct LogRecord {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
    ema_short: f64,
    ema_long: f64,
    rsi: f64,
    obv: f64,
    obv_trend: f64,
    ema_signal: SignalKind,
    obv_signal: SignalKind,
    rsi_signal: SignalKind,
}

impl From<&IndicatorRow> for LogRecord {
    fn from(row: &IndicatorRow) -> Self {
        LogRecord {
            timestamp: row.bar.timestamp,
            open: row.bar.open,
            high: row.bar.high,
            low: row.bar.low,
            close: row.bar.close,
            volume: row.bar.volume,
            ema_short: row.values.ema_short,
            ema_long: row.values.ema_long,
            rsi: row.values.rsi,
            obv: row.values.obv,
            obv_trend: row.values.obv_trend,
            ema_signal: row.signal(SignalSource::EmaCrossover),
            obv_signal: row.signal(SignalSource::ObvCrossover),
            rsi_signal: row.signal(SignalSource::RsiThreshold),
        }
    }
}

pub struct CsvAppendSink {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvAppendSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref().to_path_buf();
        let needs_header = std::fs::metadata(&path).map_or(true, |m| m.len() == 0);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let writer = WriterBuilder::new().has_headers(needs_header).from_writer(file);
        tracing::info!(path = %path.display(), needs_header, "Opened indicator log");
        Ok(CsvAppendSink { path, writer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `rows` and flushes. Returns the number of rows written.
    pub fn append(&mut self, rows: &[IndicatorRow]) -> Result<usize, EngineError> {
        if rows.is_empty() {
            return Ok(0);
        }
        for row in rows {
            self.writer.serialize(LogRecord::from(row))?;
        }
        self.writer.flush()?;
        tracing::info!(path = %self.path.display(), rows = rows.len(), "Data appended successfully");
        Ok(rows.len())
    }
}
