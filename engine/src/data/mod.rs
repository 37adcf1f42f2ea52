// Bar storage, ingestion sources and the persistence sink
pub mod bar_source;
pub mod csv_parser;
pub mod csv_sink;
pub mod price_series;

pub use bar_source::{BarSource, CsvReplaySource, RandomWalkSource};
pub use csv_parser::BarCsvParser;
pub use csv_sink::CsvAppendSink;
pub use price_series::PriceSeries;
