// Engine library root: streaming indicator calculators, signal detection and
// the per-symbol session that ties them to a bar feed.

pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod services;
pub mod signals;

pub use error::EngineError;
pub use services::IndicatorEngine;
