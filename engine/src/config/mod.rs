pub mod settings;

pub use settings::{EngineSettings, FeedSettings, IndicatorConfig, OutputSettings, TickSettings};
