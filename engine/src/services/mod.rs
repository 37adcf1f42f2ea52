// Session services built on the indicator and signal layers
pub mod indicator_engine;
pub mod tick_loop;

pub use indicator_engine::IndicatorEngine;
