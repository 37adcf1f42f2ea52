// Signal generation from derived indicator series
pub mod crossover;
pub mod generator;

pub use crossover::{crossover, crossovers, threshold, thresholds};
pub use generator::{SignalGenerator, SignalInputs};
