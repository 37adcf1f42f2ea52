// Technical indicators module
//
// Every calculator comes in two forms: a batch function over a full slice,
// used to check equivalence, and a streaming struct advanced one bar at a time.
// Both perform the same floating-point operations in the same order, so the
// streaming output equals the batch recomputation bit for bit.
pub mod ema;
pub mod obv;
pub mod rounding;
pub mod rsi;
pub mod sma;

mod ring_buffer;

pub use ema::{ema, Ema};
pub use obv::{ewm_mean, obv, Obv, ObvValue};
pub use rounding::RoundingPolicy;
pub use rsi::{rsi, Rsi};
pub use sma::sma;

use crate::error::EngineError;
use serde_json::Value;
use shared::models::PriceBar;

// Common trait for the streaming calculators
pub trait IndicatorCalculator: Send + Sync {
    type Output: Copy;

    fn name(&self) -> &str;
    fn parameters(&self) -> Value; // Parameters used for this indicator instance

    /// Bars required before [`value`](Self::value) succeeds.
    fn warmup_bars(&self) -> usize;

    /// Bars consumed so far.
    fn bars_seen(&self) -> usize;

    /// Advances the recurrence by exactly one bar. Returns the raw recurrence
    /// output, which may exist before the warm-up window is satisfied.
    fn update(&mut self, bar: &PriceBar) -> Option<Self::Output>;

    /// Latest value, or `InsufficientData` while warming up.
    fn value(&self) -> Result<Self::Output, EngineError>;

    fn is_ready(&self) -> bool {
        self.bars_seen() >= self.warmup_bars()
    }
}
