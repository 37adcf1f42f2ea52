// Per-step rounding applied inside the EMA recurrence.
//
// Rounding happens on every step, so the recurrence state itself is quantised
// and drifts from full-precision arithmetic. Signal timelines depend on it.
use serde::Deserialize;
use shared::utils::{detect_precision, round_to};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// Precision taken from the fractional digits of the first price seen.
    #[default]
    Inferred,
    /// Fixed number of fractional digits.
    Fixed(u32),
    /// Full f64 precision, no quantisation.
    Disabled,
}

impl RoundingPolicy {
    /// Resolves the digit count for a series whose first price is `first_price`.
    /// `None` means values pass through unrounded.
    pub fn resolve(self, first_price: f64) -> Option<u32> {
        match self {
            RoundingPolicy::Inferred => Some(detect_precision(first_price)),
            RoundingPolicy::Fixed(digits) => Some(digits),
            RoundingPolicy::Disabled => None,
        }
    }
}

pub(crate) fn quantize(value: f64, precision: Option<u32>) -> f64 {
    match precision {
        Some(digits) => round_to(value, digits),
        None => value,
    }
}
