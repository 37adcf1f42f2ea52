// Numeric helpers shared by the engine's calculators and its bar feeds.

/// Upper bound on inferred precision; f64 carries ~15-17 significant digits.
pub const MAX_PRECISION: u32 = 15;

/// Number of fractional digits in the shortest decimal rendering of `value`.
///
/// `10.0` renders as `10` and yields 0, `10.25` yields 2. Non-finite values
/// yield 0. The result is capped at [`MAX_PRECISION`].
pub fn detect_precision(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    let rendered = value.to_string();
    let digits = rendered
        .split_once('.')
        .map_or(0, |(_, fraction)| fraction.len());
    (digits as u32).min(MAX_PRECISION)
}

/// Rounds `value` to `precision` fractional digits, ties to even.
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round_ties_even() / factor
}
