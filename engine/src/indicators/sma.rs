// Simple Moving Average (SMA), used as the EMA seed
use crate::error::EngineError;

/// Arithmetic mean of the last `period` values of `prices`.
pub fn sma(prices: &[f64], period: usize) -> Result<f64, EngineError> {
    if period == 0 || prices.len() < period {
        return Err(EngineError::insufficient(format!("SMA({})", period), period.max(1), prices.len()));
    }
    let window = &prices[prices.len() - period..];
    Ok(window.iter().sum::<f64>() / period as f64)
}
