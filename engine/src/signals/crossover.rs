// Pure detectors shared by the batch and streaming signal paths.
use shared::models::SignalKind;

/// Compares a fast/slow pair against the previous bar's pair.
///
/// Buy when fast moves strictly above slow from at-or-below, Sell on the
/// mirror. With no previous pair (first evaluable bar) the result is None.
pub fn crossover(previous: Option<(f64, f64)>, current: (f64, f64)) -> SignalKind {
    let Some((prev_fast, prev_slow)) = previous else {
        return SignalKind::None;
    };
    let (fast, slow) = current;
    if fast > slow && prev_fast <= prev_slow {
        SignalKind::Buy
    } else if fast < slow && prev_fast >= prev_slow {
        SignalKind::Sell
    } else {
        SignalKind::None
    }
}

/// Oversold below `buy`, overbought above `sell`. No lookback.
pub fn threshold(value: f64, buy: f64, sell: f64) -> SignalKind {
    if value < buy {
        SignalKind::Buy
    } else if value > sell {
        SignalKind::Sell
    } else {
        SignalKind::None
    }
}

/// Crossover timeline over two bar-aligned series. Indices where either input
/// is undefined yield None, and so does the first index after such a gap.
pub fn crossovers(fast: &[Option<f64>], slow: &[Option<f64>]) -> Vec<SignalKind> {
    let mut previous = None;
    fast.iter()
        .zip(slow)
        .map(|pair| match pair {
            (Some(f), Some(s)) => {
                let kind = crossover(previous, (*f, *s));
                previous = Some((*f, *s));
                kind
            }
            _ => {
                previous = None;
                SignalKind::None
            }
        })
        .collect()
}

/// Threshold timeline over a bar-aligned series.
pub fn thresholds(values: &[Option<f64>], buy: f64, sell: f64) -> Vec<SignalKind> {
    values
        .iter()
        .map(|v| v.map_or(SignalKind::None, |v| threshold(v, buy, sell)))
        .collect()
}
