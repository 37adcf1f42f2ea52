// Append-only bar history for one symbol session
use crate::error::EngineError;
use shared::models::PriceBar;

/// Bars in arrival order. Never reordered, deduplicated or edited in place.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new() -> Self {
        PriceSeries { bars: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// Checks that `bar` may follow the current tail. Does not mutate.
    pub fn validate_next(&self, bar: &PriceBar) -> Result<(), EngineError> {
        validate_bar(bar, self.bars.last())
    }

    /// Appends a bar that has passed [`validate_next`](Self::validate_next).
    pub fn push(&mut self, bar: PriceBar) {
        self.bars.push(bar);
    }
}

/// Validates a single bar against its predecessor, if any.
pub fn validate_bar(bar: &PriceBar, previous: Option<&PriceBar>) -> Result<(), EngineError> {
    let prices = [("open", bar.open), ("high", bar.high), ("low", bar.low), ("close", bar.close)];
    if let Some((field, value)) = prices.iter().find(|(_, v)| !v.is_finite()) {
        return Err(EngineError::InvalidBar(format!("{} price {} at {} is not finite", field, value, bar.timestamp)));
    }
    if bar.high < bar.low {
        return Err(EngineError::InvalidBar(format!(
            "high {} below low {} at {}",
            bar.high, bar.low, bar.timestamp
        )));
    }
    if let Some(previous) = previous {
        if bar.timestamp < previous.timestamp {
            return Err(EngineError::InvalidBar(format!(
                "timestamp {} precedes previous bar at {}",
                bar.timestamp, previous.timestamp
            )));
        }
    }
    Ok(())
}
