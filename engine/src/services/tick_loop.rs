// Tick-driven session driver: each tick pulls one batch from the source, feeds
// it to the engine and appends the steady rows to the sink. Runs until the
// shutdown future resolves, the tick limit is hit or the source runs dry, then
// closes the session.
use super::IndicatorEngine;
use crate::config::TickSettings;
use crate::data::{BarSource, CsvAppendSink};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Shutdown,
    TickLimit,
    SourceExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    pub ticks: u64,
    pub rows: usize,
    pub stop: StopReason,
}

/// Drives `engine` until a stop condition. `shutdown` is polled for the whole
/// run, so a signal raised while a tick is being processed is seen at the next
/// wait.
pub async fn run<F>(
    source: &mut dyn BarSource,
    engine: &mut IndicatorEngine,
    sink: &mut CsvAppendSink,
    tick: &TickSettings,
    shutdown: F,
) -> TickSummary
where
    F: Future,
{
    let mut interval = tokio::time::interval(Duration::from_millis(tick.interval_ms));
    tokio::pin!(shutdown);
    let mut ticks: u64 = 0;
    let mut rows_written = 0;

    let stop = loop {
        if tick.max_ticks.is_some_and(|max| ticks >= max) {
            info!(ticks, "Reached tick limit");
            break StopReason::TickLimit;
        }

        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!(ticks, "Interrupted, shutting down");
                break StopReason::Shutdown;
            }
            _ = interval.tick() => {}
        }
        ticks += 1;

        let bars = match source.next_batch() {
            Ok(bars) => bars,
            Err(e) => {
                warn!(error = %e, "Bar source failed, skipping tick");
                continue;
            }
        };
        if bars.is_empty() {
            info!(ticks, "Bar source exhausted");
            break StopReason::SourceExhausted;
        }

        match engine.ingest_batch(&bars) {
            Ok(rows) => match sink.append(&rows) {
                Ok(written) => rows_written += written,
                Err(e) => warn!(error = %e, path = %sink.path().display(), "Failed to append rows"),
            },
            Err(e) => warn!(error = %e, bars = bars.len(), "Batch rejected"),
        }
    };

    engine.close();
    TickSummary {
        ticks,
        rows: rows_written,
        stop,
    }
}
