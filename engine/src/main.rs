// Engine main entry point: drives one indicator session from a bar feed on a
// fixed tick and appends steady rows to the CSV log.
use anyhow::Context;
use chrono::Utc;
use engine::config::{EngineSettings, FeedSettings};
use engine::data::{BarSource, CsvAppendSink, CsvReplaySource, RandomWalkSource};
use engine::services::tick_loop;
use engine::IndicatorEngine;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn load_settings() -> anyhow::Result<EngineSettings> {
    match std::env::args().nth(1) {
        Some(path) => EngineSettings::from_file(&path).with_context(|| format!("failed to load settings from {}", path)),
        None => EngineSettings::load_default().context("failed to load embedded default settings"),
    }
}

fn build_source(feed: &FeedSettings) -> anyhow::Result<Box<dyn BarSource>> {
    let source: Box<dyn BarSource> = match feed {
        FeedSettings::RandomWalk { start_price, bars_per_tick, seed } => {
            Box::new(RandomWalkSource::new(*start_price, Utc::now(), *bars_per_tick, *seed))
        }
        FeedSettings::Csv { path, bars_per_tick } => Box::new(
            CsvReplaySource::open(path, *bars_per_tick)
                .with_context(|| format!("failed to open replay file {}", path.display()))?,
        ),
    };
    Ok(source)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting indicator engine...");
    let settings = load_settings()?;
    info!(symbol = %settings.symbol, feed = ?settings.feed, interval_ms = settings.tick.interval_ms, "Settings loaded");

    let mut source = build_source(&settings.feed)?;
    let mut engine = IndicatorEngine::new(settings.symbol.clone(), settings.indicators)?;
    let mut sink = CsvAppendSink::open(&settings.output.csv_path)
        .with_context(|| format!("failed to open output {}", settings.output.csv_path.display()))?;

    let summary = tick_loop::run(source.as_mut(), &mut engine, &mut sink, &settings.tick, tokio::signal::ctrl_c()).await;
    info!(ticks = summary.ticks, rows = summary.rows, stop = ?summary.stop, "Engine stopped");
    Ok(())
}
