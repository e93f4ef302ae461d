// =============================================================================
// ta-engine - Main Entry Point
// =============================================================================
//
// Usage: ta-engine <bars.json> [--replay]
//
// The input file holds an array of `{ "symbol", "timeframe", "bars": [...] }`
// feeds.  Every feed is evaluated in bulk on the blocking pool through one
// shared engine; with `--replay` each feed is additionally pushed bar by bar
// through its own streaming calculator.  Summaries are printed as JSON lines.
// =============================================================================

use std::sync::Arc;

use anyhow::{bail, Context};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ta_engine::market_data::MIN_DATA_POINTS;
use ta_engine::{
    Bar, IndicatorConfig, IndicatorEngine, MarketSeries, ResultSummary, SeriesKey,
    StreamingCalculator,
};

/// Bars buffered between a feed producer and its streaming calculator.
const FEED_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Deserialize)]
struct BarFeed {
    symbol: String,
    timeframe: String,
    bars: Vec<Bar>,
}

impl BarFeed {
    fn key(&self) -> SeriesKey {
        SeriesKey::new(self.symbol.as_str(), self.timeframe.as_str())
    }
}

fn print_summary(summary: &ResultSummary) {
    match serde_json::to_string(summary) {
        Ok(line) => println!("{line}"),
        Err(e) => error!(error = %e, "failed to serialise summary"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path =
        std::env::var("TA_ENGINE_CONFIG").unwrap_or_else(|_| "indicator_config.json".into());
    let config = IndicatorConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load indicator config, using defaults");
        IndicatorConfig::default()
    });

    let mut args = std::env::args().skip(1);
    let Some(input_path) = args.next() else {
        bail!("usage: ta-engine <bars.json> [--replay]");
    };
    let replay = args.any(|a| a == "--replay");

    // ── 2. Load feeds ────────────────────────────────────────────────────
    let raw = tokio::fs::read_to_string(&input_path)
        .await
        .with_context(|| format!("failed to read bar feeds from {input_path}"))?;
    let feeds: Vec<BarFeed> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse bar feeds from {input_path}"))?;
    info!(feeds = feeds.len(), replay, "bar feeds loaded");

    let feeds: Vec<Arc<BarFeed>> = feeds.into_iter().map(Arc::new).collect();
    let engine = Arc::new(IndicatorEngine::new(config.clone()));

    // ── 3. Bulk evaluation, one blocking task per feed ───────────────────
    let mut handles = Vec::with_capacity(feeds.len());
    for feed in &feeds {
        let engine = Arc::clone(&engine);
        let feed = Arc::clone(feed);
        handles.push(tokio::task::spawn_blocking(move || {
            let key = feed.key();
            let series = MarketSeries::from_bars(&feed.bars);
            let outcome = engine.get_cached_or_calculate(&key.symbol, &key.timeframe, &series);
            (key, outcome)
        }));
    }

    for handle in handles {
        match handle.await {
            Ok((key, Ok(result))) => print_summary(&ResultSummary::from_result(&key, &result)),
            Ok((key, Err(e))) => error!(key = %key, error = %e, "indicator calculation failed"),
            Err(e) => error!(error = %e, "calculation task panicked"),
        }
    }

    let stats = engine.cache_stats();
    info!(entries = stats.entries, hits = stats.hits, misses = stats.misses, "bulk pass complete");

    if !replay {
        return Ok(());
    }

    // ── 4. Streaming replay, one owning task per feed ────────────────────
    let mut consumers = Vec::with_capacity(feeds.len());
    for feed in feeds {
        let (tx, mut rx) = mpsc::channel::<Bar>(FEED_CHANNEL_CAPACITY);
        let key = feed.key();
        let seed_len = feed.bars.len().min(MIN_DATA_POINTS);

        let mut calculator = StreamingCalculator::new(key.clone(), config.clone());
        calculator.initialize(&feed.bars[..seed_len]);

        consumers.push(tokio::spawn(async move {
            let mut computed = 0usize;
            while let Some(bar) = rx.recv().await {
                if let Ok(result) = calculator.add_bar_and_calculate(bar) {
                    computed += 1;
                    print_summary(&ResultSummary::from_result(calculator.key(), &result));
                }
            }
            let last_bar = calculator.latest_bar().map(|bar| bar.timestamp);
            info!(
                key = %calculator.key(),
                computed,
                window_size = calculator.config().window_size,
                ?last_bar,
                "live feed drained"
            );
        }));

        tokio::spawn(async move {
            for bar in feed.bars.iter().skip(seed_len) {
                if tx.send(bar.clone()).await.is_err() {
                    warn!(key = %key, "streaming calculator stopped early");
                    break;
                }
            }
        });
    }

    for consumer in consumers {
        if let Err(e) = consumer.await {
            error!(error = %e, "streaming task panicked");
        }
    }

    Ok(())
}
