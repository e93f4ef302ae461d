// =============================================================================
// ta-engine - technical indicator calculation engine
// =============================================================================
//
// Converts OHLCV bar series into momentum, trend, volatility and volume
// indicators, folds them into a directional signal, and serves results
// either in bulk (cached per symbol/timeframe) or bar-by-bar from a bounded
// streaming window.
// =============================================================================

pub mod engine;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod runtime_config;
pub mod signals;
pub mod streaming;
pub mod types;

pub use engine::{BatchOutcome, ComputedResult, IndicatorEngine, ResultSummary};
pub use error::{IndicatorError, Result};
pub use market_data::{Bar, MarketSeries, SeriesKey};
pub use runtime_config::{ConfigOverrides, IndicatorConfig};
pub use streaming::StreamingCalculator;
