// =============================================================================
// Indicator Engine - validation, evaluation, caching
// =============================================================================
//
// `IndicatorEngine` is constructed once at process start and shared as
// `Arc<IndicatorEngine>`.  It owns the active configuration and the result
// cache; every evaluation itself is a pure function of its input series.
//
// Thread safety:
//   - parking_lot::RwLock around the configuration.  `update_config` merges,
//     validates and stores under a single write guard.
//   - The cache manages its own interior mutability.  Readers snapshot the
//     config together with the cache generation under the config read guard;
//     `update_config` bumps the generation before releasing its write guard,
//     so a result computed from a replaced config is never cached or served.
// =============================================================================

pub mod cache;
pub mod compute;
pub mod result;

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

pub use cache::{CacheStats, ResultCache};
pub use compute::calculate;
pub use result::{ComputedResult, IndicatorSet, ResultSummary};

use crate::error::{IndicatorError, Result};
use crate::market_data::{MarketSeries, SeriesKey};
use crate::runtime_config::{ConfigOverrides, IndicatorConfig};

/// Per-key outcome of [`IndicatorEngine::calculate_batch`].
#[derive(Debug, Clone)]
pub enum BatchOutcome {
    Computed(Arc<ComputedResult>),
    Failed { error: IndicatorError },
}

impl BatchOutcome {
    pub fn result(&self) -> Option<&Arc<ComputedResult>> {
        match self {
            Self::Computed(result) => Some(result),
            Self::Failed { .. } => None,
        }
    }
}

pub struct IndicatorEngine {
    config: RwLock<IndicatorConfig>,
    cache: ResultCache,
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new(IndicatorConfig::default())
    }
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Self {
        Self {
            config: RwLock::new(config),
            cache: ResultCache::new(),
        }
    }

    /// Snapshot of the active configuration.
    pub fn config(&self) -> IndicatorConfig {
        self.config.read().clone()
    }

    /// Merge `overrides` into the active configuration and drop every
    /// cached result.
    pub fn update_config(&self, overrides: &ConfigOverrides) -> Result<IndicatorConfig> {
        let mut config = self.config.write();
        let merged = config.merged(overrides);
        merged.validate()?;
        *config = merged.clone();

        let dropped = self.cache.invalidate();
        drop(config);
        info!(dropped, generation = self.cache.generation(), "indicator config updated, cache cleared");
        Ok(merged)
    }

    /// Active configuration and the cache generation it belongs to.
    fn snapshot(&self) -> (IndicatorConfig, u64) {
        let config = self.config.read();
        (config.clone(), self.cache.generation())
    }

    /// Evaluate `series` with the active configuration plus `overrides`.
    /// Bypasses the cache.
    pub fn calculate_all(&self, series: &MarketSeries, overrides: &ConfigOverrides) -> Result<ComputedResult> {
        let config = self.config.read().merged(overrides);
        if !overrides.is_empty() {
            config.validate()?;
        }
        calculate(series, &config)
    }

    /// Return the cached result for (symbol, timeframe) while it is younger
    /// than the configured TTL, otherwise recompute and replace it.
    pub fn get_cached_or_calculate(
        &self,
        symbol: &str,
        timeframe: &str,
        series: &MarketSeries,
    ) -> Result<Arc<ComputedResult>> {
        let key = SeriesKey::new(symbol, timeframe);
        let (config, generation) = self.snapshot();

        if let Some(hit) = self.cache.get_fresh(&key, config.cache_ttl(), generation) {
            debug!(key = %key, "indicator cache hit");
            return Ok(hit);
        }

        debug!(key = %key, bars = series.len(), "indicator cache miss, computing");
        let result = Arc::new(calculate(series, &config)?);
        if !self.cache.insert(key.clone(), Arc::clone(&result), generation) {
            debug!(key = %key, generation, "config changed during calculation, result not cached");
        }
        Ok(result)
    }

    /// Drop cached results.  With both a symbol and a timeframe this removes
    /// one entry; with neither it removes all of them; with one, every entry
    /// matching it.
    pub fn clear_cache(&self, symbol: Option<&str>, timeframe: Option<&str>) -> usize {
        let removed = match (symbol, timeframe) {
            (None, None) => self.cache.clear(),
            _ => self.cache.remove_matching(symbol, timeframe),
        };
        debug!(?symbol, ?timeframe, removed, "indicator cache cleared");
        removed
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Evaluate many keys.  A failure is recorded against its key and the
    /// remaining keys still run.
    pub fn calculate_batch<'a, I>(&self, requests: I) -> BTreeMap<String, BatchOutcome>
    where
        I: IntoIterator<Item = (SeriesKey, &'a MarketSeries)>,
    {
        let mut outcomes = BTreeMap::new();
        for (key, series) in requests {
            let outcome = match self.get_cached_or_calculate(&key.symbol, &key.timeframe, series) {
                Ok(result) => BatchOutcome::Computed(result),
                Err(error) => {
                    warn!(key = %key, error = %error, "indicator calculation failed");
                    BatchOutcome::Failed { error }
                }
            };
            outcomes.insert(key.to_string(), outcome);
        }
        outcomes
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::Bar;
    use crate::runtime_config::RsiParams;
    use chrono::{Duration, TimeZone, Utc};

    fn trending_series(n: usize) -> MarketSeries {
        let start = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let bars: Vec<Bar> = (0..n)
            .map(|i| {
                let close = 50.0 + i as f64 * 0.4 + (i as f64 * 0.7).cos();
                Bar {
                    timestamp: start + Duration::hours(i as i64),
                    open: close,
                    high: close + 0.8,
                    low: close - 0.6,
                    close,
                    volume: 5_000.0 + (i % 5) as f64 * 300.0,
                }
            })
            .collect();
        MarketSeries::from_bars(&bars)
    }

    #[test]
    fn cache_hit_returns_same_object() {
        let engine = IndicatorEngine::default();
        let series = trending_series(80);
        let first = engine.get_cached_or_calculate("AAPL", "1D", &series).unwrap();
        let second = engine.get_cached_or_calculate("AAPL", "1D", &series).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(engine.cache_stats().hits, 1);
    }

    #[test]
    fn expired_entry_is_recomputed() {
        let mut config = IndicatorConfig::default();
        config.cache_ttl_secs = 0;
        let engine = IndicatorEngine::new(config);
        let series = trending_series(80);
        let first = engine.get_cached_or_calculate("AAPL", "1D", &series).unwrap();
        let second = engine.get_cached_or_calculate("AAPL", "1D", &series).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }

    #[test]
    fn update_config_invalidates_cache() {
        let engine = IndicatorEngine::default();
        let series = trending_series(80);
        let first = engine.get_cached_or_calculate("AAPL", "1D", &series).unwrap();

        let overrides = ConfigOverrides {
            rsi: Some(RsiParams {
                period: 7,
                ..RsiParams::default()
            }),
            ..Default::default()
        };
        let updated = engine.update_config(&overrides).unwrap();
        assert_eq!(updated.rsi.period, 7);
        assert_eq!(engine.config().rsi.period, 7);
        assert_eq!(engine.cache_stats().entries, 0);

        let second = engine.get_cached_or_calculate("AAPL", "1D", &series).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn result_from_replaced_config_is_not_cached() {
        let engine = IndicatorEngine::default();
        let series = trending_series(80);
        let key = SeriesKey::new("AAPL", "1D");

        // A reader snapshots the config, then an update lands before it
        // finishes computing.
        let (old_config, generation) = engine.snapshot();
        let overrides = ConfigOverrides {
            rsi: Some(RsiParams {
                period: 7,
                ..RsiParams::default()
            }),
            ..Default::default()
        };
        engine.update_config(&overrides).unwrap();

        let stale = Arc::new(calculate(&series, &old_config).unwrap());
        assert!(!engine.cache.insert(key.clone(), Arc::clone(&stale), generation));
        assert_eq!(engine.cache_stats().entries, 0);

        let fresh = engine.get_cached_or_calculate("AAPL", "1D", &series).unwrap();
        assert_ne!(*fresh, *stale);
        assert_eq!(*fresh, calculate(&series, &engine.config()).unwrap());
        let again = engine.get_cached_or_calculate("AAPL", "1D", &series).unwrap();
        assert!(Arc::ptr_eq(&fresh, &again));
    }

    #[test]
    fn concurrent_updates_keep_both_changes() {
        let engine = Arc::new(IndicatorEngine::default());
        let barrier = Arc::new(std::sync::Barrier::new(2));

        let rsi = ConfigOverrides {
            rsi: Some(RsiParams {
                period: 9,
                ..RsiParams::default()
            }),
            ..Default::default()
        };
        let window = ConfigOverrides {
            window_size: Some(300),
            ..Default::default()
        };

        let handles: Vec<_> = [rsi, window]
            .into_iter()
            .map(|overrides| {
                let engine = Arc::clone(&engine);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    engine.update_config(&overrides).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let config = engine.config();
        assert_eq!(config.rsi.period, 9);
        assert_eq!(config.window_size, 300);
        assert_eq!(engine.cache.generation(), 2);
    }

    #[test]
    fn invalid_update_keeps_old_config() {
        let engine = IndicatorEngine::default();
        let overrides = ConfigOverrides {
            window_size: Some(0),
            ..Default::default()
        };
        assert!(engine.update_config(&overrides).is_err());
        assert_eq!(engine.config().window_size, 200);
        assert_eq!(engine.cache.generation(), 0);
    }

    #[test]
    fn clear_cache_single_and_all() {
        let engine = IndicatorEngine::default();
        let series = trending_series(60);
        engine.get_cached_or_calculate("AAPL", "1D", &series).unwrap();
        engine.get_cached_or_calculate("MSFT", "1D", &series).unwrap();

        assert_eq!(engine.clear_cache(Some("AAPL"), Some("1D")), 1);
        assert_eq!(engine.clear_cache(Some("AAPL"), Some("1D")), 0);
        assert_eq!(engine.clear_cache(None, None), 1);
    }

    #[test]
    fn calculate_all_applies_overrides_without_caching() {
        let engine = IndicatorEngine::default();
        let series = trending_series(80);
        let overrides = ConfigOverrides {
            sma: Some(vec![5, 10]),
            ..Default::default()
        };
        let result = engine.calculate_all(&series, &overrides).unwrap();
        let sma = result.indicators.trend.sma.unwrap();
        assert_eq!(sma.keys().copied().collect::<Vec<_>>(), vec![5, 10]);
        assert_eq!(engine.cache_stats().entries, 0);
        assert_eq!(engine.config().sma, vec![20, 50, 200]);
    }

    #[test]
    fn batch_isolates_failures() {
        let engine = IndicatorEngine::default();
        let good = trending_series(80);
        let short = trending_series(20);
        let outcomes = engine.calculate_batch(vec![
            (SeriesKey::new("AAPL", "1D"), &good),
            (SeriesKey::new("TINY", "1D"), &short),
        ]);

        assert!(outcomes["AAPL:1D"].result().is_some());
        match &outcomes["TINY:1D"] {
            BatchOutcome::Failed { error } => assert!(error.is_insufficient_data()),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<IndicatorEngine>();

        let engine = Arc::new(IndicatorEngine::default());
        let handles: Vec<_> = ["AAPL", "MSFT", "NVDA", "AMZN"]
            .into_iter()
            .map(|symbol| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    let series = trending_series(70);
                    engine.get_cached_or_calculate(symbol, "1h", &series).is_ok()
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(engine.cache_stats().entries, 4);
    }
}
