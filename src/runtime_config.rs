// =============================================================================
// Indicator Configuration - typed parameters with atomic save
// =============================================================================
//
// Every tunable indicator parameter lives here.  Each indicator has its own
// parameter struct; `ConfigOverrides` carries optional replacements that are
// resolved over a base config at call time.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::IndicatorError;
use crate::indicators::rsi::RsiThresholds;
use crate::indicators::stochastic::StochasticThresholds;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_sma_periods() -> Vec<usize> {
    vec![20, 50, 200]
}

fn default_ema_periods() -> Vec<usize> {
    vec![12, 26]
}

fn default_volume_ma_periods() -> Vec<usize> {
    vec![20, 50]
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_window_size() -> usize {
    200
}

fn default_spike_threshold() -> f64 {
    2.0
}

// =============================================================================
// Per-indicator parameters
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiParams {
    pub period: usize,
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self {
            period: 14,
            overbought: 70.0,
            oversold: 30.0,
        }
    }
}

impl RsiParams {
    pub fn thresholds(&self) -> RsiThresholds {
        RsiThresholds {
            overbought: self.overbought,
            oversold: self.oversold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticParams {
    pub k_period: usize,
    pub d_period: usize,
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
            overbought: 80.0,
            oversold: 20.0,
        }
    }
}

impl StochasticParams {
    pub fn thresholds(&self) -> StochasticThresholds {
        StochasticThresholds {
            overbought: self.overbought,
            oversold: self.oversold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerParams {
    pub period: usize,
    /// Standard-deviation multiplier for the outer bands.
    pub std_dev: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtrParams {
    pub period: usize,
}

impl Default for AtrParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

// =============================================================================
// IndicatorConfig
// =============================================================================

/// Top-level configuration for the indicator engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    #[serde(default)]
    pub rsi: RsiParams,

    #[serde(default)]
    pub stochastic: StochasticParams,

    /// Periods reported in the SMA bundle.
    #[serde(default = "default_sma_periods")]
    pub sma: Vec<usize>,

    /// Periods reported in the EMA bundle.
    #[serde(default = "default_ema_periods")]
    pub ema: Vec<usize>,

    #[serde(default)]
    pub macd: MacdParams,

    #[serde(default)]
    pub bollinger: BollingerParams,

    #[serde(default)]
    pub atr: AtrParams,

    /// Periods for the volume moving averages; the first one is the
    /// reference average for volume analysis.
    #[serde(default = "default_volume_ma_periods")]
    pub volume_ma: Vec<usize>,

    /// Multiple of the trailing 20-bar mean that marks a volume spike.
    #[serde(default = "default_spike_threshold")]
    pub spike_threshold: f64,

    /// Lifetime of a cached result, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Bars kept by each streaming calculator.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi: RsiParams::default(),
            stochastic: StochasticParams::default(),
            sma: default_sma_periods(),
            ema: default_ema_periods(),
            macd: MacdParams::default(),
            bollinger: BollingerParams::default(),
            atr: AtrParams::default(),
            volume_ma: default_volume_ma_periods(),
            spike_threshold: default_spike_threshold(),
            cache_ttl_secs: default_cache_ttl_secs(),
            window_size: default_window_size(),
        }
    }
}

/// Optional replacements for any part of an [`IndicatorConfig`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigOverrides {
    #[serde(default)]
    pub rsi: Option<RsiParams>,
    #[serde(default)]
    pub stochastic: Option<StochasticParams>,
    #[serde(default)]
    pub sma: Option<Vec<usize>>,
    #[serde(default)]
    pub ema: Option<Vec<usize>>,
    #[serde(default)]
    pub macd: Option<MacdParams>,
    #[serde(default)]
    pub bollinger: Option<BollingerParams>,
    #[serde(default)]
    pub atr: Option<AtrParams>,
    #[serde(default)]
    pub volume_ma: Option<Vec<usize>>,
    #[serde(default)]
    pub spike_threshold: Option<f64>,
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,
    #[serde(default)]
    pub window_size: Option<usize>,
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl IndicatorConfig {
    /// Resolve `overrides` over `self`, field by field.
    pub fn merged(&self, overrides: &ConfigOverrides) -> Self {
        Self {
            rsi: overrides.rsi.unwrap_or(self.rsi),
            stochastic: overrides.stochastic.unwrap_or(self.stochastic),
            sma: overrides.sma.clone().unwrap_or_else(|| self.sma.clone()),
            ema: overrides.ema.clone().unwrap_or_else(|| self.ema.clone()),
            macd: overrides.macd.unwrap_or(self.macd),
            bollinger: overrides.bollinger.unwrap_or(self.bollinger),
            atr: overrides.atr.unwrap_or(self.atr),
            volume_ma: overrides
                .volume_ma
                .clone()
                .unwrap_or_else(|| self.volume_ma.clone()),
            spike_threshold: overrides.spike_threshold.unwrap_or(self.spike_threshold),
            cache_ttl_secs: overrides.cache_ttl_secs.unwrap_or(self.cache_ttl_secs),
            window_size: overrides.window_size.unwrap_or(self.window_size),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Reject parameter combinations no indicator can work with.
    pub fn validate(&self) -> std::result::Result<(), IndicatorError> {
        let periods = [
            ("rsi.period", self.rsi.period),
            ("stochastic.k_period", self.stochastic.k_period),
            ("stochastic.d_period", self.stochastic.d_period),
            ("macd.fast", self.macd.fast),
            ("macd.slow", self.macd.slow),
            ("macd.signal", self.macd.signal),
            ("bollinger.period", self.bollinger.period),
            ("atr.period", self.atr.period),
            ("window_size", self.window_size),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(IndicatorError::invalid_input(format!("{name} must be greater than zero")));
        }

        for (name, list) in [("sma", &self.sma), ("ema", &self.ema), ("volume_ma", &self.volume_ma)] {
            if list.is_empty() || list.contains(&0) {
                return Err(IndicatorError::invalid_input(format!(
                    "{name} periods must be non-empty and greater than zero"
                )));
            }
        }

        if self.macd.fast >= self.macd.slow {
            return Err(IndicatorError::invalid_input(format!(
                "macd.fast ({}) must be below macd.slow ({})",
                self.macd.fast, self.macd.slow
            )));
        }

        if !self.bollinger.std_dev.is_finite() || !self.spike_threshold.is_finite() {
            return Err(IndicatorError::invalid_input(
                "bollinger.std_dev and spike_threshold must be finite",
            ));
        }

        Ok(())
    }

    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read indicator config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse indicator config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid indicator config in {}", path.display()))?;

        info!(
            path = %path.display(),
            rsi_period = config.rsi.period,
            cache_ttl_secs = config.cache_ttl_secs,
            window_size = config.window_size,
            "indicator config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise indicator config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "indicator config saved (atomic)");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = IndicatorConfig::default();
        assert_eq!(cfg.rsi.period, 14);
        assert_eq!(cfg.stochastic.k_period, 14);
        assert_eq!(cfg.stochastic.d_period, 3);
        assert_eq!(cfg.sma, vec![20, 50, 200]);
        assert_eq!(cfg.ema, vec![12, 26]);
        assert_eq!(cfg.macd, MacdParams { fast: 12, slow: 26, signal: 9 });
        assert!((cfg.bollinger.std_dev - 2.0).abs() < f64::EPSILON);
        assert_eq!(cfg.atr.period, 14);
        assert_eq!(cfg.volume_ma, vec![20, 50]);
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(300));
        assert_eq!(cfg.window_size, 200);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: IndicatorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, IndicatorConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "rsi": { "period": 21, "overbought": 80.0, "oversold": 20.0 }, "sma": [5, 8] }"#;
        let cfg: IndicatorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.rsi.period, 21);
        assert_eq!(cfg.sma, vec![5, 8]);
        assert_eq!(cfg.ema, vec![12, 26]);
        assert_eq!(cfg.macd.slow, 26);
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let base = IndicatorConfig::default();
        let overrides = ConfigOverrides {
            macd: Some(MacdParams { fast: 5, slow: 35, signal: 5 }),
            window_size: Some(300),
            ..Default::default()
        };
        let merged = base.merged(&overrides);
        assert_eq!(merged.macd.fast, 5);
        assert_eq!(merged.window_size, 300);
        assert_eq!(merged.rsi, base.rsi);
        assert_eq!(merged.sma, base.sma);
        assert!(ConfigOverrides::default().is_empty());
        assert!(!overrides.is_empty());
    }

    #[test]
    fn validate_rejects_bad_parameters() {
        let mut cfg = IndicatorConfig::default();
        cfg.rsi.period = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = IndicatorConfig::default();
        cfg.macd = MacdParams { fast: 26, slow: 12, signal: 9 };
        assert!(cfg.validate().is_err());

        let mut cfg = IndicatorConfig::default();
        cfg.volume_ma.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!("ta_engine_config_{}.json", std::process::id()));
        let mut cfg = IndicatorConfig::default();
        cfg.cache_ttl_secs = 60;
        cfg.save(&path).unwrap();
        let loaded = IndicatorConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn load_missing_file_errors() {
        let path = std::env::temp_dir().join("ta_engine_config_does_not_exist.json");
        assert!(IndicatorConfig::load(path).is_err());
    }
}
