// =============================================================================
// Streaming Calculator - bounded window, append one bar, recompute
// =============================================================================
//
// One calculator per (symbol, timeframe) stream, owned by a single task.
// Appending a bar and recomputing happen under `&mut self`, so no caller can
// observe a half-updated window.  Results are computed by the same function
// as bulk evaluation and are therefore identical for identical windows.
// =============================================================================

use tracing::{debug, info, warn};

use crate::engine::{calculate, ComputedResult};
use crate::error::Result;
use crate::market_data::{Bar, BarWindow, SeriesKey};
use crate::runtime_config::IndicatorConfig;

#[derive(Debug, Clone)]
pub struct StreamingCalculator {
    key: SeriesKey,
    window: BarWindow,
    config: IndicatorConfig,
}

impl StreamingCalculator {
    pub fn new(key: SeriesKey, config: IndicatorConfig) -> Self {
        let window = BarWindow::new(config.window_size);
        Self { key, window, config }
    }

    pub fn key(&self) -> &SeriesKey {
        &self.key
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Seed the window from history, keeping only the most recent bars.
    pub fn initialize(&mut self, history: &[Bar]) {
        self.window.seed(history);
        info!(
            key = %self.key,
            seeded = self.window.len(),
            capacity = self.window.capacity(),
            offered = history.len(),
            "streaming window seeded"
        );
    }

    /// Append `bar` (evicting the oldest when full) and recompute.
    ///
    /// The window keeps the new bar even when the recompute fails, so the
    /// next bar can simply be tried again.
    pub fn add_bar_and_calculate(&mut self, bar: Bar) -> Result<ComputedResult> {
        if let Some(evicted) = self.window.push(bar) {
            debug!(key = %self.key, evicted = %evicted.timestamp, "bar evicted from window");
        }

        let outcome = self.calculate();
        if let Err(e) = &outcome {
            if e.is_insufficient_data() {
                debug!(key = %self.key, bars = self.window.len(), "window still warming up");
            } else {
                warn!(key = %self.key, error = %e, "streaming recompute failed");
            }
        }
        outcome
    }

    /// Evaluate the current window.
    pub fn calculate(&self) -> Result<ComputedResult> {
        calculate(&self.window.to_series(), &self.config)
    }

    /// Drop every bar in the window.
    pub fn reset(&mut self) {
        self.window.clear();
        info!(key = %self.key, "streaming window reset");
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    pub fn latest_bar(&self) -> Option<&Bar> {
        self.window.last()
    }

    /// Point the calculator at another stream, reseeded from `history`.
    pub fn switch_stream(&mut self, key: SeriesKey, history: &[Bar]) {
        self.reset();
        info!(from = %self.key, to = %key, "switching stream");
        self.key = key;
        self.initialize(history);
    }
}
