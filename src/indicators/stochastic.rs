// =============================================================================
// Stochastic Oscillator (%K / %D)
// =============================================================================
//
//   %K = (close - lowest_low) / (highest_high - lowest_low) * 100
//   %D = SMA(%K, d_period)
//
// A window whose high equals its low has no range; %K is pinned to 50 there.
// The output starts once both %K and %D are defined, so it is
// `len - k_period - d_period + 2` long.

use serde::{Deserialize, Serialize};

use crate::error::{IndicatorError, Result};
use crate::indicators::series::{check_period, sma, validate};
use crate::market_data::Ohlc;
use crate::types::Zone;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticPoint {
    pub k: f64,
    pub d: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticThresholds {
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for StochasticThresholds {
    fn default() -> Self {
        Self {
            overbought: 80.0,
            oversold: 20.0,
        }
    }
}

pub fn calculate_stochastic(bars: &[Ohlc], k_period: usize, d_period: usize) -> Result<Vec<StochasticPoint>> {
    check_period(k_period, "stochastic k period")?;
    check_period(d_period, "stochastic d period")?;
    if bars.len() < k_period {
        return Err(IndicatorError::insufficient(k_period, bars.len()));
    }
    for bar in bars {
        bar.validate()?;
    }

    let k_values: Vec<f64> = bars
        .windows(k_period)
        .map(|window| {
            let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
            let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
            let close = window[k_period - 1].close;
            if highest == lowest {
                50.0
            } else {
                (close - lowest) / (highest - lowest) * 100.0
            }
        })
        .collect();

    // %D needs d_period values of %K; report the requirement in bars.
    validate(&k_values, d_period)
        .map_err(|_| IndicatorError::insufficient(k_period + d_period - 1, bars.len()))?;
    let d_values = sma(&k_values, d_period)?;

    let result = d_values
        .iter()
        .enumerate()
        .map(|(i, &d)| StochasticPoint {
            k: k_values[i + d_period - 1],
            d,
        })
        .collect();
    Ok(result)
}

/// Overbought / oversold only when %K and %D agree.
pub fn stochastic_signal(k: f64, d: f64, thresholds: StochasticThresholds) -> Zone {
    if k >= thresholds.overbought && d >= thresholds.overbought {
        Zone::Overbought
    } else if k <= thresholds.oversold && d <= thresholds.oversold {
        Zone::Oversold
    } else {
        Zone::Neutral
    }
}
