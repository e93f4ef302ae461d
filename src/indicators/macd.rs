// =============================================================================
// MACD - Moving Average Convergence Divergence
// =============================================================================
//
//   macd_line = EMA(fast) - EMA(slow)
//   signal    = EMA(macd_line, signal_period)
//   histogram = macd_line - signal
//
// EMA(fast) starts `slow - fast` points earlier than EMA(slow), so its head is
// trimmed before subtracting.  The signal line then lags the MACD line by
// `signal_period - 1`, which is trimmed the same way.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{IndicatorError, Result};
use crate::indicators::series::{check_period, ema, validate};
use crate::types::{Crossover, MacdStrength, MomentumDirection, TrendBias};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdPoint {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Interpretation of a single MACD point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacdInterpretation {
    pub trend: TrendBias,
    pub strength: MacdStrength,
    pub momentum: MomentumDirection,
}

/// Compute MACD points for `closes`.  Needs `slow + signal_period` closes.
pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal_period: usize) -> Result<Vec<MacdPoint>> {
    check_period(fast, "MACD fast period")?;
    check_period(signal_period, "MACD signal period")?;
    if slow <= fast {
        return Err(IndicatorError::invalid_input(format!(
            "MACD slow period ({slow}) must exceed fast period ({fast})"
        )));
    }
    validate(closes, slow + signal_period)?;

    let fast_ema = ema(closes, fast)?;
    let slow_ema = ema(closes, slow)?;

    let offset = slow - fast;
    let macd_line: Vec<f64> = slow_ema
        .iter()
        .enumerate()
        .map(|(i, &s)| fast_ema[i + offset] - s)
        .collect();

    let signal_line = ema(&macd_line, signal_period)?;
    let signal_offset = signal_period - 1;

    let result = signal_line
        .iter()
        .enumerate()
        .map(|(i, &signal)| {
            let macd = macd_line[i + signal_offset];
            MacdPoint {
                macd,
                signal,
                histogram: macd - signal,
            }
        })
        .collect();
    Ok(result)
}

/// Compare the last two MACD points.
///
/// Bullish when the MACD line was strictly below the signal line and has
/// now reached or passed it; bearish is the mirror image.
pub fn detect_crossover(points: &[MacdPoint]) -> Crossover {
    let [.., previous, current] = points else {
        return Crossover::None;
    };

    if previous.macd < previous.signal && current.macd >= current.signal {
        Crossover::Bullish
    } else if previous.macd > previous.signal && current.macd <= current.signal {
        Crossover::Bearish
    } else {
        Crossover::None
    }
}

pub fn interpret(point: &MacdPoint) -> MacdInterpretation {
    MacdInterpretation {
        trend: if point.macd > point.signal {
            TrendBias::Bullish
        } else {
            TrendBias::Bearish
        },
        strength: if point.histogram.abs() > 1.0 {
            MacdStrength::Strong
        } else {
            MacdStrength::Weak
        },
        momentum: if point.histogram > 0.0 {
            MomentumDirection::Positive
        } else {
            MomentumDirection::Negative
        },
    }
}
