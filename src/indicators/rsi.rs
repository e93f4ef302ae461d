// =============================================================================
// Relative Strength Index (RSI) - Wilder's Smoothing
// =============================================================================
//
// Step 1: Price changes from consecutive closes.
// Step 2: Gains (positive changes, else 0) and losses (|negative|, else 0).
// Step 3: Seed average gain / loss with the simple mean of the first
//          `period` gains / losses.
// Step 4: Wilder's smoothing for every later change:
//            avg = (avg * (period - 1) + value) / period
// Step 5: RSI = 100 - 100 / (1 + avg_gain / avg_loss), with the degenerate
//          cases pinned: no movement => 50, no losses => 100, no gains => 0.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::indicators::series::{changes, check_period, validate};
use crate::types::Zone;

/// Overbought / oversold bounds for [`rsi_signal`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiThresholds {
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for RsiThresholds {
    fn default() -> Self {
        Self {
            overbought: 70.0,
            oversold: 30.0,
        }
    }
}

/// Compute the full RSI series for `closes`.
///
/// One value per close starting at index `period`; the output is
/// `closes.len() - period` long.  Needs at least `period + 1` closes.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Result<Vec<f64>> {
    check_period(period, "RSI period")?;
    validate(closes, period + 1)?;

    let deltas = changes(closes)?;
    let gains: Vec<f64> = deltas.iter().map(|&d| if d > 0.0 { d } else { 0.0 }).collect();
    let losses: Vec<f64> = deltas.iter().map(|&d| if d < 0.0 { d.abs() } else { 0.0 }).collect();

    let period_f = period as f64;
    let mut avg_gain = gains[..period].iter().sum::<f64>() / period_f;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period_f;

    let mut result = Vec::with_capacity(deltas.len() - period + 1);
    result.push(rsi_from_averages(avg_gain, avg_loss));

    for i in period..deltas.len() {
        avg_gain = (avg_gain * (period_f - 1.0) + gains[i]) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + losses[i]) / period_f;
        result.push(rsi_from_averages(avg_gain, avg_loss));
    }

    Ok(result)
}

/// Classify an RSI reading; bounds are inclusive.
pub fn rsi_signal(value: f64, thresholds: RsiThresholds) -> Zone {
    if value >= thresholds.overbought {
        Zone::Overbought
    } else if value <= thresholds.oversold {
        Zone::Oversold
    } else {
        Zone::Neutral
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain == 0.0 && avg_loss == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndicatorError;

    #[test]
    fn rsi_insufficient_data() {
        // Need period+1 closes. 14 closes for period 14 is one short.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        assert_eq!(
            calculate_rsi(&closes, 14).unwrap_err(),
            IndicatorError::InsufficientData { required: 15, actual: 14 }
        );
    }

    #[test]
    fn rsi_period_zero() {
        assert!(matches!(
            calculate_rsi(&[1.0, 2.0, 3.0], 0).unwrap_err(),
            IndicatorError::InvalidInput { .. }
        ));
    }

    #[test]
    fn rsi_output_length() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        assert_eq!(calculate_rsi(&closes, 14).unwrap().len(), 16);
    }

    #[test]
    fn rsi_all_gains() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14).unwrap();
        assert!(series.iter().all(|&v| v == 100.0));
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14).unwrap();
        assert!(series.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn rsi_flat_market() {
        let series = calculate_rsi(&[100.0; 30], 14).unwrap();
        assert!(series.iter().all(|&v| v == 50.0));
    }

    #[test]
    fn rsi_strong_uptrend_scenario() {
        let closes: Vec<f64> = (10..=30).map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14).unwrap();
        assert!(series[0] > 90.0, "first RSI {} should exceed 90", series[0]);
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let series = calculate_rsi(&closes, 14).unwrap();
        assert_eq!(series.len(), 4);
        for &v in &series {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn rsi_range_check_oscillating() {
        let closes: Vec<f64> = (0..200).map(|i| 100.0 + (i as f64 * 0.7).sin() * 15.0).collect();
        for v in calculate_rsi(&closes, 14).unwrap() {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn rsi_signal_classification() {
        let t = RsiThresholds::default();
        assert_eq!(rsi_signal(70.0, t), Zone::Overbought);
        assert_eq!(rsi_signal(30.0, t), Zone::Oversold);
        assert_eq!(rsi_signal(50.0, t), Zone::Neutral);

        let custom = RsiThresholds { overbought: 80.0, oversold: 20.0 };
        assert_eq!(rsi_signal(75.0, custom), Zone::Neutral);
    }
}
