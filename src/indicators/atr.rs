// =============================================================================
// Average True Range (ATR) - Wilder's Smoothing Method
// =============================================================================
//
// True Range for each bar:
//   first bar   TR = H - L
//   otherwise   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is the smoothed average of TR:
//   ATR_0 = mean of the first `period` TR values
//   ATR_t = (ATR_{t-1} * (period - 1) + TR_t) / period
//
// Default period: 14
// =============================================================================

use crate::error::{IndicatorError, Result};
use crate::indicators::series::check_period;
use crate::market_data::Ohlc;
use crate::types::VolatilityLevel;

/// ATR history needed before the volatility level is judged.
const MIN_LEVEL_HISTORY: usize = 20;

pub fn true_range(current: &Ohlc, previous: Option<&Ohlc>) -> f64 {
    let hl = current.high - current.low;
    match previous {
        None => hl,
        Some(prev) => {
            let hc = (current.high - prev.close).abs();
            let lc = (current.low - prev.close).abs();
            hl.max(hc).max(lc)
        }
    }
}

/// Full ATR series; needs `period + 1` bars and yields
/// `bars.len() - period + 1` values.
pub fn calculate_atr(bars: &[Ohlc], period: usize) -> Result<Vec<f64>> {
    check_period(period, "ATR period")?;
    if bars.len() < period + 1 {
        return Err(IndicatorError::insufficient(period + 1, bars.len()));
    }
    for bar in bars {
        bar.validate()?;
    }

    let tr_values: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| true_range(bar, i.checked_sub(1).map(|p| &bars[p])))
        .collect();

    let period_f = period as f64;
    let mut atr = tr_values[..period].iter().sum::<f64>() / period_f;

    let mut result = Vec::with_capacity(tr_values.len() - period + 1);
    result.push(atr);
    for &tr in &tr_values[period..] {
        atr = (atr * (period_f - 1.0) + tr) / period_f;
        result.push(atr);
    }
    Ok(result)
}

/// ATR as a percentage of the last close.
pub fn atr_pct(atr: f64, last_close: f64) -> Option<f64> {
    if last_close == 0.0 {
        return None;
    }
    Some(atr / last_close * 100.0)
}

/// Compare the current ATR with the mean of its history.
pub fn volatility_level(current: f64, history: &[f64]) -> VolatilityLevel {
    if history.len() < MIN_LEVEL_HISTORY {
        return VolatilityLevel::Normal;
    }
    let mean = history.iter().sum::<f64>() / history.len() as f64;
    if current > mean * 1.5 {
        VolatilityLevel::High
    } else if current < mean * 0.5 {
        VolatilityLevel::Low
    } else {
        VolatilityLevel::Normal
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn bar(high: f64, low: f64, close: f64) -> Ohlc {
        Ohlc { high, low, close }
    }

    #[test]
    fn atr_insufficient_data() {
        let bars = vec![bar(105.0, 95.0, 102.0); 14];
        assert_eq!(
            calculate_atr(&bars, 14).unwrap_err(),
            IndicatorError::InsufficientData { required: 15, actual: 14 }
        );
    }

    #[test]
    fn atr_first_bar_uses_own_range() {
        assert_eq!(true_range(&bar(105.0, 95.0, 100.0), None), 10.0);
    }

    #[test]
    fn true_range_uses_prev_close_on_gap() {
        let prev = bar(105.0, 95.0, 95.0);
        let cur = bar(115.0, 108.0, 112.0);
        assert_eq!(true_range(&cur, Some(&prev)), 20.0);
    }

    #[test]
    fn atr_seed_and_smoothing() {
        let bars = vec![
            bar(102.0, 98.0, 101.0),  // TR 4
            bar(104.0, 99.0, 103.0),  // TR 5
            bar(106.0, 100.0, 105.0), // TR 6
            bar(108.0, 102.0, 107.0), // TR 6
        ];
        let atr = calculate_atr(&bars, 3).unwrap();
        assert_eq!(atr.len(), 2);
        assert!((atr[0] - 5.0).abs() < 1e-10);
        assert!((atr[1] - (5.0 * 2.0 + 6.0) / 3.0).abs() < 1e-10);
    }

    #[test]
    fn atr_constant_range_converges() {
        let bars: Vec<Ohlc> = (0..30)
            .map(|i| {
                let base = 100.0 + i as f64 * 0.1;
                bar(base + 5.0, base - 5.0, base)
            })
            .collect();
        let atr = *calculate_atr(&bars, 14).unwrap().last().unwrap();
        assert!((atr - 10.0).abs() < 1.0, "expected ATR near 10.0, got {atr}");
    }

    #[test]
    fn atr_positive_and_ordered_by_range() {
        let make = |spread: f64| -> Vec<Ohlc> {
            (0..50)
                .map(|i| {
                    let base = 100.0 + (i as f64 * 0.5).sin() * 10.0;
                    bar(base + spread, base - spread, base)
                })
                .collect()
        };
        let narrow = *calculate_atr(&make(1.0), 14).unwrap().last().unwrap();
        let wide = *calculate_atr(&make(4.0), 14).unwrap().last().unwrap();
        assert!(narrow > 0.0);
        assert!(wide > narrow);
    }

    #[test]
    fn atr_nan_is_invalid_input() {
        let bars = vec![
            bar(105.0, 95.0, 100.0),
            bar(f64::NAN, 95.0, 100.0),
            bar(105.0, 95.0, 100.0),
            bar(105.0, 95.0, 100.0),
        ];
        assert!(matches!(
            calculate_atr(&bars, 3).unwrap_err(),
            IndicatorError::InvalidInput { .. }
        ));
    }

    #[test]
    fn atr_pct_of_close() {
        assert_eq!(atr_pct(2.0, 200.0), Some(1.0));
        assert_eq!(atr_pct(2.0, 0.0), None);
    }

    #[test]
    fn volatility_level_thresholds() {
        let history = vec![1.0; 20];
        assert_eq!(volatility_level(1.6, &history), VolatilityLevel::High);
        assert_eq!(volatility_level(0.4, &history), VolatilityLevel::Low);
        assert_eq!(volatility_level(1.5, &history), VolatilityLevel::Normal);
        assert_eq!(volatility_level(10.0, &history[..19]), VolatilityLevel::Normal);
    }
}
