// =============================================================================
// Series Primitives
// =============================================================================
//
// Sliding-window building blocks shared by every indicator:
//
//   sma      : arithmetic mean of each window of `period` values
//   ema      : SMA-seeded exponential average, multiplier = 2 / (period + 1)
//   std_dev  : population standard deviation (divide by `period`)
//   changes  : first differences
//
// Windowed outputs are `len - period + 1` long; element `i` of the output is
// anchored to input index `i + period - 1`.
// =============================================================================

use crate::error::{IndicatorError, Result};

/// Reject a zero period, a series shorter than `required`, or any non-finite
/// element.
pub fn validate(series: &[f64], required: usize) -> Result<()> {
    if series.len() < required {
        return Err(IndicatorError::insufficient(required, series.len()));
    }
    if let Some((index, value)) = series.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(IndicatorError::invalid_input(format!(
            "series contains non-finite value {value} at index {index}"
        )));
    }
    Ok(())
}

pub(crate) fn check_period(period: usize, name: &str) -> Result<()> {
    if period == 0 {
        return Err(IndicatorError::invalid_input(format!(
            "{name} must be greater than zero"
        )));
    }
    Ok(())
}

/// Simple moving average over every window of `period` values.
pub fn sma(series: &[f64], period: usize) -> Result<Vec<f64>> {
    check_period(period, "period")?;
    validate(series, period)?;

    let period_f = period as f64;
    let result = series
        .windows(period)
        .map(|window| window.iter().sum::<f64>() / period_f)
        .collect();
    Ok(result)
}

/// Exponential moving average seeded with the SMA of the first `period`
/// values.  Same length as the SMA output.
pub fn ema(series: &[f64], period: usize) -> Result<Vec<f64>> {
    check_period(period, "period")?;
    validate(series, period)?;

    let multiplier = 2.0 / (period + 1) as f64;
    let seed = series[..period].iter().sum::<f64>() / period as f64;

    let mut result = Vec::with_capacity(series.len() - period + 1);
    result.push(seed);

    let mut prev = seed;
    for &value in &series[period..] {
        prev = (value - prev) * multiplier + prev;
        result.push(prev);
    }
    Ok(result)
}

/// Population standard deviation over every window of `period` values.
pub fn std_dev(series: &[f64], period: usize) -> Result<Vec<f64>> {
    check_period(period, "period")?;
    validate(series, period)?;

    let period_f = period as f64;
    let result = series
        .windows(period)
        .map(|window| {
            let mean = window.iter().sum::<f64>() / period_f;
            let variance = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / period_f;
            variance.sqrt()
        })
        .collect();
    Ok(result)
}

/// First differences: `out[i] = series[i + 1] - series[i]`.
pub fn changes(series: &[f64]) -> Result<Vec<f64>> {
    validate(series, 2)?;
    Ok(series.windows(2).map(|w| w[1] - w[0]).collect())
}

/// Last value of each requested moving average, or `None` for periods the
/// series is too short for.
pub fn latest_per_period<F>(series: &[f64], periods: &[usize], average: F) -> Result<Vec<(usize, Option<f64>)>>
where
    F: Fn(&[f64], usize) -> Result<Vec<f64>>,
{
    let mut out = Vec::with_capacity(periods.len());
    for &period in periods {
        match average(series, period) {
            Ok(values) => out.push((period, values.last().copied())),
            Err(e) if e.is_insufficient_data() => out.push((period, None)),
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}
