// =============================================================================
// Moving-Average Bundles
// =============================================================================
//
// Latest SMA / EMA value for each configured period.  A period longer than
// the series is reported as `None` instead of failing the whole bundle.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::indicators::series::{ema, latest_per_period, sma};

/// Period => latest average (or `None` when the series is too short).
pub type AverageBundle = BTreeMap<usize, Option<f64>>;

pub fn sma_bundle(series: &[f64], periods: &[usize]) -> Result<AverageBundle> {
    Ok(latest_per_period(series, periods, sma)?.into_iter().collect())
}

pub fn ema_bundle(series: &[f64], periods: &[usize]) -> Result<AverageBundle> {
    Ok(latest_per_period(series, periods, ema)?.into_iter().collect())
}

/// EMA-fast vs EMA-slow alignment of a bundle: `Some(true)` when every
/// shorter period sits above every longer one, `Some(false)` for the
/// reverse, `None` when mixed or incomplete.
pub fn stack_alignment(bundle: &AverageBundle) -> Option<bool> {
    let values: Vec<f64> = bundle.values().copied().collect::<Option<Vec<_>>>()?;
    if values.len() < 2 {
        return None;
    }
    if values.windows(2).all(|w| w[0] > w[1]) {
        Some(true)
    } else if values.windows(2).all(|w| w[0] < w[1]) {
        Some(false)
    } else {
        None
    }
}
