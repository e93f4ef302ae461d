// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Middle band = SMA(period); upper / lower = middle ± k * σ where σ is the
// population standard deviation over the same window.  Band width (BBW) is
// the normalised spread: (upper - lower) / middle * 100.
//
// Position classification splits each half-band at 80% of the distance from
// the middle to the outer band:
//
//   price > upper                 => above_upper
//   price > middle + 0.8 * (upper - middle)  => upper
//   price < lower                 => below_lower
//   price < middle - 0.8 * (middle - lower)  => lower
//   otherwise                     => middle

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::indicators::series::{check_period, sma, std_dev};
use crate::types::BandPosition;

const OUTER_BAND_FRACTION: f64 = 0.8;

/// One set of bands, anchored to the last close of its window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Full band series; one entry per window of `period` closes.
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> Result<Vec<Bands>> {
    check_period(period, "Bollinger period")?;
    let middle = sma(closes, period)?;
    let sigma = std_dev(closes, period)?;

    let result = middle
        .iter()
        .zip(&sigma)
        .map(|(&m, &s)| Bands {
            upper: m + s * num_std,
            middle: m,
            lower: m - s * num_std,
        })
        .collect();
    Ok(result)
}

pub fn band_position(price: f64, bands: &Bands) -> BandPosition {
    let upper_threshold = bands.middle + (bands.upper - bands.middle) * OUTER_BAND_FRACTION;
    let lower_threshold = bands.middle - (bands.middle - bands.lower) * OUTER_BAND_FRACTION;

    if price > bands.upper {
        BandPosition::AboveUpper
    } else if price > upper_threshold {
        BandPosition::Upper
    } else if price < bands.lower {
        BandPosition::BelowLower
    } else if price < lower_threshold {
        BandPosition::Lower
    } else {
        BandPosition::Middle
    }
}

/// Bollinger Band Width in percent of the middle band.
///
/// A zero middle band has no meaningful width; it is reported as 0.
pub fn band_width(bands: &Bands) -> f64 {
    if bands.middle == 0.0 {
        return 0.0;
    }
    (bands.upper - bands.lower) / bands.middle * 100.0
}
