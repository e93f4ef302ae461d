// =============================================================================
// Volume Indicators
// =============================================================================
//
// - Volume moving averages (SMA bundle over the volume series)
// - On-Balance Volume: running total seeded with the first bar's volume;
//   +volume on an up close, -volume on a down close, unchanged otherwise
// - Volume analysis: current / average ratio bucketed into five levels
// - Spike detection against the preceding 20-bar mean
// - OBV trend: percent change across the lookback window, ±5% dead band
// - Price / volume confirmation

use serde::{Deserialize, Serialize};

use crate::error::{IndicatorError, Result};
use crate::indicators::moving_average::{sma_bundle, AverageBundle};
use crate::indicators::series::validate;
use crate::types::{PriceVolumeConfirmation, VolumeLevel, VolumeTrend};

/// Bars averaged when judging whether a bar is a spike.
pub const SPIKE_LOOKBACK: usize = 20;

/// Percent OBV change treated as a trend.
const TREND_DEAD_BAND_PCT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeAnalysis {
    pub level: VolumeLevel,
    pub ratio: f64,
    pub above_average: bool,
    /// `ratio * 100`, rounded to two decimals.
    pub percentage_of_average: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationReading {
    pub confirmation: PriceVolumeConfirmation,
    pub volume_supported: bool,
}

pub fn volume_ma(volumes: &[f64], periods: &[usize]) -> Result<AverageBundle> {
    sma_bundle(volumes, periods)
}

/// On-Balance Volume over parallel close / volume series.
pub fn calculate_obv(closes: &[f64], volumes: &[f64]) -> Result<Vec<f64>> {
    if closes.len() != volumes.len() {
        return Err(IndicatorError::LengthMismatch {
            field: "volume",
            actual: volumes.len(),
            expected: closes.len(),
        });
    }
    validate(closes, 2)?;
    validate(volumes, 2)?;

    let mut obv = volumes[0];
    let mut result = Vec::with_capacity(closes.len());
    result.push(obv);

    for i in 1..closes.len() {
        if closes[i] > closes[i - 1] {
            obv += volumes[i];
        } else if closes[i] < closes[i - 1] {
            obv -= volumes[i];
        }
        result.push(obv);
    }
    Ok(result)
}

/// Bucket `current` against `average`.  A zero average yields a zero ratio.
pub fn analyze_volume(current: f64, average: f64) -> VolumeAnalysis {
    let ratio = if average == 0.0 { 0.0 } else { current / average };

    let level = if ratio >= 2.0 {
        VolumeLevel::ExtremelyHigh
    } else if ratio >= 1.5 {
        VolumeLevel::High
    } else if ratio >= 0.75 {
        VolumeLevel::Normal
    } else if ratio >= 0.5 {
        VolumeLevel::Low
    } else {
        VolumeLevel::ExtremelyLow
    };

    VolumeAnalysis {
        level,
        ratio,
        above_average: current > average,
        percentage_of_average: (ratio * 100.0 * 100.0).round() / 100.0,
    }
}

/// Indices whose volume is at least `threshold` times the mean of the
/// preceding [`SPIKE_LOOKBACK`] bars.  The first 20 indices are never
/// flagged.
pub fn detect_volume_spikes(volumes: &[f64], threshold: f64) -> Vec<usize> {
    (SPIKE_LOOKBACK..volumes.len())
        .filter(|&i| {
            let preceding = &volumes[i - SPIKE_LOOKBACK..i];
            let average = preceding.iter().sum::<f64>() / SPIKE_LOOKBACK as f64;
            volumes[i] >= average * threshold
        })
        .collect()
}

/// Direction of OBV over its last `lookback` points.
pub fn volume_trend(obv: &[f64], lookback: usize) -> VolumeTrend {
    if lookback == 0 || obv.len() < lookback {
        return VolumeTrend::Flat;
    }
    let recent = &obv[obv.len() - lookback..];
    let start = recent[0];
    let end = recent[lookback - 1];
    if start == 0.0 {
        return VolumeTrend::Flat;
    }

    let change = (end - start) / start.abs() * 100.0;
    if change > TREND_DEAD_BAND_PCT {
        VolumeTrend::Rising
    } else if change < -TREND_DEAD_BAND_PCT {
        VolumeTrend::Falling
    } else {
        VolumeTrend::Flat
    }
}

/// Classify the latest price move by whether volume was above average.
pub fn volume_confirmation(
    current_close: f64,
    previous_close: f64,
    current_volume: f64,
    average_volume: f64,
) -> ConfirmationReading {
    let price_up = current_close > previous_close;
    let volume_high = current_volume > average_volume;

    let confirmation = match (price_up, volume_high) {
        (true, true) => PriceVolumeConfirmation::StrongBullish,
        (true, false) => PriceVolumeConfirmation::WeakBullish,
        (false, true) => PriceVolumeConfirmation::StrongBearish,
        (false, false) => PriceVolumeConfirmation::WeakBearish,
    };

    ConfirmationReading {
        confirmation,
        volume_supported: volume_high,
    }
}
