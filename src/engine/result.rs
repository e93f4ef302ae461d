// =============================================================================
// Computed Result - one typed record per indicator category
// =============================================================================
//
// A result is immutable once produced.  Each sub-indicator is an `Option` so
// that an indicator omitted for lack of history is simply absent from the
// serialised output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::indicators::moving_average::AverageBundle;
use crate::indicators::volume::{ConfirmationReading, VolumeAnalysis};
use crate::market_data::SeriesKey;
use crate::signals::{SignalInputs, SignalSummary};
use crate::types::{
    BandPosition, Crossover, Direction, MacdStrength, MomentumDirection, SignalStrength,
    TrendBias, VolatilityLevel, VolumeLevel, VolumeTrend, Zone,
};

// -----------------------------------------------------------------------------
// Momentum
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiReading {
    pub value: f64,
    pub signal: Zone,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticReading {
    pub k: f64,
    pub d: f64,
    pub signal: Zone,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MomentumIndicators {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsi: Option<RsiReading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stochastic: Option<StochasticReading>,
}

// -----------------------------------------------------------------------------
// Trend
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdReading {
    pub value: f64,
    pub signal: f64,
    pub histogram: f64,
    pub crossover: Crossover,
    pub trend: TrendBias,
    pub strength: MacdStrength,
    pub momentum: MomentumDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendIndicators {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sma: Option<AverageBundle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ema: Option<AverageBundle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ema_alignment: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macd: Option<MacdReading>,
}

// -----------------------------------------------------------------------------
// Volatility
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerReading {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub position: BandPosition,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtrReading {
    pub value: f64,
    /// ATR as a percent of the last close; absent when the close is 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
    pub level: VolatilityLevel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityIndicators {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bollinger_bands: Option<BollingerReading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atr: Option<AtrReading>,
}

// -----------------------------------------------------------------------------
// Volume
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObvReading {
    pub value: f64,
    pub trend: VolumeTrend,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeIndicators {
    pub current: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub averages: Option<AverageBundle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<VolumeAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obv: Option<ObvReading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_volume_confirmation: Option<ConfirmationReading>,
    /// Whether the latest bar is a volume spike.
    #[serde(default)]
    pub latest_spike: bool,
}

// -----------------------------------------------------------------------------
// Merged result
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub momentum: MomentumIndicators,
    pub trend: TrendIndicators,
    pub volatility: VolatilityIndicators,
    pub volume: VolumeIndicators,
}

impl From<&IndicatorSet> for SignalInputs {
    fn from(set: &IndicatorSet) -> Self {
        Self {
            rsi: set.momentum.rsi.map(|r| r.signal),
            stochastic: set.momentum.stochastic.map(|s| s.signal),
            macd: set.trend.macd.map(|m| (m.crossover, m.trend)),
            band_position: set.volatility.bollinger_bands.map(|b| b.position),
            volume_level: set.volume.analysis.map(|a| a.level),
        }
    }
}

/// Full output of one evaluation, anchored to the last bar's timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedResult {
    pub timestamp: DateTime<Utc>,
    pub data_points: usize,
    pub indicators: IndicatorSet,
    pub signals: SignalSummary,
}

// -----------------------------------------------------------------------------
// Summary projection
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValues {
    pub value: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Reduced view of a [`ComputedResult`] for lightweight consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub symbol: String,
    pub timeframe: String,
    pub timestamp: DateTime<Utc>,
    pub signal: Direction,
    pub strength: SignalStrength,
    pub rsi: Option<f64>,
    pub macd: Option<MacdValues>,
    pub bollinger_position: Option<BandPosition>,
    pub atr: Option<f64>,
    pub volatility: Option<VolatilityLevel>,
    pub volume_level: Option<VolumeLevel>,
    pub alerts: Vec<String>,
}

impl ResultSummary {
    pub fn from_result(key: &SeriesKey, result: &ComputedResult) -> Self {
        let indicators = &result.indicators;
        Self {
            symbol: key.symbol.clone(),
            timeframe: key.timeframe.clone(),
            timestamp: result.timestamp,
            signal: result.signals.overall,
            strength: result.signals.strength,
            rsi: indicators.momentum.rsi.map(|r| r.value),
            macd: indicators.trend.macd.map(|m| MacdValues {
                value: m.value,
                signal: m.signal,
                histogram: m.histogram,
            }),
            bollinger_position: indicators.volatility.bollinger_bands.map(|b| b.position),
            atr: indicators.volatility.atr.map(|a| a.value),
            volatility: indicators.volatility.atr.map(|a| a.level),
            volume_level: indicators.volume.analysis.map(|a| a.level),
            alerts: result.signals.alerts.clone(),
        }
    }
}
