// =============================================================================
// Shared classification types used across the indicator engine
// =============================================================================
//
// Every indicator interpretation is a closed set of labels.  They serialise
// as snake_case strings (`"above_upper"`, `"extremely_high"`, ...) so the
// computed results read the same way downstream consumers expect.

use serde::{Deserialize, Serialize};

/// Implements `Display` by delegating to the type's `as_str`.
macro_rules! display_via_as_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

/// Overbought / oversold classification shared by RSI and Stochastic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Overbought,
    Oversold,
    Neutral,
}

impl Zone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overbought => "overbought",
            Self::Oversold => "oversold",
            Self::Neutral => "neutral",
        }
    }
}

/// MACD line vs. signal line crossing between the last two points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Crossover {
    Bullish,
    Bearish,
    None,
}

impl Crossover {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::None => "none",
        }
    }
}

/// MACD trend bias: above the signal line or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendBias {
    Bullish,
    Bearish,
}

impl TrendBias {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdStrength {
    Strong,
    Weak,
}

impl MacdStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Weak => "weak",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentumDirection {
    Positive,
    Negative,
}

impl MomentumDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

/// Where a price sits relative to its Bollinger Bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandPosition {
    AboveUpper,
    Upper,
    Middle,
    Lower,
    BelowLower,
}

impl BandPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AboveUpper => "above_upper",
            Self::Upper => "upper",
            Self::Middle => "middle",
            Self::Lower => "lower",
            Self::BelowLower => "below_lower",
        }
    }
}

/// Current ATR relative to its own history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityLevel {
    High,
    Normal,
    Low,
}

impl VolatilityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
        }
    }
}

/// Current volume relative to its moving average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeLevel {
    ExtremelyHigh,
    High,
    Normal,
    Low,
    ExtremelyLow,
}

impl VolumeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtremelyHigh => "extremely_high",
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
            Self::ExtremelyLow => "extremely_low",
        }
    }
}

/// Direction of the OBV line over the lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeTrend {
    Rising,
    Falling,
    Flat,
}

impl VolumeTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rising => "rising",
            Self::Falling => "falling",
            Self::Flat => "flat",
        }
    }
}

/// Whether volume backs the latest price move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceVolumeConfirmation {
    StrongBullish,
    WeakBullish,
    StrongBearish,
    WeakBearish,
}

impl PriceVolumeConfirmation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrongBullish => "strong_bullish",
            Self::WeakBullish => "weak_bullish",
            Self::StrongBearish => "strong_bearish",
            Self::WeakBearish => "weak_bearish",
        }
    }
}

/// Aggregate directional call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Bullish,
    Bearish,
    Neutral,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Neutral => "neutral",
        }
    }
}

impl Default for Direction {
    fn default() -> Self {
        Self::Neutral
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStrength {
    Strong,
    Moderate,
    Weak,
}

impl SignalStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Moderate => "moderate",
            Self::Weak => "weak",
        }
    }
}

impl Default for SignalStrength {
    fn default() -> Self {
        Self::Weak
    }
}

display_via_as_str!(
    Zone,
    Crossover,
    TrendBias,
    MacdStrength,
    MomentumDirection,
    BandPosition,
    VolatilityLevel,
    VolumeLevel,
    VolumeTrend,
    PriceVolumeConfirmation,
    Direction,
    SignalStrength,
);
