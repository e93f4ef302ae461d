// ---------------------------------------------------------------------------
// Bars, stream keys, and parallel series
// ---------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{IndicatorError, Result};

/// Minimum bars the orchestrator accepts for a full calculation.
pub const MIN_DATA_POINTS: usize = 50;

/// A single OHLCV bar for one (symbol, timeframe) bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn ohlc(&self) -> Ohlc {
        Ohlc {
            high: self.high,
            low: self.low,
            close: self.close,
        }
    }
}

/// The high / low / close triple used by range-based indicators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ohlc {
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Ohlc {
    pub fn validate(&self) -> Result<()> {
        if self.high.is_finite() && self.low.is_finite() && self.close.is_finite() {
            Ok(())
        } else {
            Err(IndicatorError::invalid_input(format!(
                "bar contains non-finite value (high {}, low {}, close {})",
                self.high, self.low, self.close
            )))
        }
    }
}

/// Composite key that identifies a unique bar series.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SeriesKey {
    pub symbol: String,
    pub timeframe: String,
}

impl SeriesKey {
    pub fn new(symbol: impl Into<String>, timeframe: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe: timeframe.into(),
        }
    }
}

impl std::fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.symbol, self.timeframe)
    }
}

/// Index-aligned field series extracted from one run of bars.
///
/// Fields default to empty so a partially populated JSON payload still
/// deserialises and is then rejected by [`MarketSeries::validate`] with a
/// precise error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSeries {
    #[serde(default)]
    pub close: Vec<f64>,
    #[serde(default)]
    pub high: Vec<f64>,
    #[serde(default)]
    pub low: Vec<f64>,
    #[serde(default)]
    pub volume: Vec<f64>,
    #[serde(default)]
    pub timestamp: Vec<DateTime<Utc>>,
}

impl MarketSeries {
    pub fn from_bars<'a>(bars: impl IntoIterator<Item = &'a Bar>) -> Self {
        let iter = bars.into_iter();
        let (lower, _) = iter.size_hint();
        let mut series = Self {
            close: Vec::with_capacity(lower),
            high: Vec::with_capacity(lower),
            low: Vec::with_capacity(lower),
            volume: Vec::with_capacity(lower),
            timestamp: Vec::with_capacity(lower),
        };
        for bar in iter {
            series.close.push(bar.close);
            series.high.push(bar.high);
            series.low.push(bar.low);
            series.volume.push(bar.volume);
            series.timestamp.push(bar.timestamp);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    pub fn ohlc(&self) -> Vec<Ohlc> {
        self.close
            .iter()
            .zip(&self.high)
            .zip(&self.low)
            .map(|((&close, &high), &low)| Ohlc { high, low, close })
            .collect()
    }

    /// Base validation: every field present, at least
    /// [`MIN_DATA_POINTS`] points, equal lengths, finite values.
    pub fn validate(&self) -> Result<()> {
        let lengths = [
            ("close", self.close.len()),
            ("high", self.high.len()),
            ("low", self.low.len()),
            ("volume", self.volume.len()),
            ("timestamp", self.timestamp.len()),
        ];

        if let Some(&(field, _)) = lengths.iter().find(|(_, len)| *len == 0) {
            return Err(IndicatorError::MissingField { field });
        }

        let expected = self.close.len();
        if expected < MIN_DATA_POINTS {
            return Err(IndicatorError::insufficient(MIN_DATA_POINTS, expected));
        }

        if let Some(&(field, actual)) = lengths.iter().find(|(_, len)| *len != expected) {
            return Err(IndicatorError::LengthMismatch {
                field,
                actual,
                expected,
            });
        }

        for (field, values) in [
            ("close", &self.close),
            ("high", &self.high),
            ("low", &self.low),
            ("volume", &self.volume),
        ] {
            if let Some(index) = values.iter().position(|v| !v.is_finite()) {
                return Err(IndicatorError::invalid_input(format!(
                    "{field} contains non-finite value at index {index}"
                )));
            }
        }

        Ok(())
    }
}
