// =============================================================================
// Signal Aggregation - weighted bullish / bearish vote tally
// =============================================================================
//
// Each indicator reading casts a weighted vote for one side:
//
//   RSI / Stochastic extreme ........ 1
//   MACD crossover .................. 2
//   MACD trend bias (no crossover) .. 1
//   Bollinger outer band breach ..... 1
//
// Alerts are pushed for RSI extremes, MACD crossovers, Bollinger breaches and
// extremely high volume.  Volume never votes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{BandPosition, Crossover, Direction, SignalStrength, TrendBias, VolumeLevel, Zone};

/// Minimum number of votes before strength can rise above weak.
const MIN_VOTES_FOR_STRENGTH: u32 = 5;
const STRONG_SHARE: f64 = 0.7;
const MODERATE_SHARE: f64 = 0.6;

/// The subset of indicator readings that feed the vote.  A `None` field
/// means the indicator was omitted for lack of data.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignalInputs {
    pub rsi: Option<Zone>,
    pub stochastic: Option<Zone>,
    pub macd: Option<(Crossover, TrendBias)>,
    pub band_position: Option<BandPosition>,
    pub volume_level: Option<VolumeLevel>,
}

/// One weighted vote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vote {
    pub source: &'static str,
    pub direction: Direction,
    pub weight: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalSummary {
    pub overall: Direction,
    pub strength: SignalStrength,
    pub alerts: Vec<String>,
    pub bullish_signals: u32,
    pub bearish_signals: u32,
}

/// Collects votes and alerts, then settles them into a [`SignalSummary`].
#[derive(Debug, Default)]
pub struct SignalTally {
    votes: Vec<Vote>,
    alerts: Vec<String>,
}

impl SignalTally {
    pub fn vote(&mut self, source: &'static str, direction: Direction, weight: u32) {
        self.votes.push(Vote {
            source,
            direction,
            weight,
        });
    }

    pub fn alert(&mut self, message: impl Into<String>) {
        self.alerts.push(message.into());
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    fn total(&self, direction: Direction) -> u32 {
        self.votes
            .iter()
            .filter(|v| v.direction == direction)
            .map(|v| v.weight)
            .sum()
    }

    pub fn finish(self) -> SignalSummary {
        let bullish = self.total(Direction::Bullish);
        let bearish = self.total(Direction::Bearish);

        let overall = if bullish > bearish + 1 {
            Direction::Bullish
        } else if bearish > bullish + 1 {
            Direction::Bearish
        } else {
            Direction::Neutral
        };

        SignalSummary {
            overall,
            strength: strength(bullish, bearish),
            alerts: self.alerts,
            bullish_signals: bullish,
            bearish_signals: bearish,
        }
    }
}

/// Share of the dominant side, once enough votes are in.
pub fn strength(bullish: u32, bearish: u32) -> SignalStrength {
    let total = bullish + bearish;
    if total < MIN_VOTES_FOR_STRENGTH {
        return SignalStrength::Weak;
    }
    let dominant = f64::from(bullish.max(bearish));
    let total = f64::from(total);
    if dominant >= total * STRONG_SHARE {
        SignalStrength::Strong
    } else if dominant >= total * MODERATE_SHARE {
        SignalStrength::Moderate
    } else {
        SignalStrength::Weak
    }
}

pub fn aggregate(inputs: &SignalInputs) -> SignalSummary {
    let mut tally = SignalTally::default();

    match inputs.rsi {
        Some(Zone::Overbought) => {
            tally.alert("RSI approaching overbought territory");
            tally.vote("rsi", Direction::Bearish, 1);
        }
        Some(Zone::Oversold) => {
            tally.alert("RSI in oversold territory");
            tally.vote("rsi", Direction::Bullish, 1);
        }
        _ => {}
    }

    match inputs.stochastic {
        Some(Zone::Overbought) => tally.vote("stochastic", Direction::Bearish, 1),
        Some(Zone::Oversold) => tally.vote("stochastic", Direction::Bullish, 1),
        _ => {}
    }

    match inputs.macd {
        Some((Crossover::Bullish, _)) => {
            tally.alert("MACD bullish crossover detected");
            tally.vote("macd_crossover", Direction::Bullish, 2);
        }
        Some((Crossover::Bearish, _)) => {
            tally.alert("MACD bearish crossover detected");
            tally.vote("macd_crossover", Direction::Bearish, 2);
        }
        Some((Crossover::None, TrendBias::Bullish)) => tally.vote("macd_trend", Direction::Bullish, 1),
        Some((Crossover::None, TrendBias::Bearish)) => tally.vote("macd_trend", Direction::Bearish, 1),
        None => {}
    }

    match inputs.band_position {
        Some(BandPosition::AboveUpper) => {
            tally.alert("Price above upper Bollinger Band");
            tally.vote("bollinger", Direction::Bearish, 1);
        }
        Some(BandPosition::BelowLower) => {
            tally.alert("Price below lower Bollinger Band");
            tally.vote("bollinger", Direction::Bullish, 1);
        }
        _ => {}
    }

    if inputs.volume_level == Some(VolumeLevel::ExtremelyHigh) {
        tally.alert("Extremely high volume detected");
    }

    let sources: Vec<&str> = tally.votes().iter().map(|v| v.source).collect();
    debug!(?sources, alerts = tally.alerts.len(), "signal votes tallied");
    tally.finish()
}
