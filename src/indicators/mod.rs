// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators used by the
// engine.  Every public calculation returns `Result<T>` so callers must
// handle insufficient history and malformed input explicitly; nothing here
// substitutes a default for a violated precondition.

pub mod atr;
pub mod bollinger;
pub mod macd;
pub mod moving_average;
pub mod rsi;
pub mod series;
pub mod stochastic;
pub mod volume;
