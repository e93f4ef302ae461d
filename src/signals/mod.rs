// =============================================================================
// Signals Module
// =============================================================================
//
// Turns the latest indicator readings into one directional view:
// weighted bullish / bearish votes, a strength grade and human-readable
// alerts.

pub mod aggregate;

pub use aggregate::{aggregate, SignalInputs, SignalSummary, SignalTally};
