use std::collections::VecDeque;

use crate::market_data::bar::{Bar, MarketSeries};

// ---------------------------------------------------------------------------
// BarWindow -- bounded FIFO ring of the most recent bars for one stream
// ---------------------------------------------------------------------------

/// Ring buffer holding at most `capacity` bars, oldest first.
///
/// Mutated only by [`push`](Self::push) (append, evicting the oldest bar when
/// full) and [`seed`](Self::seed) / [`clear`](Self::clear).  Eviction is O(1).
#[derive(Debug, Clone)]
pub struct BarWindow {
    bars: VecDeque<Bar>,
    capacity: usize,
}

impl BarWindow {
    /// A zero capacity is bumped to 1 so the window can always hold the
    /// latest bar.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            bars: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Replace the contents with the last `capacity` bars of `history`.
    pub fn seed(&mut self, history: &[Bar]) {
        self.bars.clear();
        let start = history.len().saturating_sub(self.capacity);
        self.bars.extend(history[start..].iter().cloned());
    }

    /// Append `bar`, returning the evicted oldest bar when over capacity.
    pub fn push(&mut self, bar: Bar) -> Option<Bar> {
        self.bars.push_back(bar);
        if self.bars.len() > self.capacity {
            self.bars.pop_front()
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.bars.clear();
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bar> {
        self.bars.iter()
    }

    /// Snapshot the window as parallel series.
    pub fn to_series(&self) -> MarketSeries {
        MarketSeries::from_bars(self.iter())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
