pub mod bar;
pub mod bar_window;

// Re-export the core data types for convenient access (e.g. `use crate::market_data::Bar`).
pub use bar::{Bar, MarketSeries, Ohlc, SeriesKey, MIN_DATA_POINTS};
pub use bar_window::BarWindow;
