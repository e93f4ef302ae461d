// =============================================================================
// Full indicator evaluation over one market series
// =============================================================================
//
// Base validation failures are fatal.  Past that point an indicator that
// reports `InsufficientData` is left out of the result; any other error
// still propagates.

use tracing::debug;

use crate::engine::result::{
    AtrReading, BollingerReading, ComputedResult, IndicatorSet, MacdReading, MomentumIndicators,
    ObvReading, RsiReading, StochasticReading, TrendIndicators, VolatilityIndicators,
    VolumeIndicators,
};
use crate::error::{IndicatorError, Result};
use crate::indicators::atr::{atr_pct, calculate_atr, volatility_level};
use crate::indicators::bollinger::{band_position, band_width, calculate_bollinger};
use crate::indicators::macd::{calculate_macd, detect_crossover, interpret};
use crate::indicators::moving_average::{ema_bundle, sma_bundle, stack_alignment, AverageBundle};
use crate::indicators::rsi::{calculate_rsi, rsi_signal};
use crate::indicators::stochastic::{calculate_stochastic, stochastic_signal};
use crate::indicators::volume::{
    analyze_volume, calculate_obv, detect_volume_spikes, volume_confirmation, volume_ma,
    volume_trend,
};
use crate::market_data::{MarketSeries, Ohlc};
use crate::runtime_config::IndicatorConfig;
use crate::signals::{aggregate, SignalInputs};

/// Maximum OBV points inspected for the volume trend.
const OBV_TREND_LOOKBACK: usize = 10;

/// Evaluate every indicator family over `series` with `config`.
pub fn calculate(series: &MarketSeries, config: &IndicatorConfig) -> Result<ComputedResult> {
    series.validate()?;

    let timestamp = series
        .timestamp
        .last()
        .copied()
        .ok_or(IndicatorError::MissingField { field: "timestamp" })?;
    let last_close = last_of(&series.close, "close")?;
    let last_volume = last_of(&series.volume, "volume")?;
    let ohlc = series.ohlc();

    let indicators = IndicatorSet {
        momentum: momentum(series, &ohlc, config)?,
        trend: trend(series, config)?,
        volatility: volatility(series, &ohlc, last_close, config)?,
        volume: volume(series, last_volume, config)?,
    };
    let signals = aggregate(&SignalInputs::from(&indicators));

    Ok(ComputedResult {
        timestamp,
        data_points: series.len(),
        indicators,
        signals,
    })
}

fn last_of(values: &[f64], field: &'static str) -> Result<f64> {
    values
        .last()
        .copied()
        .ok_or(IndicatorError::MissingField { field })
}

/// Turn a short-history failure into an omitted indicator.
fn optional<T>(indicator: &'static str, outcome: Result<T>) -> Result<Option<T>> {
    match outcome {
        Ok(value) => Ok(Some(value)),
        Err(IndicatorError::InsufficientData { required, actual }) => {
            debug!(indicator, required, actual, "indicator omitted: insufficient data");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// A bundle with no period available is omitted entirely.
fn available(indicator: &'static str, bundle: AverageBundle) -> Option<AverageBundle> {
    if bundle.values().any(Option::is_some) {
        Some(bundle)
    } else {
        debug!(indicator, "bundle omitted: no period fits the series");
        None
    }
}

fn momentum(series: &MarketSeries, ohlc: &[Ohlc], config: &IndicatorConfig) -> Result<MomentumIndicators> {
    let rsi = optional("rsi", calculate_rsi(&series.close, config.rsi.period))?
        .and_then(|values| values.last().copied())
        .map(|value| RsiReading {
            value,
            signal: rsi_signal(value, config.rsi.thresholds()),
        });

    let params = &config.stochastic;
    let stochastic = optional(
        "stochastic",
        calculate_stochastic(ohlc, params.k_period, params.d_period),
    )?
    .and_then(|points| points.last().copied())
    .map(|point| StochasticReading {
        k: point.k,
        d: point.d,
        signal: stochastic_signal(point.k, point.d, params.thresholds()),
    });

    Ok(MomentumIndicators { rsi, stochastic })
}

fn trend(series: &MarketSeries, config: &IndicatorConfig) -> Result<TrendIndicators> {
    let sma = available("sma", sma_bundle(&series.close, &config.sma)?);
    let ema = available("ema", ema_bundle(&series.close, &config.ema)?);
    let ema_alignment = ema.as_ref().and_then(stack_alignment);

    let params = &config.macd;
    let macd = optional(
        "macd",
        calculate_macd(&series.close, params.fast, params.slow, params.signal),
    )?
    .and_then(|points| {
        let current = *points.last()?;
        let reading = interpret(&current);
        Some(MacdReading {
            value: current.macd,
            signal: current.signal,
            histogram: current.histogram,
            crossover: detect_crossover(&points),
            trend: reading.trend,
            strength: reading.strength,
            momentum: reading.momentum,
        })
    });

    Ok(TrendIndicators {
        sma,
        ema,
        ema_alignment,
        macd,
    })
}

fn volatility(
    series: &MarketSeries,
    ohlc: &[Ohlc],
    last_close: f64,
    config: &IndicatorConfig,
) -> Result<VolatilityIndicators> {
    let params = &config.bollinger;
    let bollinger_bands = optional(
        "bollinger",
        calculate_bollinger(&series.close, params.period, params.std_dev),
    )?
    .and_then(|bands| bands.last().copied())
    .map(|bands| BollingerReading {
        upper: bands.upper,
        middle: bands.middle,
        lower: bands.lower,
        position: band_position(last_close, &bands),
        width: band_width(&bands),
    });

    let atr = optional("atr", calculate_atr(ohlc, config.atr.period))?.and_then(|values| {
        let current = *values.last()?;
        Some(AtrReading {
            value: current,
            percent: atr_pct(current, last_close),
            level: volatility_level(current, &values),
        })
    });

    Ok(VolatilityIndicators { bollinger_bands, atr })
}

fn volume(series: &MarketSeries, current: f64, config: &IndicatorConfig) -> Result<VolumeIndicators> {
    let averages = available("volume_ma", volume_ma(&series.volume, &config.volume_ma)?);

    // The first configured period is the reference average.
    let reference = averages.as_ref().and_then(|bundle| {
        let period = config.volume_ma.first()?;
        bundle.get(period).copied().flatten()
    });

    let analysis = reference.map(|average| analyze_volume(current, average));

    let price_volume_confirmation = match (reference, series.close.as_slice()) {
        (Some(average), [.., previous, latest]) => {
            Some(volume_confirmation(*latest, *previous, current, average))
        }
        _ => None,
    };

    let obv = optional("obv", calculate_obv(&series.close, &series.volume))?.and_then(|values| {
        let value = *values.last()?;
        Some(ObvReading {
            value,
            trend: volume_trend(&values, values.len().min(OBV_TREND_LOOKBACK)),
        })
    });

    let latest_index = series.volume.len().saturating_sub(1);
    let latest_spike = detect_volume_spikes(&series.volume, config.spike_threshold)
        .last()
        .is_some_and(|&i| i == latest_index);

    Ok(VolumeIndicators {
        current,
        averages,
        analysis,
        obv,
        price_volume_confirmation,
        latest_spike,
    })
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::Bar;
    use crate::types::{BandPosition, Crossover, Direction, TrendBias, VolumeLevel, Zone};
    use chrono::{Duration, TimeZone, Utc};

    /// Gently oscillating series with a steady volume.
    fn wave_bars(n: usize) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 2, 5, 9, 30, 0).unwrap();
        (0..n)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.05;
                Bar {
                    timestamp: start + Duration::minutes(5 * i as i64),
                    open: close - 0.2,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000.0 + (i % 7) as f64 * 50.0,
                }
            })
            .collect()
    }

    #[test]
    fn short_series_is_fatal() {
        let series = MarketSeries::from_bars(&wave_bars(30));
        let err = calculate(&series, &IndicatorConfig::default()).unwrap_err();
        assert_eq!(err, IndicatorError::InsufficientData { required: 50, actual: 30 });
    }

    #[test]
    fn sixty_bars_omits_only_long_periods() {
        let series = MarketSeries::from_bars(&wave_bars(60));
        let result = calculate(&series, &IndicatorConfig::default()).unwrap();

        assert_eq!(result.data_points, 60);
        assert_eq!(result.timestamp, *series.timestamp.last().unwrap());

        let ind = &result.indicators;
        assert!(ind.momentum.rsi.is_some());
        assert!(ind.momentum.stochastic.is_some());
        assert!(ind.trend.macd.is_some());
        assert!(ind.volatility.bollinger_bands.is_some());
        assert!(ind.volatility.atr.is_some());
        assert!(ind.volume.obv.is_some());

        let sma = ind.trend.sma.as_ref().unwrap();
        assert!(sma[&20].is_some());
        assert!(sma[&50].is_some());
        assert_eq!(sma[&200], None);
        assert!(ind.volume.analysis.is_some());
        assert!(ind.volume.price_volume_confirmation.is_some());
    }

    #[test]
    fn long_indicator_periods_are_omitted_not_fatal() {
        let series = MarketSeries::from_bars(&wave_bars(55));
        let mut config = IndicatorConfig::default();
        config.macd.slow = 50;
        config.macd.signal = 9;
        config.bollinger.period = 80;
        config.sma = vec![100, 200];

        let result = calculate(&series, &config).unwrap();
        assert!(result.indicators.trend.macd.is_none());
        assert!(result.indicators.volatility.bollinger_bands.is_none());
        assert!(result.indicators.trend.sma.is_none());
        assert!(result.indicators.momentum.rsi.is_some());
    }

    #[test]
    fn zero_period_propagates() {
        let series = MarketSeries::from_bars(&wave_bars(60));
        let mut config = IndicatorConfig::default();
        config.rsi.period = 0;
        assert!(matches!(
            calculate(&series, &config).unwrap_err(),
            IndicatorError::InvalidInput { .. }
        ));
    }

    #[test]
    fn signal_counts_match_readings() {
        let series = MarketSeries::from_bars(&wave_bars(120));
        let result = calculate(&series, &IndicatorConfig::default()).unwrap();
        let ind = &result.indicators;

        let mut bullish = 0;
        let mut bearish = 0;
        match ind.momentum.rsi.map(|r| r.signal) {
            Some(Zone::Overbought) => bearish += 1,
            Some(Zone::Oversold) => bullish += 1,
            _ => {}
        }
        match ind.momentum.stochastic.map(|s| s.signal) {
            Some(Zone::Overbought) => bearish += 1,
            Some(Zone::Oversold) => bullish += 1,
            _ => {}
        }
        let macd = ind.trend.macd.unwrap();
        let weight = if macd.crossover == Crossover::None { 1 } else { 2 };
        let macd_bullish = match macd.crossover {
            Crossover::Bullish => true,
            Crossover::Bearish => false,
            Crossover::None => macd.trend == TrendBias::Bullish,
        };
        if macd_bullish {
            bullish += weight;
        } else {
            bearish += weight;
        }
        match ind.volatility.bollinger_bands.map(|b| b.position) {
            Some(BandPosition::AboveUpper) => bearish += 1,
            Some(BandPosition::BelowLower) => bullish += 1,
            _ => {}
        }

        assert_eq!(result.signals.bullish_signals, bullish);
        assert_eq!(result.signals.bearish_signals, bearish);
        let expected = if bullish > bearish + 1 {
            Direction::Bullish
        } else if bearish > bullish + 1 {
            Direction::Bearish
        } else {
            Direction::Neutral
        };
        assert_eq!(result.signals.overall, expected);
    }

    #[test]
    fn volume_spike_on_last_bar() {
        let mut bars = wave_bars(60);
        if let Some(last) = bars.last_mut() {
            last.volume = 10_000.0;
        }
        let series = MarketSeries::from_bars(&bars);
        let result = calculate(&series, &IndicatorConfig::default()).unwrap();
        assert!(result.indicators.volume.latest_spike);
        assert_eq!(result.indicators.volume.current, 10_000.0);
        assert_eq!(
            result.indicators.volume.analysis.map(|a| a.level),
            Some(VolumeLevel::ExtremelyHigh)
        );
        assert!(result
            .signals
            .alerts
            .contains(&"Extremely high volume detected".to_string()));
    }
}
