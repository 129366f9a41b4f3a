//! Simple Moving Average and derived slope indicators.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) bars are invalid.
//! The trend angle is the percentage change of SMA(n) over `lag` bars.

use crate::domain::indicator::{simple_series, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

/// Rolling mean over `period` values; `None` until the window is full.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }
    let mut sum = 0.0;
    for i in 0..values.len() {
        sum += values[i];
        if i >= period {
            sum -= values[i - period];
        }
        if i + 1 >= period {
            out[i] = Some(sum / period as f64);
        }
    }
    out
}

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    simple_series(bars, IndicatorType::Sma(period), rolling_mean(&closes, period))
}

pub fn calculate_volume_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
    simple_series(
        bars,
        IndicatorType::VolumeSma(period),
        rolling_mean(&volumes, period),
    )
}

/// (SMA[i] - SMA[i-lag]) / SMA[i-lag]
pub fn calculate_trend_angle(bars: &[OhlcvBar], period: usize, lag: usize) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let sma = rolling_mean(&closes, period);

    let raw = (0..bars.len())
        .map(|i| {
            if i < lag {
                return None;
            }
            match (sma[i], sma[i - lag]) {
                (Some(now), Some(then)) if then != 0.0 => Some((now - then) / then),
                _ => None,
            }
        })
        .collect();

    simple_series(bars, IndicatorType::TrendAngle { period, lag }, raw)
}
