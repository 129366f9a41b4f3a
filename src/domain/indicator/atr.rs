//! Average True Range with exponential smoothing.
//!
//! TR[0] = high - low, TR[i] = max(high-low, |high-prev_close|, |low-prev_close|).
//! ATR[0] = TR[0], ATR[i] = α·TR[i] + (1-α)·ATR[i-1] with α = 1/n.
//! No warmup: every bar carries a value.

use crate::domain::indicator::{simple_series, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn true_ranges(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect()
}

pub fn calculate_atr(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return simple_series(bars, IndicatorType::Atr(period), vec![None; bars.len()]);
    }

    let alpha = 1.0 / period as f64;
    let mut atr = 0.0;
    let raw = true_ranges(bars)
        .into_iter()
        .enumerate()
        .map(|(i, tr)| {
            atr = if i == 0 { tr } else { alpha * tr + (1.0 - alpha) * atr };
            Some(atr)
        })
        .collect();

    simple_series(bars, IndicatorType::Atr(period), raw)
}
