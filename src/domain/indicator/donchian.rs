//! Donchian channel: rolling highest high and lowest low over n bars,
//! inclusive of the current bar. Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_donchian(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let valid = period > 0 && i + 1 >= period;
            let (upper, lower) = if valid {
                bars[i + 1 - period..=i]
                    .iter()
                    .fold((f64::NEG_INFINITY, f64::INFINITY), |(hi, lo), b| {
                        (hi.max(b.high), lo.min(b.low))
                    })
            } else {
                (0.0, 0.0)
            };
            IndicatorPoint {
                date: bar.date,
                valid,
                value: IndicatorValue::Channel { upper, lower },
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Donchian(period),
        values,
    }
}
