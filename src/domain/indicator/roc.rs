//! ROC (Rate of Change) indicator implementation.
//!
//! ROC(n)[i] = (C[i] - C[i-n]) / C[i-n], expressed as a fraction.
//! Undefined when C[i-n] == 0.
//! Warmup: first n bars invalid.

use crate::domain::indicator::{simple_series, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_roc(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let raw = (0..bars.len())
        .map(|i| {
            if period == 0 || i < period {
                return None;
            }
            let prev_close = bars[i - period].close;
            if prev_close == 0.0 {
                None
            } else {
                Some((bars[i].close - prev_close) / prev_close)
            }
        })
        .collect();

    simple_series(bars, IndicatorType::Roc(period), raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_bars;

    #[test]
    fn roc_warmup() {
        let series = calculate_roc(&make_bars(&[100.0, 105.0, 110.0, 115.0]), 2);
        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
    }

    #[test]
    fn roc_is_fractional() {
        let series = calculate_roc(&make_bars(&[100.0, 105.0, 110.0]), 2);
        assert!((series.simple_at(2).unwrap() - 0.10).abs() < 1e-12);
    }

    #[test]
    fn roc_negative() {
        let series = calculate_roc(&make_bars(&[100.0, 90.0]), 1);
        assert!((series.simple_at(1).unwrap() + 0.10).abs() < 1e-12);
    }

    #[test]
    fn roc_zero_base_is_invalid() {
        let series = calculate_roc(&make_bars(&[0.0, 5.0]), 1);
        assert_eq!(series.simple_at(1), None);
    }

    #[test]
    fn roc_indicator_type() {
        let series = calculate_roc(&make_bars(&[1.0]), 10);
        assert_eq!(series.indicator_type, IndicatorType::Roc(10));
    }
}
