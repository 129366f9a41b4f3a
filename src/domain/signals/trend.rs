//! Trend strategy: stacked moving averages with MACD and ADX confirmation.

use crate::domain::config::FilterConfig;
use crate::domain::indicator::frame::IndicatorFrame;
use crate::domain::regime::Regime;
use crate::domain::signals::{floored_atr, Direction, Horizon, Signal, SignalGenerator};

const MIN_ADX: f64 = 20.0;
const STOP_ATR: f64 = 1.2;
const TAKE_ATR: f64 = 3.2;
const TRAILING: f64 = 1.5;
const CONFIDENCE: f64 = 0.7;

pub struct TrendGenerator;

impl SignalGenerator for TrendGenerator {
    fn horizon(&self) -> Horizon {
        Horizon::Trend
    }

    fn generate(
        &self,
        frame: &IndicatorFrame,
        regime: Regime,
        _filters: &FilterConfig,
    ) -> Vec<Signal> {
        let Some(s) = frame.last() else {
            return Vec::new();
        };
        let close = s.close();
        let atr = floored_atr(s);
        let strong = s.adx > MIN_ADX;

        let mut signals = Vec::new();

        let long = close > s.sma_mid
            && s.sma_mid > s.sma_long
            && s.macd > s.macd_signal
            && s.macd > 0.0
            && strong;
        if long && regime != Regime::Bear {
            signals.push(Signal {
                symbol: frame.symbol.clone(),
                regime,
                horizon: Horizon::Trend,
                direction: Direction::Long,
                entry: close,
                stop: s.sma_mid - STOP_ATR * atr,
                take: close + TAKE_ATR * atr,
                trailing_mult: TRAILING,
                confidence: CONFIDENCE,
                rationale: "close>SMA50>SMA200, MACD above signal and positive, ADX>20".to_string(),
            });
        }

        let short = close < s.sma_mid
            && s.sma_mid < s.sma_long
            && s.macd < s.macd_signal
            && s.macd < 0.0
            && strong;
        if short && regime != Regime::Bull {
            signals.push(Signal {
                symbol: frame.symbol.clone(),
                regime,
                horizon: Horizon::Trend,
                direction: Direction::Short,
                entry: close,
                stop: s.sma_mid + STOP_ATR * atr,
                take: close - TAKE_ATR * atr,
                trailing_mult: TRAILING,
                confidence: CONFIDENCE,
                rationale: "close<SMA50<SMA200, MACD below signal and negative, ADX>20".to_string(),
            });
        }

        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::frame::IndicatorRow;
    use crate::domain::signals::test_support::{flat_row, frame};

    fn uptrend() -> IndicatorRow {
        let mut row = flat_row(10);
        row.bar.close = 120.0;
        row.bar.high = 122.0;
        row.bar.low = 118.0;
        row.sma_mid = 110.0;
        row.sma_long = 100.0;
        row.macd = 1.5;
        row.macd_signal = 1.0;
        row.adx = 28.0;
        row
    }

    fn downtrend() -> IndicatorRow {
        let mut row = flat_row(10);
        row.bar.close = 80.0;
        row.bar.high = 82.0;
        row.bar.low = 78.0;
        row.sma_mid = 90.0;
        row.sma_long = 100.0;
        row.macd = -1.5;
        row.macd_signal = -1.0;
        row.adx = 28.0;
        row
    }

    #[test]
    fn uptrend_emits_long_with_sma_based_stop() {
        let signals =
            TrendGenerator.generate(&frame(vec![uptrend()]), Regime::Bull, &FilterConfig::default());
        assert_eq!(signals.len(), 1);
        let s = &signals[0];
        assert_eq!(s.direction, Direction::Long);
        assert!((s.stop - (110.0 - 2.4)).abs() < 1e-12);
        assert!((s.take - (120.0 + 6.4)).abs() < 1e-12);
        assert!((s.trailing_mult - 1.5).abs() < f64::EPSILON);
        assert!((s.confidence - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn weak_adx_blocks_entry() {
        let mut row = uptrend();
        row.adx = 20.0;
        let signals =
            TrendGenerator.generate(&frame(vec![row]), Regime::Bull, &FilterConfig::default());
        assert!(signals.is_empty());
    }

    #[test]
    fn negative_macd_blocks_long() {
        let mut row = uptrend();
        row.macd = -0.5;
        row.macd_signal = -1.0;
        let signals =
            TrendGenerator.generate(&frame(vec![row]), Regime::Bull, &FilterConfig::default());
        assert!(signals.is_empty());
    }

    #[test]
    fn downtrend_emits_short_outside_bull() {
        let signals = TrendGenerator.generate(
            &frame(vec![downtrend()]),
            Regime::Neutral,
            &FilterConfig::default(),
        );
        assert_eq!(signals.len(), 1);
        let s = &signals[0];
        assert_eq!(s.direction, Direction::Short);
        assert!((s.stop - (90.0 + 2.4)).abs() < 1e-12);
        assert!((s.take - (80.0 - 6.4)).abs() < 1e-12);

        let in_bull =
            TrendGenerator.generate(&frame(vec![downtrend()]), Regime::Bull, &FilterConfig::default());
        assert!(in_bull.is_empty());
    }

    #[test]
    fn zero_atr_is_floored() {
        let mut row = uptrend();
        row.atr = 0.0;
        let signals =
            TrendGenerator.generate(&frame(vec![row]), Regime::Bull, &FilterConfig::default());
        assert!(signals[0].take > 120.0);
    }
}
