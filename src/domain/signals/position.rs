//! Position strategy: moving-average crosses confirmed by a channel breakout.
//!
//! The Donchian channel includes the current bar, so a close can never exceed
//! the same bar's upper band. The breakout test uses the channel as of the
//! previous bar instead.

use crate::domain::config::FilterConfig;
use crate::domain::indicator::frame::IndicatorFrame;
use crate::domain::regime::Regime;
use crate::domain::signals::{floored_atr, Direction, Horizon, Signal, SignalGenerator};

const VOLUME_MULT: f64 = 1.3;
const TAKE_ATR: f64 = 4.2;
const TRAILING: f64 = 2.0;
const CONFIDENCE: f64 = 0.8;

pub struct PositionGenerator;

impl SignalGenerator for PositionGenerator {
    fn horizon(&self) -> Horizon {
        Horizon::Position
    }

    fn generate(
        &self,
        frame: &IndicatorFrame,
        regime: Regime,
        _filters: &FilterConfig,
    ) -> Vec<Signal> {
        let (Some(s), Some(prev)) = (frame.back(0), frame.back(1)) else {
            return Vec::new();
        };
        let close = s.close();
        let atr = floored_atr(s);
        let volume_ok = s.bar.volume >= VOLUME_MULT * s.volume_ma;

        let golden_cross = prev.sma_mid < prev.sma_long && s.sma_mid > s.sma_long;
        let death_cross = prev.sma_mid > prev.sma_long && s.sma_mid < s.sma_long;

        let mut signals = Vec::new();

        if regime == Regime::Bull && golden_cross && close > prev.donchian_high && volume_ok {
            signals.push(Signal {
                symbol: frame.symbol.clone(),
                regime,
                horizon: Horizon::Position,
                direction: Direction::Long,
                entry: close,
                stop: s.donchian_low,
                take: close + TAKE_ATR * atr,
                trailing_mult: TRAILING,
                confidence: CONFIDENCE,
                rationale: "golden cross, 20-day channel breakout, volume confirm, bull regime"
                    .to_string(),
            });
        }

        if regime == Regime::Bear && death_cross && close < prev.donchian_low && volume_ok {
            signals.push(Signal {
                symbol: frame.symbol.clone(),
                regime,
                horizon: Horizon::Position,
                direction: Direction::Short,
                entry: close,
                stop: s.donchian_high,
                take: close - TAKE_ATR * atr,
                trailing_mult: TRAILING,
                confidence: CONFIDENCE,
                rationale: "death cross, 20-day channel breakdown, volume confirm, bear regime"
                    .to_string(),
            });
        }

        signals
    }
}
