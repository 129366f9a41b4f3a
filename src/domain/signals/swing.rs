//! Swing strategy: short-horizon breakouts confirmed by EMA alignment, RSI and volume.

use crate::domain::config::FilterConfig;
use crate::domain::indicator::frame::IndicatorFrame;
use crate::domain::regime::Regime;
use crate::domain::signals::{
    floored_atr, not_on_limit, Direction, Horizon, Signal, SignalGenerator,
};

const LOOKBACK: usize = 3;
const VOLUME_MULT: f64 = 1.2;
const STOP_ATR: f64 = 1.5;
const TAKE_ATR: f64 = 2.5;
const TRAILING: f64 = 1.0;
const CONFIDENCE: f64 = 0.65;

pub struct SwingGenerator;

impl SignalGenerator for SwingGenerator {
    fn horizon(&self) -> Horizon {
        Horizon::Swing
    }

    fn generate(
        &self,
        frame: &IndicatorFrame,
        regime: Regime,
        filters: &FilterConfig,
    ) -> Vec<Signal> {
        if frame.len() < LOOKBACK + 1 {
            return Vec::new();
        }
        let Some(s) = frame.last() else {
            return Vec::new();
        };

        // the three bars before the latest one
        let prior = &frame.rows[frame.len() - 1 - LOOKBACK..frame.len() - 1];
        let prior_high = prior.iter().map(|r| r.bar.high).fold(f64::NEG_INFINITY, f64::max);
        let prior_low = prior.iter().map(|r| r.bar.low).fold(f64::INFINITY, f64::min);

        let close = s.close();
        let volume_ok = s.bar.volume >= VOLUME_MULT * s.volume_ma;
        let tradable = !filters.avoid_limit_up_down || not_on_limit(s, filters.limit_buffer_pct);
        let atr = floored_atr(s);

        let mut signals = Vec::new();

        let long = s.ema_fast > s.ema_slow && s.rsi > 45.0 && close > prior_high && volume_ok;
        if long && regime != Regime::Bear && tradable {
            signals.push(Signal {
                symbol: frame.symbol.clone(),
                regime,
                horizon: Horizon::Swing,
                direction: Direction::Long,
                entry: close,
                stop: close - STOP_ATR * atr,
                take: close + TAKE_ATR * atr,
                trailing_mult: TRAILING,
                confidence: CONFIDENCE,
                rationale: "fast EMA above slow EMA, RSI>45, 3-day breakout, volume confirm"
                    .to_string(),
            });
        }

        let short = s.ema_fast < s.ema_slow && s.rsi < 55.0 && close < prior_low && volume_ok;
        if short && regime != Regime::Bull && tradable {
            signals.push(Signal {
                symbol: frame.symbol.clone(),
                regime,
                horizon: Horizon::Swing,
                direction: Direction::Short,
                entry: close,
                stop: close + STOP_ATR * atr,
                take: close - TAKE_ATR * atr,
                trailing_mult: TRAILING,
                confidence: CONFIDENCE,
                rationale: "fast EMA below slow EMA, RSI<55, 3-day breakdown, volume confirm"
                    .to_string(),
            });
        }

        signals
    }
}
