//! Trade signals and the strategies that emit them.
//!
//! Each generator looks at the latest bar of an indicator frame only and emits
//! zero or more immutable [`Signal`] records. Generators are stateless and
//! independent; [`default_generators`] fixes their evaluation order.

pub mod position;
pub mod swing;
pub mod trend;

use crate::domain::config::FilterConfig;
use crate::domain::indicator::frame::{IndicatorFrame, IndicatorRow};
use crate::domain::regime::Regime;
use std::fmt;

/// Floor applied to every divisor and to ATR.
pub const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Horizon {
    Swing,
    Trend,
    Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Long,
    Short,
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Horizon::Swing => "SWING",
            Horizon::Trend => "TREND",
            Horizon::Position => "POSITION",
        })
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub symbol: String,
    pub regime: Regime,
    pub horizon: Horizon,
    pub direction: Direction,
    pub entry: f64,
    pub stop: f64,
    pub take: f64,
    pub trailing_mult: f64,
    pub confidence: f64,
    pub rationale: String,
}

pub trait SignalGenerator {
    fn horizon(&self) -> Horizon;

    fn generate(
        &self,
        frame: &IndicatorFrame,
        regime: Regime,
        filters: &FilterConfig,
    ) -> Vec<Signal>;
}

/// Swing, trend, position: the order signals appear in per symbol.
pub fn default_generators() -> Vec<Box<dyn SignalGenerator>> {
    vec![
        Box::new(swing::SwingGenerator),
        Box::new(trend::TrendGenerator),
        Box::new(position::PositionGenerator),
    ]
}

pub fn run_generators(
    generators: &[Box<dyn SignalGenerator>],
    frame: &IndicatorFrame,
    regime: Regime,
    filters: &FilterConfig,
) -> Vec<Signal> {
    generators
        .iter()
        .flat_map(|g| g.generate(frame, regime, filters))
        .collect()
}

pub(crate) fn floored_atr(row: &IndicatorRow) -> f64 {
    row.atr.max(EPSILON)
}

/// False when the close sits within `buffer_pct` percent of the day's high or
/// low, which is taken as a proxy for a bar pinned at the price-limit band.
pub fn not_on_limit(row: &IndicatorRow, buffer_pct: f64) -> bool {
    let bar = &row.bar;
    let base = bar.close.max(EPSILON);
    let near_limit_up = (bar.high - bar.close) / base * 100.0 < buffer_pct;
    let near_limit_down = (bar.close - bar.low) / base * 100.0 < buffer_pct;
    !near_limit_up && !near_limit_down
}
