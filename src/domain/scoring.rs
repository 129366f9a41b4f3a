//! Cross-sectional attractiveness score of a symbol's latest bar.

use crate::domain::config::{AnalysisConfig, LiquidityConfig};
use crate::domain::indicator::frame::{IndicatorFrame, IndicatorRow};
use crate::domain::regime::Regime;
use crate::domain::signals::EPSILON;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Long,
    Short,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub symbol: String,
    pub regime: Regime,
    pub value: f64,
}

/// Individual factors before weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreComponents {
    pub momentum: f64,
    pub trend: f64,
    pub breakout: f64,
    pub risk: f64,
    pub illiquidity: f64,
}

pub fn illiquidity_penalty(row: &IndicatorRow, liquidity: &LiquidityConfig) -> f64 {
    if row.bar.value_traded() < liquidity.min_value_traded {
        liquidity.penalty_factor
    } else {
        0.0
    }
}

pub fn score_components(
    row: &IndicatorRow,
    orientation: Orientation,
    liquidity: &LiquidityConfig,
) -> ScoreComponents {
    let atr = row.atr.max(EPSILON);
    let close = row.close();
    let breakout = match orientation {
        Orientation::Long => (close - row.bb_upper) / atr,
        Orientation::Short => (row.bb_lower - close) / atr,
    };
    ScoreComponents {
        momentum: row.roc / atr,
        trend: (close - row.sma_long) / row.sma_long.max(EPSILON) + row.trend_angle,
        breakout,
        risk: atr / close.max(EPSILON),
        illiquidity: illiquidity_penalty(row, liquidity),
    }
}

/// Weighted score of the latest row; `None` for an empty frame.
pub fn score_asset(
    frame: &IndicatorFrame,
    regime: Regime,
    orientation: Orientation,
    config: &AnalysisConfig,
) -> Option<Score> {
    let row = frame.last()?;
    let w = config.weights.for_regime(regime);
    let c = score_components(row, orientation, &config.liquidity);
    let value = w.wm * c.momentum + w.wt * c.trend + w.wb * c.breakout
        - w.wr * c.risk
        - w.wl * c.illiquidity;
    Some(Score {
        symbol: frame.symbol.clone(),
        regime,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signals::test_support::{flat_row, frame};
    use approx::assert_relative_eq;

    fn scored_row() -> IndicatorRow {
        let mut row = flat_row(1);
        row.bar.close = 110.0;
        row.bar.volume = 2.0e7;
        row.roc = 0.05;
        row.atr = 2.0;
        row.sma_long = 100.0;
        row.trend_angle = 0.01;
        row.bb_upper = 108.0;
        row.bb_lower = 92.0;
        row
    }

    #[test]
    fn components_follow_definitions() {
        let c = score_components(&scored_row(), Orientation::Long, &LiquidityConfig::default());
        assert_relative_eq!(c.momentum, 0.025);
        assert_relative_eq!(c.trend, 0.11);
        assert_relative_eq!(c.breakout, 1.0);
        assert_relative_eq!(c.risk, 2.0 / 110.0);
        assert_relative_eq!(c.illiquidity, 0.0);

        let short = score_components(&scored_row(), Orientation::Short, &LiquidityConfig::default());
        assert_relative_eq!(short.breakout, (92.0 - 110.0) / 2.0);
    }

    #[test]
    fn thin_trading_is_penalised() {
        let mut row = scored_row();
        row.bar.volume = 1000.0;
        let c = score_components(&row, Orientation::Long, &LiquidityConfig::default());
        assert_relative_eq!(c.illiquidity, 0.5);
    }

    #[test]
    fn score_uses_regime_weights() {
        let config = AnalysisConfig::default();
        let f = frame(vec![scored_row()]);
        let bull = score_asset(&f, Regime::Bull, Orientation::Long, &config).unwrap();
        let expected = 0.30 * 0.025 + 0.35 * 0.11 + 0.25 * 1.0 - 0.07 * (2.0 / 110.0);
        assert_relative_eq!(bull.value, expected, epsilon = 1e-12);
        assert_eq!(bull.regime, Regime::Bull);

        let bear = score_asset(&f, Regime::Bear, Orientation::Long, &config).unwrap();
        assert!(bear.value < bull.value);
    }

    #[test]
    fn empty_frame_has_no_score() {
        let config = AnalysisConfig::default();
        assert!(score_asset(&frame(vec![]), Regime::Bull, Orientation::Long, &config).is_none());
    }
}
