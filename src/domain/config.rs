//! Explicit configuration values for the analytical core.
//!
//! Every tunable lives here and is injected at call time; defaults mirror the
//! reference deployment.

use crate::domain::indicator::frame::IndicatorParams;
use crate::domain::regime::Regime;

/// Reserved key of the market-wide index series.
pub const MARKET_INDEX_KEY: &str = "TEDPIX";
/// Reserved key of the equal-weight index series.
pub const EQUAL_WEIGHT_INDEX_KEY: &str = "EQUAL";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    /// momentum
    pub wm: f64,
    /// trend
    pub wt: f64,
    /// breakout
    pub wb: f64,
    /// risk
    pub wr: f64,
    /// illiquidity
    pub wl: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeWeights {
    pub bull: ScoreWeights,
    pub bear: ScoreWeights,
    pub neutral: ScoreWeights,
}

impl RegimeWeights {
    pub fn for_regime(&self, regime: Regime) -> &ScoreWeights {
        match regime {
            Regime::Bull => &self.bull,
            Regime::Bear => &self.bear,
            Regime::Neutral => &self.neutral,
        }
    }
}

impl Default for RegimeWeights {
    fn default() -> Self {
        Self {
            bull: ScoreWeights {
                wm: 0.30,
                wt: 0.35,
                wb: 0.25,
                wr: 0.07,
                wl: 0.03,
            },
            bear: ScoreWeights {
                wm: 0.20,
                wt: 0.25,
                wb: 0.15,
                wr: 0.30,
                wl: 0.10,
            },
            neutral: ScoreWeights {
                wm: 0.25,
                wt: 0.30,
                wb: 0.20,
                wr: 0.20,
                wl: 0.05,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiquidityConfig {
    pub min_value_traded: f64,
    pub penalty_factor: f64,
}

impl Default for LiquidityConfig {
    fn default() -> Self {
        Self {
            min_value_traded: 1.5e9,
            penalty_factor: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    pub avoid_limit_up_down: bool,
    /// Distance from the daily price-limit band, in percent, inside which entries are refused.
    pub limit_buffer_pct: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            avoid_limit_up_down: true,
            limit_buffer_pct: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub weights: RegimeWeights,
    pub min_history_days: usize,
    pub top_n: usize,
    pub liquidity: LiquidityConfig,
    pub filters: FilterConfig,
    pub indicators: IndicatorParams,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            weights: RegimeWeights::default(),
            min_history_days: 260,
            top_n: 20,
            liquidity: LiquidityConfig::default(),
            filters: FilterConfig::default(),
            indicators: IndicatorParams::default(),
        }
    }
}
