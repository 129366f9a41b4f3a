//! Market-regime classification of the most recent bar.

use crate::domain::indicator::frame::{IndicatorFrame, IndicatorRow};
use std::fmt;

/// Window of the index moving average the regime is judged against.
pub const INDEX_SMA_WINDOW: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Regime {
    Bull,
    Bear,
    Neutral,
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Regime::Bull => "BULL",
            Regime::Bear => "BEAR",
            Regime::Neutral => "NEUTRAL",
        };
        f.write_str(label)
    }
}

/// Position of an index's latest close relative to its own 100-day SMA.
/// `None` when the frame is too short to carry the average.
fn index_trend(frame: &IndicatorFrame) -> Option<std::cmp::Ordering> {
    let sma = frame.close_sma(INDEX_SMA_WINDOW)?;
    frame.last()?.close().partial_cmp(&sma)
}

/// Classifies the latest symbol row against both index frames.
///
/// BULL needs all four checks strictly positive, BEAR all four strictly
/// negative; anything else is NEUTRAL.
pub fn classify_regime(
    symbol: &IndicatorRow,
    market_index: &IndicatorFrame,
    equal_index: &IndicatorFrame,
) -> Regime {
    use std::cmp::Ordering::{Greater, Less};

    let market = index_trend(market_index);
    let equal = index_trend(equal_index);

    let up = symbol.close() > symbol.sma_long
        && symbol.trend_angle > 0.0
        && market == Some(Greater)
        && equal == Some(Greater);
    let down = symbol.close() < symbol.sma_long
        && symbol.trend_angle < 0.0
        && market == Some(Less)
        && equal == Some(Less);

    if up {
        Regime::Bull
    } else if down {
        Regime::Bear
    } else {
        Regime::Neutral
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use chrono::NaiveDate;

    pub fn row(close: f64, sma_long: f64, trend_angle: f64) -> IndicatorRow {
        IndicatorRow {
            bar: OhlcvBar {
                symbol: "SYM".into(),
                date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            },
            ema_fast: close,
            ema_slow: close,
            sma_mid: close,
            sma_long,
            macd: 0.0,
            macd_signal: 0.0,
            rsi: 50.0,
            bb_upper: close,
            bb_lower: close,
            donchian_high: close,
            donchian_low: close,
            volume_ma: 1000.0,
            roc: 0.0,
            trend_angle,
            atr: 1.0,
            adx: 20.0,
        }
    }

    /// 120 rows, flat at `base` then ending at `last`.
    pub fn index_frame(base: f64, last: f64) -> IndicatorFrame {
        let mut rows: Vec<IndicatorRow> = (0..119).map(|_| row(base, base, 0.0)).collect();
        rows.push(row(last, base, 0.0));
        IndicatorFrame {
            symbol: "IDX".into(),
            rows,
        }
    }

    #[test]
    fn bull_when_all_checks_positive() {
        let symbol = row(110.0, 100.0, 0.01);
        let up = index_frame(100.0, 120.0);
        assert_eq!(classify_regime(&symbol, &up, &up), Regime::Bull);
    }

    #[test]
    fn bear_when_all_checks_negative() {
        let symbol = row(90.0, 100.0, -0.01);
        let down = index_frame(100.0, 80.0);
        assert_eq!(classify_regime(&symbol, &down, &down), Regime::Bear);
    }

    #[test]
    fn flipping_only_index_gives_neutral_not_bear() {
        let symbol = row(110.0, 100.0, 0.01);
        let down = index_frame(100.0, 80.0);
        assert_eq!(classify_regime(&symbol, &down, &down), Regime::Neutral);
    }

    #[test]
    fn mixed_indices_are_neutral() {
        let symbol = row(110.0, 100.0, 0.01);
        let up = index_frame(100.0, 120.0);
        let down = index_frame(100.0, 80.0);
        assert_eq!(classify_regime(&symbol, &up, &down), Regime::Neutral);
    }

    #[test]
    fn short_index_frame_is_neutral() {
        let symbol = row(110.0, 100.0, 0.01);
        let up = index_frame(100.0, 120.0);
        let short = IndicatorFrame {
            symbol: "IDX".into(),
            rows: up.rows[..50].to_vec(),
        };
        assert_eq!(classify_regime(&symbol, &up, &short), Regime::Neutral);
    }

    #[test]
    fn zero_trend_angle_is_neutral() {
        let symbol = row(110.0, 100.0, 0.0);
        let up = index_frame(100.0, 120.0);
        assert_eq!(classify_regime(&symbol, &up, &up), Regime::Neutral);
    }

    #[test]
    fn display_labels() {
        assert_eq!(Regime::Bull.to_string(), "BULL");
        assert_eq!(Regime::Bear.to_string(), "BEAR");
        assert_eq!(Regime::Neutral.to_string(), "NEUTRAL");
    }
}
