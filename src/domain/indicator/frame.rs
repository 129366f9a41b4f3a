//! Indicator frame: an OHLCV series joined with every derived column.
//!
//! Rows where any column is still warming up (or non-finite) are dropped, so
//! the frame is never longer than its input and holds no NaN.

use crate::domain::error::MarketscanError;
use crate::domain::indicator::macd::{self, calculate_macd};
use crate::domain::indicator::{
    calculate_adx, calculate_atr, calculate_bollinger, calculate_donchian, calculate_ema,
    calculate_roc, calculate_rsi, calculate_sma, calculate_trend_angle, calculate_volume_sma,
    IndicatorSeries, IndicatorValue,
};
use crate::domain::ohlcv::{validate_series, OhlcvBar};

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub sma_mid: usize,
    pub sma_long: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub rsi: usize,
    pub bollinger: usize,
    pub bollinger_mult_x100: u32,
    pub donchian: usize,
    pub volume_ma: usize,
    pub roc: usize,
    pub trend_lag: usize,
    pub atr: usize,
    pub adx: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_fast: 9,
            ema_slow: 21,
            sma_mid: 50,
            sma_long: 200,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            rsi: 14,
            bollinger: 20,
            bollinger_mult_x100: 200,
            donchian: 20,
            volume_ma: 20,
            roc: 10,
            trend_lag: 5,
            atr: 14,
            adx: 14,
        }
    }
}

impl IndicatorParams {
    /// Bars consumed before the first complete row.
    pub fn longest_lookback(&self) -> usize {
        [
            self.ema_fast,
            self.ema_slow,
            self.sma_mid,
            self.sma_long + self.trend_lag,
            self.macd_fast.max(self.macd_slow) + self.macd_signal - 1,
            self.rsi + 1,
            self.bollinger,
            self.donchian,
            self.volume_ma,
            self.roc + 1,
            2 * self.adx,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub bar: OhlcvBar,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub sma_mid: f64,
    pub sma_long: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub rsi: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub donchian_high: f64,
    pub donchian_low: f64,
    pub volume_ma: f64,
    pub roc: f64,
    pub trend_angle: f64,
    pub atr: f64,
    pub adx: f64,
}

impl IndicatorRow {
    pub fn close(&self) -> f64 {
        self.bar.close
    }

    fn is_finite(&self) -> bool {
        [
            self.ema_fast,
            self.ema_slow,
            self.sma_mid,
            self.sma_long,
            self.macd,
            self.macd_signal,
            self.rsi,
            self.bb_upper,
            self.bb_lower,
            self.donchian_high,
            self.donchian_low,
            self.volume_ma,
            self.roc,
            self.trend_angle,
            self.atr,
            self.adx,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndicatorFrame {
    pub symbol: String,
    pub rows: Vec<IndicatorRow>,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }

    /// Row `offset` bars before the last (0 = last).
    pub fn back(&self, offset: usize) -> Option<&IndicatorRow> {
        self.rows.len().checked_sub(offset + 1).map(|i| &self.rows[i])
    }

    /// Mean of the last `window` closes; `None` if the frame is shorter.
    pub fn close_sma(&self, window: usize) -> Option<f64> {
        if window == 0 || self.rows.len() < window {
            return None;
        }
        let tail = &self.rows[self.rows.len() - window..];
        Some(tail.iter().map(|r| r.bar.close).sum::<f64>() / window as f64)
    }
}

fn macd_at(series: &IndicatorSeries, i: usize) -> Option<(f64, f64)> {
    match series.values.get(i) {
        Some(p) if p.valid => match p.value {
            IndicatorValue::Macd { line, signal, .. } => Some((line, signal)),
            _ => None,
        },
        _ => None,
    }
}

fn bands_at(series: &IndicatorSeries, i: usize) -> Option<(f64, f64)> {
    match series.values.get(i) {
        Some(p) if p.valid => match p.value {
            IndicatorValue::Bollinger { upper, lower, .. } => Some((upper, lower)),
            IndicatorValue::Channel { upper, lower } => Some((upper, lower)),
            _ => None,
        },
        _ => None,
    }
}

/// Computes every indicator column for `bars` and keeps only fully-warmed rows.
///
/// An input shorter than [`IndicatorParams::longest_lookback`] yields an empty
/// frame; callers must check.
pub fn compute_frame(
    symbol: &str,
    bars: &[OhlcvBar],
    params: &IndicatorParams,
) -> Result<IndicatorFrame, MarketscanError> {
    validate_series(bars).map_err(|reason| MarketscanError::InvalidSeries {
        symbol: symbol.to_string(),
        reason,
    })?;

    let ema_fast = calculate_ema(bars, params.ema_fast);
    let ema_slow = calculate_ema(bars, params.ema_slow);
    let sma_mid = calculate_sma(bars, params.sma_mid);
    let sma_long = calculate_sma(bars, params.sma_long);
    let macd = calculate_macd(bars, params.macd_fast, params.macd_slow, params.macd_signal);
    let rsi = calculate_rsi(bars, params.rsi);
    let bollinger = calculate_bollinger(bars, params.bollinger, params.bollinger_mult_x100);
    let donchian = calculate_donchian(bars, params.donchian);
    let volume_ma = calculate_volume_sma(bars, params.volume_ma);
    let roc = calculate_roc(bars, params.roc);
    let trend_angle = calculate_trend_angle(bars, params.sma_long, params.trend_lag);
    let atr = calculate_atr(bars, params.atr);
    let adx = calculate_adx(bars, params.adx);

    let mut rows = Vec::with_capacity(bars.len().saturating_sub(params.longest_lookback()));
    for (i, bar) in bars.iter().enumerate() {
        let row = (|| {
            let (macd_line, macd_signal) = macd_at(&macd, i)?;
            let (bb_upper, bb_lower) = bands_at(&bollinger, i)?;
            let (donchian_high, donchian_low) = bands_at(&donchian, i)?;
            Some(IndicatorRow {
                bar: bar.clone(),
                ema_fast: ema_fast.simple_at(i)?,
                ema_slow: ema_slow.simple_at(i)?,
                sma_mid: sma_mid.simple_at(i)?,
                sma_long: sma_long.simple_at(i)?,
                macd: macd_line,
                macd_signal,
                rsi: rsi.simple_at(i)?,
                bb_upper,
                bb_lower,
                donchian_high,
                donchian_low,
                volume_ma: volume_ma.simple_at(i)?,
                roc: roc.simple_at(i)?,
                trend_angle: trend_angle.simple_at(i)?,
                atr: atr.simple_at(i)?,
                adx: adx.simple_at(i)?,
            })
        })();

        if let Some(row) = row.filter(IndicatorRow::is_finite) {
            rows.push(row);
        }
    }

    Ok(IndicatorFrame {
        symbol: symbol.to_string(),
        rows,
    })
}
