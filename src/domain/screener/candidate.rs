//! Per-symbol measurements of the bottom-seeking screen.

use crate::domain::indicator::sma::rolling_mean;
use crate::domain::ohlcv::{closes, OhlcvBar};

/// Bars in a trading year.
pub const YEAR_BARS: usize = 260;
pub const RESISTANCE_BARS: usize = 50;
pub const VOLUME_BARS: usize = 30;
pub const NEAR_LOW_MULT: f64 = 1.10;
pub const OVERSOLD_RSI: f64 = 40.0;
/// Cap on the projected upside relative to price.
pub const MAX_TARGET_MULT: f64 = 1.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    /// Mean volume of the last 30 bars, or of the whole series when shorter.
    pub avg_volume_30: f64,
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub rsi14: Option<f64>,
    pub low52: f64,
    pub high52: f64,
    pub high50: f64,
    pub potential_target: f64,
    pub potential_gain_pct: f64,
    pub near_low: bool,
    pub oversold: bool,
    pub macd_building: bool,
    pub signals_count: usize,
    pub passed: bool,
    pub days_since_52w_low: Option<i64>,
    pub distance_from_low_pct: Option<f64>,
    pub resistance_50: f64,
    pub resistance_52: f64,
    pub resistance_distance_pct: Option<f64>,
    pub volatility_14d: Option<f64>,
    pub momentum_5d: Option<f64>,
}

impl Candidate {
    /// Golden alignment of the medium and long averages.
    pub fn sma_aligned(&self) -> bool {
        matches!((self.sma50, self.sma200), (Some(mid), Some(long)) if mid > long)
    }

    /// Two of three bottom signals with enough upside, or oversold with enough upside.
    pub fn meets_gain_rule(&self, min_gain: f64) -> bool {
        let enough_gain = self.potential_gain_pct >= min_gain;
        (self.signals_count >= 2 && enough_gain) || (self.oversold && enough_gain)
    }
}

fn last_sma(closes: &[f64], window: usize) -> Option<f64> {
    if closes.len() < window {
        return None;
    }
    rolling_mean(closes, window).last().copied().flatten()
}

fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn min_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Exponential average seeded with the first value, defined from the first bar.
fn ewm(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &v in values {
        let next = match prev {
            Some(p) => (1.0 - alpha) * p + alpha * v,
            None => v,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

fn span_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// RSI on `ewm` averages of gains and losses, seeded with the first change.
/// `None` below `window + 1` closes or when the average loss is zero.
fn ewm_rsi(closes: &[f64], window: usize) -> Option<f64> {
    if window == 0 || closes.len() < window + 1 {
        return None;
    }
    let alpha = 1.0 / window as f64;
    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let change = w[1] - w[0];
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();
    let avg_gain = *ewm(&gains, alpha).last()?;
    let avg_loss = *ewm(&losses, alpha).last()?;
    if avg_loss == 0.0 {
        return None;
    }
    let rsi = 100.0 - 100.0 / (1.0 + avg_gain / avg_loss);
    rsi.is_finite().then_some(rsi)
}

/// MACD(12, 26, 9) histogram on first-value-seeded averages, one value per close.
fn ewm_macd_hist(closes: &[f64]) -> Vec<f64> {
    let fast = ewm(closes, span_alpha(12));
    let slow = ewm(closes, span_alpha(26));
    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ewm(&line, span_alpha(9));
    line.iter().zip(&signal).map(|(l, s)| l - s).collect()
}

/// True when the last four histogram values rise strictly at every step.
fn histogram_rising(closes: &[f64]) -> bool {
    let hist = ewm_macd_hist(closes);
    hist.len() >= 4 && hist[hist.len() - 4..].windows(2).all(|w| w[1] > w[0])
}

/// Sample std of the last 14 simple returns; needs at least 7 returns.
fn volatility_14d(closes: &[f64]) -> Option<f64> {
    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();
    if returns.len() < 7 {
        return None;
    }
    let recent = tail(&returns, 14);
    let n = recent.len() as f64;
    let mean = recent.iter().sum::<f64>() / n;
    let var = recent.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(var.sqrt())
}

fn momentum_5d(closes: &[f64]) -> Option<f64> {
    if closes.len() < 6 {
        return None;
    }
    let base = closes[closes.len() - 6];
    let last = closes[closes.len() - 1];
    (base != 0.0).then(|| (last - base) / base)
}

/// Measures one validated series. `passed` reflects the gain rule only; the
/// caller applies any policy-specific rejections.
pub fn measure(symbol: &str, name: &str, bars: &[OhlcvBar], min_gain: f64) -> Option<Candidate> {
    let last_bar = bars.last()?;
    let closes = closes(bars);
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
    let price = last_bar.close;

    let recent_volume = tail(&volumes, VOLUME_BARS);
    let avg_volume_30 = recent_volume.iter().sum::<f64>() / recent_volume.len() as f64;

    let year = tail(&closes, YEAR_BARS);
    let low52 = min_of(year);
    let high52 = max_of(year);
    let high50 = if closes.len() >= RESISTANCE_BARS {
        max_of(tail(&closes, RESISTANCE_BARS))
    } else {
        high52
    };

    let potential_target = high50.min(price * MAX_TARGET_MULT);
    let potential_gain_pct = if price > 0.0 {
        (potential_target - price) / price
    } else {
        0.0
    };

    let rsi14 = ewm_rsi(&closes, 14);

    let near_low = price <= NEAR_LOW_MULT * low52;
    let oversold = rsi14.is_some_and(|r| r <= OVERSOLD_RSI);
    let macd_building = histogram_rising(&closes);
    let signals_count = [near_low, oversold, macd_building]
        .iter()
        .filter(|s| **s)
        .count();

    // first bar holding the yearly minimum
    let year_bars = &bars[bars.len() - year.len()..];
    let days_since_52w_low = year_bars
        .iter()
        .find(|b| b.close == low52)
        .map(|b| (last_bar.date - b.date).num_days());

    let distance_from_low_pct = (low52 > 0.0).then(|| (price - low52) / low52 * 100.0);
    let nearest_resistance = high50.min(high52);
    let resistance_distance_pct =
        (price > 0.0).then(|| (nearest_resistance - price) / price * 100.0);

    let mut candidate = Candidate {
        symbol: symbol.to_string(),
        name: name.to_string(),
        price,
        avg_volume_30,
        sma20: last_sma(&closes, 20),
        sma50: last_sma(&closes, 50),
        sma200: last_sma(&closes, 200),
        rsi14,
        low52,
        high52,
        high50,
        potential_target,
        potential_gain_pct,
        near_low,
        oversold,
        macd_building,
        signals_count,
        passed: false,
        days_since_52w_low,
        distance_from_low_pct,
        resistance_50: high50,
        resistance_52: high52,
        resistance_distance_pct,
        volatility_14d: volatility_14d(&closes),
        momentum_5d: momentum_5d(&closes),
    };
    candidate.passed = candidate.meets_gain_rule(min_gain);
    Some(candidate)
}
