//! ADX (Average Directional Index) with Wilder smoothing.
//!
//! +DM = up move when it exceeds the down move and is positive, else 0 (mirror for -DM).
//! TR, +DM, -DM are Wilder-summed: S[n] = sum of first n, S[i] = S[i-1] - S[i-1]/n + x[i].
//! DX = 100·|+DI − −DI| / (+DI + −DI); ADX seeds with the mean of the first n DX values.
//! Warmup: first (2n-1) bars are invalid.

use crate::domain::indicator::atr::true_ranges;
use crate::domain::indicator::{simple_series, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

fn directional_index(sum_dm: f64, sum_tr: f64) -> f64 {
    if sum_tr == 0.0 {
        0.0
    } else {
        100.0 * sum_dm / sum_tr
    }
}

pub fn calculate_adx(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let mut raw = vec![None; bars.len()];
    if period == 0 || bars.len() < 2 * period {
        return simple_series(bars, IndicatorType::Adx(period), raw);
    }

    let tr = true_ranges(bars);
    let mut plus_dm = vec![0.0; bars.len()];
    let mut minus_dm = vec![0.0; bars.len()];
    for i in 1..bars.len() {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        if up > down && up > 0.0 {
            plus_dm[i] = up;
        }
        if down > up && down > 0.0 {
            minus_dm[i] = down;
        }
    }

    let n = period as f64;
    let mut s_tr: f64 = tr[1..=period].iter().sum();
    let mut s_plus: f64 = plus_dm[1..=period].iter().sum();
    let mut s_minus: f64 = minus_dm[1..=period].iter().sum();

    let mut dx = vec![0.0; bars.len()];
    for i in period..bars.len() {
        if i > period {
            s_tr = s_tr - s_tr / n + tr[i];
            s_plus = s_plus - s_plus / n + plus_dm[i];
            s_minus = s_minus - s_minus / n + minus_dm[i];
        }
        let plus_di = directional_index(s_plus, s_tr);
        let minus_di = directional_index(s_minus, s_tr);
        let di_sum = plus_di + minus_di;
        dx[i] = if di_sum == 0.0 {
            0.0
        } else {
            100.0 * (plus_di - minus_di).abs() / di_sum
        };
    }

    let first = 2 * period - 1;
    let mut adx = dx[period..=first].iter().sum::<f64>() / n;
    raw[first] = Some(adx);
    for i in (first + 1)..bars.len() {
        adx = (adx * (n - 1.0) + dx[i]) / n;
        raw[i] = Some(adx);
    }

    simple_series(bars, IndicatorType::Adx(period), raw)
}
