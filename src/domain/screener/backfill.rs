//! Guaranteed-size selection: primary picks first, then a composite ranking.

use crate::domain::screener::candidate::Candidate;
use std::cmp::Ordering;
use std::collections::HashSet;

const GAIN_WEIGHT: f64 = 0.55;
const MOMENTUM_WEIGHT: f64 = 0.15;
const LIQUIDITY_WEIGHT: f64 = 0.25;
const VOLATILITY_WEIGHT: f64 = 0.05;
/// Volume at which the liquidity score saturates.
const LIQUIDITY_CAP: f64 = 1e7;

/// Linearly interpolated quantile of unsorted values.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo]))
}

/// Composite backfill score; `liquidity_bounds` are the winsorizing limits.
pub fn composite_score(candidate: &Candidate, liquidity_bounds: (f64, f64)) -> f64 {
    let momentum = (candidate.momentum_5d.unwrap_or(0.0) * 5.0).tanh();
    let (lower, upper) = liquidity_bounds;
    let volume = candidate.avg_volume_30.max(0.0).clamp(lower, upper);
    let liquidity = (volume.ln_1p() / LIQUIDITY_CAP.ln_1p()).min(1.0);
    let vol_score = 1.0 / (1.0 + candidate.volatility_14d.unwrap_or(0.0));
    GAIN_WEIGHT * candidate.potential_gain_pct
        + MOMENTUM_WEIGHT * momentum
        + LIQUIDITY_WEIGHT * liquidity
        + VOLATILITY_WEIGHT * vol_score
}

/// Returns exactly `min(n, |selected ∪ universe|)` rows: `selected` in its
/// given order, then the rest of `universe` by composite score.
pub fn ensure_n(selected: &[Candidate], universe: &[Candidate], n: usize) -> Vec<Candidate> {
    if selected.len() >= n {
        return selected[..n].to_vec();
    }

    let taken: HashSet<&str> = selected.iter().map(|c| c.symbol.as_str()).collect();
    let extras: Vec<&Candidate> = universe
        .iter()
        .filter(|c| !taken.contains(c.symbol.as_str()))
        .collect();

    let volumes: Vec<f64> = extras.iter().map(|c| c.avg_volume_30.max(0.0)).collect();
    let bounds = match (quantile(&volumes, 0.01), quantile(&volumes, 0.99)) {
        (Some(lower), Some(upper)) => (lower, upper),
        _ => (0.0, 0.0),
    };

    let mut scored: Vec<(f64, &Candidate)> = extras
        .into_iter()
        .map(|c| (composite_score(c, bounds), c))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    let need = n - selected.len();
    let mut result = selected.to_vec();
    result.extend(scored.into_iter().take(need).map(|(_, c)| c.clone()));
    result
}
