//! Supplementary watch-lists derived from the full screened table.

use crate::domain::screener::candidate::{Candidate, OVERSOLD_RSI};
use std::cmp::Ordering;

pub const LIST_SIZE: usize = 20;
const FIXED_INCOME_KEYWORD: &str = "درآمد ثابت";

fn by_gain_desc(a: &Candidate, b: &Candidate) -> Ordering {
    b.potential_gain_pct
        .partial_cmp(&a.potential_gain_pct)
        .unwrap_or(Ordering::Equal)
}

/// Moderate upside (20–30%) with MACD momentum or golden SMA alignment.
pub fn growth_candidates(universe: &[Candidate]) -> Vec<Candidate> {
    let mut picks: Vec<Candidate> = universe
        .iter()
        .filter(|c| (0.20..=0.30).contains(&c.potential_gain_pct))
        .filter(|c| c.macd_building || c.sma_aligned())
        .filter(|c| !c.symbol.contains(FIXED_INCOME_KEYWORD))
        .cloned()
        .collect();
    picks.sort_by(by_gain_desc);
    picks.truncate(LIST_SIZE);
    picks
}

/// Within 5% of the yearly low, at least 30% upside, and any sign of a turn.
pub fn bottom_sharp(universe: &[Candidate]) -> Vec<Candidate> {
    let mut picks: Vec<Candidate> = universe
        .iter()
        .filter(|c| c.price <= 1.05 * c.low52 && c.potential_gain_pct >= 0.30)
        .filter(|c| {
            c.macd_building || c.rsi14.is_some_and(|r| r <= OVERSOLD_RSI) || c.sma_aligned()
        })
        .cloned()
        .collect();
    picks.sort_by(|a, b| {
        by_gain_desc(a, b).then_with(|| {
            let da = a.distance_from_low_pct.unwrap_or(f64::INFINITY);
            let db = b.distance_from_low_pct.unwrap_or(f64::INFINITY);
            da.partial_cmp(&db).unwrap_or(Ordering::Equal)
        })
    });
    picks.truncate(LIST_SIZE);
    picks
}
