//! Audit pass listing which symbols the bottom-seeking rule keeps and why
//! the others are left out.

use crate::domain::ohlcv::validate_series;
use crate::domain::screener::candidate::measure;
use crate::domain::screener::{capped, ScreenInput, ScreenerConfig, SelectionPolicy};
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub enum ReviewReason {
    Selected,
    NoSignalsOrLowGain,
    BlacklistName,
    InsufficientHistory,
    Error(String),
}

impl fmt::Display for ReviewReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewReason::Selected => f.write_str("selected"),
            ReviewReason::NoSignalsOrLowGain => f.write_str("no_signals_or_low_gain"),
            ReviewReason::BlacklistName => f.write_str("blacklist_name"),
            ReviewReason::InsufficientHistory => f.write_str("insufficient_history"),
            ReviewReason::Error(reason) => write!(f, "error:{}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewEntry {
    pub symbol: String,
    /// Supplied name, empty when none was given.
    pub name: String,
    pub reason: ReviewReason,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewReport {
    pub included: Vec<ReviewEntry>,
    pub excluded: Vec<ReviewEntry>,
}

fn review_one(input: &ScreenInput, config: &ScreenerConfig) -> ReviewReason {
    let policy = SelectionPolicy::Review;
    if policy
        .blacklist_subject(input)
        .is_some_and(|name| config.is_blacklisted(name))
    {
        return ReviewReason::BlacklistName;
    }
    if input.bars.len() < config.min_history {
        return ReviewReason::InsufficientHistory;
    }
    if let Err(reason) = validate_series(&input.bars) {
        return ReviewReason::Error(reason);
    }
    match measure(&input.symbol, &input.symbol, &input.bars, config.min_gain) {
        Some(c) if c.meets_gain_rule(config.min_gain) => ReviewReason::Selected,
        _ => ReviewReason::NoSignalsOrLowGain,
    }
}

pub fn review_universe(inputs: &[ScreenInput], config: &ScreenerConfig) -> ReviewReport {
    let mut report = ReviewReport::default();
    for input in capped(inputs, config) {
        let reason = review_one(input, config);
        let entry = ReviewEntry {
            symbol: input.symbol.clone(),
            name: input.name.clone().unwrap_or_default(),
            reason,
        };
        if entry.reason == ReviewReason::Selected {
            report.included.push(entry);
        } else {
            report.excluded.push(entry);
        }
    }
    info!(
        included = report.included.len(),
        excluded = report.excluded.len(),
        "review complete"
    );
    report
}
