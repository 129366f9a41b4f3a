//! Bottom-seeking recovery screen over a large universe.
//!
//! Symbols near their 52-week low with oversold or turning momentum and enough
//! projected upside are selected; [`backfill::ensure_n`] tops the list up to a
//! fixed size. Two selection policies exist: the screener proper and a review
//! pass that audits why symbols were kept or dropped.

pub mod backfill;
pub mod candidate;
pub mod lists;
pub mod review;

pub use backfill::ensure_n;
pub use candidate::Candidate;
pub use lists::{bottom_sharp, growth_candidates};
pub use review::{review_universe, ReviewEntry, ReviewReason, ReviewReport};

use crate::domain::ohlcv::{validate_series, OhlcvBar};
use std::cmp::Ordering;
use std::fmt;
use tracing::{info, warn};

/// Keywords marking fixed-income, rights and option instruments.
pub const DEFAULT_NAME_BLACKLIST: [&str; 11] = [
    "مرابحه",
    "صکو",
    "اوراق",
    "درآمد ثابت",
    "قرضه",
    "تسه",
    "تس",
    "اختیار",
    "حق",
    "ص.س",
    "صکوك",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenerConfig {
    pub universe_size: usize,
    pub min_gain: f64,
    pub min_history: usize,
    pub target_size: usize,
    pub name_blacklist: Vec<String>,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            universe_size: 800,
            min_gain: 0.20,
            min_history: 60,
            target_size: 20,
            name_blacklist: DEFAULT_NAME_BLACKLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ScreenerConfig {
    pub fn conservative() -> Self {
        Self {
            min_gain: 0.25,
            ..Self::default()
        }
    }

    pub fn aggressive() -> Self {
        Self {
            min_gain: 0.15,
            ..Self::default()
        }
    }

    /// Case-insensitive substring match against any keyword.
    pub fn is_blacklisted(&self, name: &str) -> bool {
        let upper = name.to_uppercase();
        self.name_blacklist
            .iter()
            .any(|kw| !kw.is_empty() && upper.contains(&kw.to_uppercase()))
    }
}

#[derive(Debug, Clone)]
pub struct ScreenInput {
    pub symbol: String,
    pub name: Option<String>,
    pub bars: Vec<OhlcvBar>,
}

/// How a screening pass resolves names and which rejections it applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Blacklist on the name, falling back to the symbol; rejects zero volume.
    Screener,
    /// Blacklist on the supplied name only; no volume rejection.
    Review,
}

impl SelectionPolicy {
    pub fn blacklist_subject<'a>(&self, input: &'a ScreenInput) -> Option<&'a str> {
        match self {
            SelectionPolicy::Screener => Some(input.name.as_deref().unwrap_or(&input.symbol)),
            SelectionPolicy::Review => input.name.as_deref(),
        }
    }

    pub fn rejects_dry_volume(&self) -> bool {
        matches!(self, SelectionPolicy::Screener)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemovalReason {
    Blacklist,
    InsufficientHistory,
    LowVolume,
    Error(String),
}

impl fmt::Display for RemovalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalReason::Blacklist => f.write_str("blacklist"),
            RemovalReason::InsufficientHistory => f.write_str("insufficient_history"),
            RemovalReason::LowVolume => f.write_str("low_volume"),
            RemovalReason::Error(reason) => write!(f, "error:{}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Removal {
    pub symbol: String,
    pub name: String,
    pub reason: RemovalReason,
}

#[derive(Debug, Clone, Default)]
pub struct ScreenResult {
    /// Passed rows, by potential gain descending.
    pub candidates: Vec<Candidate>,
    /// Every measured row, in input order.
    pub universe: Vec<Candidate>,
    pub removals: Vec<Removal>,
}

impl ScreenResult {
    /// Passed rows topped up to `n` from the rest of the universe.
    pub fn top(&self, n: usize) -> Vec<Candidate> {
        ensure_n(&self.candidates, &self.universe, n)
    }
}

pub(crate) fn display_name(input: &ScreenInput) -> String {
    input.name.clone().unwrap_or_else(|| input.symbol.clone())
}

/// Applies the configured universe cap, logging what is dropped.
pub(crate) fn capped<'a>(inputs: &'a [ScreenInput], config: &ScreenerConfig) -> &'a [ScreenInput] {
    if inputs.len() > config.universe_size {
        info!(
            supplied = inputs.len(),
            kept = config.universe_size,
            "universe larger than configured size, ignoring the rest"
        );
        &inputs[..config.universe_size]
    } else {
        inputs
    }
}

pub fn screen_universe(inputs: &[ScreenInput], config: &ScreenerConfig) -> ScreenResult {
    let policy = SelectionPolicy::Screener;
    let inputs = capped(inputs, config);
    info!(symbols = inputs.len(), min_gain = config.min_gain, "screening universe");

    let mut result = ScreenResult::default();
    for input in inputs {
        let name = display_name(input);
        let remove = |reason| Removal {
            symbol: input.symbol.clone(),
            name: name.clone(),
            reason,
        };

        if policy
            .blacklist_subject(input)
            .is_some_and(|subject| config.is_blacklisted(subject))
        {
            result.removals.push(remove(RemovalReason::Blacklist));
            continue;
        }
        if input.bars.len() < config.min_history {
            result.removals.push(remove(RemovalReason::InsufficientHistory));
            continue;
        }
        if let Err(reason) = validate_series(&input.bars) {
            warn!(symbol = %input.symbol, %reason, "error processing symbol");
            result.removals.push(remove(RemovalReason::Error(reason)));
            continue;
        }
        let Some(mut candidate) =
            candidate::measure(&input.symbol, &name, &input.bars, config.min_gain)
        else {
            continue;
        };

        if policy.rejects_dry_volume() && candidate.passed && candidate.avg_volume_30 <= 0.0 {
            candidate.passed = false;
            result.removals.push(remove(RemovalReason::LowVolume));
        }
        result.universe.push(candidate);
    }

    result.candidates = result.universe.iter().filter(|c| c.passed).cloned().collect();
    result.candidates.sort_by(|a, b| {
        b.potential_gain_pct
            .partial_cmp(&a.potential_gain_pct)
            .unwrap_or(Ordering::Equal)
    });

    if result.candidates.is_empty() {
        info!("no candidates found with current rules");
    }
    info!(
        measured = result.universe.len(),
        passed = result.candidates.len(),
        removed = result.removals.len(),
        "screen complete"
    );
    result
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_bars;

    pub fn sold_off_input(symbol: &str, name: Option<&str>) -> ScreenInput {
        let mut prices: Vec<f64> = (0..80).map(|i| 100.0 + i as f64 * 0.625).collect();
        prices.extend((0..40).map(|i| 150.0 - i as f64 * 1.2));
        ScreenInput {
            symbol: symbol.to_string(),
            name: name.map(str::to_string),
            bars: make_bars(&prices),
        }
    }

    pub fn rising_input(symbol: &str) -> ScreenInput {
        let prices: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();
        ScreenInput {
            symbol: symbol.to_string(),
            name: None,
            bars: make_bars(&prices),
        }
    }

    #[test]
    fn presets() {
        assert!((ScreenerConfig::conservative().min_gain - 0.25).abs() < f64::EPSILON);
        assert!((ScreenerConfig::aggressive().min_gain - 0.15).abs() < f64::EPSILON);
        assert_eq!(ScreenerConfig::default().universe_size, 800);
    }

    #[test]
    fn blacklist_is_substring_match() {
        let config = ScreenerConfig::default();
        assert!(config.is_blacklisted("صندوق درآمد ثابت نمونه"));
        assert!(!config.is_blacklisted("فولاد"));
    }

    #[test]
    fn selects_sold_off_and_records_removals() {
        let mut short = rising_input("SHORT");
        short.bars.truncate(30);
        let inputs = vec![
            rising_input("UP"),
            sold_off_input("DOWN", None),
            sold_off_input("BOND", Some("اوراق مرابحه")),
            short,
        ];
        let result = screen_universe(&inputs, &ScreenerConfig::default());

        assert_eq!(result.candidates.len(), 1);
        assert_eq!(result.candidates[0].symbol, "DOWN");
        assert_eq!(result.universe.len(), 2);

        let reasons: Vec<(&str, &RemovalReason)> = result
            .removals
            .iter()
            .map(|r| (r.symbol.as_str(), &r.reason))
            .collect();
        assert_eq!(
            reasons,
            vec![
                ("BOND", &RemovalReason::Blacklist),
                ("SHORT", &RemovalReason::InsufficientHistory)
            ]
        );
    }

    #[test]
    fn zero_volume_is_rejected_but_kept_in_universe() {
        let mut dry = sold_off_input("DRY", None);
        for bar in &mut dry.bars {
            bar.volume = 0.0;
        }
        let result = screen_universe(&[dry], &ScreenerConfig::default());
        assert!(result.candidates.is_empty());
        assert_eq!(result.universe.len(), 1);
        assert!(!result.universe[0].passed);
        assert_eq!(result.removals[0].reason, RemovalReason::LowVolume);
    }

    #[test]
    fn invalid_series_is_an_error_removal() {
        let mut bad = sold_off_input("BAD", None);
        bad.bars[5].close = f64::NAN;
        let result = screen_universe(&[bad], &ScreenerConfig::default());
        assert!(matches!(result.removals[0].reason, RemovalReason::Error(_)));
        assert!(result.removals[0].reason.to_string().starts_with("error:"));
    }

    #[test]
    fn universe_cap_is_applied() {
        let inputs: Vec<ScreenInput> = (0..5).map(|i| rising_input(&format!("S{i}"))).collect();
        let config = ScreenerConfig {
            universe_size: 3,
            ..ScreenerConfig::default()
        };
        assert_eq!(screen_universe(&inputs, &config).universe.len(), 3);
    }

    #[test]
    fn top_backfills_to_size() {
        let inputs: Vec<ScreenInput> = vec![
            sold_off_input("DOWN", None),
            rising_input("A"),
            rising_input("B"),
            rising_input("C"),
        ];
        let result = screen_universe(&inputs, &ScreenerConfig::default());
        let top = result.top(3);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].symbol, "DOWN");
        assert_eq!(result.top(10).len(), 4);
    }
}
