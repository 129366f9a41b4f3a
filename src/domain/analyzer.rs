//! Universe analysis: regime, signals and long/short rankings across symbols.
//!
//! Every non-index symbol is processed independently. Failures on one symbol
//! are recorded as a [`SymbolOutcome::Skipped`] and never abort the batch; only
//! a missing index is fatal.

use crate::domain::config::{AnalysisConfig, EQUAL_WEIGHT_INDEX_KEY, MARKET_INDEX_KEY};
use crate::domain::error::MarketscanError;
use crate::domain::indicator::frame::{compute_frame, IndicatorFrame};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::regime::{classify_regime, Regime};
use crate::domain::scoring::{score_asset, Orientation, Score};
use crate::domain::signals::{default_generators, run_generators, Signal};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct IndexSeries {
    pub market: Vec<OhlcvBar>,
    pub equal_weight: Vec<OhlcvBar>,
}

/// Symbol series keyed by symbol; the two indices are either passed in
/// `indices` or embedded under the reserved keys.
#[derive(Debug, Clone, Default)]
pub struct UniverseInput {
    pub symbols: BTreeMap<String, Vec<OhlcvBar>>,
    pub indices: Option<IndexSeries>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    InvalidSeries(String),
    InsufficientHistory { rows: usize, minimum: usize },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::InvalidSeries(reason) => write!(f, "invalid series: {}", reason),
            SkipReason::InsufficientHistory { rows, minimum } => {
                write!(f, "insufficient history: {} rows, minimum {}", rows, minimum)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolOutcome {
    Analyzed {
        symbol: String,
        regime: Regime,
        signal_count: usize,
    },
    Skipped {
        symbol: String,
        reason: SkipReason,
    },
}

impl SymbolOutcome {
    pub fn symbol(&self) -> &str {
        match self {
            SymbolOutcome::Analyzed { symbol, .. } | SymbolOutcome::Skipped { symbol, .. } => {
                symbol
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    pub signals: Vec<Signal>,
    pub long_top: Vec<Score>,
    pub short_top: Vec<Score>,
    pub outcomes: Vec<SymbolOutcome>,
}

impl AnalysisReport {
    pub fn analyzed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SymbolOutcome::Analyzed { .. }))
            .count()
    }
}

fn is_index_key(symbol: &str) -> bool {
    symbol == MARKET_INDEX_KEY || symbol == EQUAL_WEIGHT_INDEX_KEY
}

fn resolve_indices(input: &UniverseInput) -> Result<(&[OhlcvBar], &[OhlcvBar]), MarketscanError> {
    if let Some(indices) = &input.indices {
        return Ok((&indices.market, &indices.equal_weight));
    }
    let lookup = |key: &str| {
        input
            .symbols
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| MarketscanError::MissingIndex {
                key: key.to_string(),
            })
    };
    Ok((lookup(MARKET_INDEX_KEY)?, lookup(EQUAL_WEIGHT_INDEX_KEY)?))
}

fn index_frame(
    key: &str,
    bars: &[OhlcvBar],
    config: &AnalysisConfig,
) -> Result<IndicatorFrame, MarketscanError> {
    if bars.is_empty() {
        return Err(MarketscanError::MissingIndex {
            key: key.to_string(),
        });
    }
    compute_frame(key, bars, &config.indicators)
}

/// Descending by score; NaN sorts after every number. Stable, so equal scores
/// keep symbol order.
fn rank(scores: &mut [Score]) {
    scores.sort_by(|a, b| match (a.value.is_nan(), b.value.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal),
    });
}

pub fn analyze_universe(
    input: &UniverseInput,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, MarketscanError> {
    let (market_bars, equal_bars) = resolve_indices(input)?;
    let market = index_frame(MARKET_INDEX_KEY, market_bars, config)?;
    let equal = index_frame(EQUAL_WEIGHT_INDEX_KEY, equal_bars, config)?;

    let generators = default_generators();
    let mut report = AnalysisReport::default();
    let mut long_scores = Vec::new();
    let mut short_scores = Vec::new();

    for (symbol, bars) in &input.symbols {
        if is_index_key(symbol) {
            continue;
        }

        let frame = match compute_frame(symbol, bars, &config.indicators) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "skipping symbol");
                report.outcomes.push(SymbolOutcome::Skipped {
                    symbol: symbol.clone(),
                    reason: SkipReason::InvalidSeries(e.to_string()),
                });
                continue;
            }
        };

        let Some(latest) = frame.last().filter(|_| frame.len() >= config.min_history_days) else {
            debug!(
                symbol = %symbol,
                rows = frame.len(),
                minimum = config.min_history_days,
                "skipping symbol with short history"
            );
            report.outcomes.push(SymbolOutcome::Skipped {
                symbol: symbol.clone(),
                reason: SkipReason::InsufficientHistory {
                    rows: frame.len(),
                    minimum: config.min_history_days,
                },
            });
            continue;
        };

        let regime = classify_regime(latest, &market, &equal);
        let signals = run_generators(&generators, &frame, regime, &config.filters);
        let signal_count = signals.len();
        report.signals.extend(signals);

        long_scores.extend(score_asset(&frame, regime, Orientation::Long, config));
        short_scores.extend(score_asset(&frame, regime, Orientation::Short, config));

        report.outcomes.push(SymbolOutcome::Analyzed {
            symbol: symbol.clone(),
            regime,
            signal_count,
        });
    }

    rank(&mut long_scores);
    rank(&mut short_scores);
    long_scores.truncate(config.top_n);
    short_scores.truncate(config.top_n);
    report.long_top = long_scores;
    report.short_top = short_scores;

    info!(
        analyzed = report.analyzed_count(),
        skipped = report.outcomes.len() - report.analyzed_count(),
        signals = report.signals.len(),
        "universe analysis complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(symbol: &str, n: usize, drift: f64) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                let c = 100.0 * (1.0 + drift).powi(i as i32) + ((i as f64) * 0.7).sin();
                OhlcvBar {
                    symbol: symbol.to_string(),
                    date: start + chrono::Duration::days(i as i64),
                    open: c,
                    high: c * 1.01,
                    low: c * 0.99,
                    close: c,
                    volume: 1.0e8,
                }
            })
            .collect()
    }

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            min_history_days: 50,
            ..AnalysisConfig::default()
        }
    }

    fn embedded_input() -> UniverseInput {
        let mut symbols = BTreeMap::new();
        symbols.insert(MARKET_INDEX_KEY.to_string(), series(MARKET_INDEX_KEY, 400, 0.001));
        symbols.insert(EQUAL_WEIGHT_INDEX_KEY.to_string(), series(EQUAL_WEIGHT_INDEX_KEY, 400, 0.001));
        symbols.insert("AAA".to_string(), series("AAA", 400, 0.002));
        symbols.insert("BBB".to_string(), series("BBB", 400, -0.001));
        UniverseInput {
            symbols,
            indices: None,
        }
    }

    #[test]
    fn missing_equal_index_is_fatal() {
        let mut input = embedded_input();
        input.symbols.remove(EQUAL_WEIGHT_INDEX_KEY);
        let err = analyze_universe(&input, &config()).unwrap_err();
        assert!(matches!(err, MarketscanError::MissingIndex { key } if key == "EQUAL"));
    }

    #[test]
    fn embedded_indices_are_not_analyzed() {
        let report = analyze_universe(&embedded_input(), &config()).unwrap();
        let symbols: Vec<&str> = report.outcomes.iter().map(|o| o.symbol()).collect();
        assert_eq!(symbols, vec!["AAA", "BBB"]);
        assert_eq!(report.analyzed_count(), 2);
        assert_eq!(report.long_top.len(), 2);
    }

    #[test]
    fn explicit_indices_win_over_embedded() {
        let mut input = embedded_input();
        input.symbols.remove(MARKET_INDEX_KEY);
        input.symbols.remove(EQUAL_WEIGHT_INDEX_KEY);
        input.indices = Some(IndexSeries {
            market: series("M", 400, 0.001),
            equal_weight: series("E", 400, 0.001),
        });
        assert!(analyze_universe(&input, &config()).is_ok());
    }

    #[test]
    fn short_history_is_skipped_not_fatal() {
        let mut input = embedded_input();
        input.symbols.insert("CCC".to_string(), series("CCC", 230, 0.001));
        let report = analyze_universe(&input, &config()).unwrap();
        let skipped = report
            .outcomes
            .iter()
            .find(|o| o.symbol() == "CCC")
            .unwrap();
        assert!(matches!(
            skipped,
            SymbolOutcome::Skipped {
                reason: SkipReason::InsufficientHistory { .. },
                ..
            }
        ));
    }

    #[test]
    fn invalid_series_is_skipped() {
        let mut input = embedded_input();
        let mut bad = series("BAD", 400, 0.001);
        bad[10].close = -1.0;
        input.symbols.insert("BAD".to_string(), bad);
        let report = analyze_universe(&input, &config()).unwrap();
        assert!(report.outcomes.iter().any(|o| matches!(
            o,
            SymbolOutcome::Skipped { symbol, reason: SkipReason::InvalidSeries(_) } if symbol == "BAD"
        )));
    }

    #[test]
    fn rankings_respect_top_n_and_order() {
        let mut input = embedded_input();
        for (i, name) in ["C1", "C2", "C3", "C4"].iter().enumerate() {
            input
                .symbols
                .insert(name.to_string(), series(name, 400, 0.0005 * i as f64));
        }
        let cfg = AnalysisConfig {
            top_n: 3,
            ..config()
        };
        let report = analyze_universe(&input, &cfg).unwrap();
        assert_eq!(report.long_top.len(), 3);
        assert!(report.long_top.windows(2).all(|w| w[0].value >= w[1].value));
        assert!(report.short_top.windows(2).all(|w| w[0].value >= w[1].value));
    }

    #[test]
    fn rank_puts_nan_last_and_is_stable() {
        let score = |s: &str, v: f64| Score {
            symbol: s.to_string(),
            regime: Regime::Neutral,
            value: v,
        };
        let mut scores = vec![
            score("A", f64::NAN),
            score("B", 1.0),
            score("C", 2.0),
            score("D", 1.0),
        ];
        rank(&mut scores);
        let order: Vec<&str> = scores.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(order, vec!["C", "B", "D", "A"]);
    }
}
