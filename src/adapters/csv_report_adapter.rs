//! CSV report adapter implementing ReportPort.
//!
//! Fixed-schema files go through serde records; the option and backtest
//! tables are written column by column since their optional and passthrough
//! columns vary.

use crate::domain::analyzer::{AnalysisReport, SymbolOutcome};
use crate::domain::error::MarketscanError;
use crate::domain::mc_backtest::{BacktestReport, BacktestRow, RowOutcome};
use crate::domain::options::{EnrichedOptionRow, McQuote};
use crate::domain::scoring::Score;
use crate::domain::screener::{Candidate, Removal, ReviewEntry, ReviewReport};
use crate::ports::report_port::ReportPort;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const SIGNALS_FILE: &str = "signals.csv";
pub const LONG_TOP_FILE: &str = "long_top.csv";
pub const SHORT_TOP_FILE: &str = "short_top.csv";
pub const OUTCOMES_FILE: &str = "symbol_outcomes.csv";
pub const REMOVALS_FILE: &str = "removed_symbols.csv";
pub const REVIEW_INCLUDED_FILE: &str = "review_included.csv";
pub const REVIEW_EXCLUDED_FILE: &str = "review_excluded.csv";
pub const OPTIONS_FILE: &str = "options_candidates.csv";
pub const BACKTEST_DETAIL_FILE: &str = "mc_backtest_detailed.csv";
pub const BACKTEST_SUMMARY_FILE: &str = "mc_backtest_summary.csv";

pub const OPTION_COLUMNS: [&str; 21] = [
    "symbol",
    "days_to_expiry",
    "T_years",
    "strike_pct",
    "strike",
    "spot",
    "predicted_spot",
    "sigma_annual",
    "call_price",
    "put_price",
    "expected_return_pct",
    "mc_call_price",
    "mc_put_price",
    "mc_call_expected_return_pct",
    "mc_put_expected_return_pct",
    "dividend_yield",
    "recommendation",
    "mc_call_price_hp",
    "mc_put_price_hp",
    "mc_call_expected_return_hp",
    "mc_put_expected_return_hp",
];

pub const BACKTEST_COLUMNS: [&str; 18] = [
    "symbol",
    "spot",
    "strike",
    "T_years",
    "sigma_annual",
    "days_to_expiry",
    "predicted_spot",
    "dividend_yield",
    "call_price",
    "put_price",
    "drift",
    "n_sim",
    "mc_call_price",
    "mc_put_price",
    "mc_call_std",
    "mc_put_std",
    "mc_call_return_pct",
    "mc_put_return_pct",
];

#[derive(Serialize)]
struct SignalRecord<'a> {
    symbol: &'a str,
    regime: String,
    horizon: String,
    direction: String,
    entry: f64,
    stop: f64,
    take: f64,
    trailing_mult: f64,
    confidence: f64,
    rationale: &'a str,
}

#[derive(Serialize)]
struct ScoreRecord<'a> {
    rank: usize,
    symbol: &'a str,
    regime: String,
    score: f64,
}

#[derive(Serialize)]
struct OutcomeRecord<'a> {
    symbol: &'a str,
    status: &'static str,
    regime: String,
    signal_count: Option<usize>,
    reason: String,
}

#[derive(Serialize)]
struct CandidateRecord<'a> {
    symbol: &'a str,
    name: &'a str,
    price: f64,
    avg_volume_30: f64,
    sma20: Option<f64>,
    sma50: Option<f64>,
    sma200: Option<f64>,
    rsi14: Option<f64>,
    low52: f64,
    high52: f64,
    high50: f64,
    potential_target: f64,
    potential_gain_pct: f64,
    near_low: bool,
    oversold: bool,
    macd_building: bool,
    signals_count: usize,
    passed: bool,
    days_since_52w_low: Option<i64>,
    distance_from_low_pct: Option<f64>,
    resistance_50: f64,
    resistance_52: f64,
    resistance_distance_pct: Option<f64>,
    volatility_14d: Option<f64>,
    momentum_5d: Option<f64>,
}

impl<'a> From<&'a Candidate> for CandidateRecord<'a> {
    fn from(c: &'a Candidate) -> Self {
        Self {
            symbol: &c.symbol,
            name: &c.name,
            price: c.price,
            avg_volume_30: c.avg_volume_30,
            sma20: c.sma20,
            sma50: c.sma50,
            sma200: c.sma200,
            rsi14: c.rsi14,
            low52: c.low52,
            high52: c.high52,
            high50: c.high50,
            potential_target: c.potential_target,
            potential_gain_pct: c.potential_gain_pct,
            near_low: c.near_low,
            oversold: c.oversold,
            macd_building: c.macd_building,
            signals_count: c.signals_count,
            passed: c.passed,
            days_since_52w_low: c.days_since_52w_low,
            distance_from_low_pct: c.distance_from_low_pct,
            resistance_50: c.resistance_50,
            resistance_52: c.resistance_52,
            resistance_distance_pct: c.resistance_distance_pct,
            volatility_14d: c.volatility_14d,
            momentum_5d: c.momentum_5d,
        }
    }
}

#[derive(Serialize)]
struct RemovalRecord<'a> {
    symbol: &'a str,
    name: &'a str,
    reason: String,
}

#[derive(Serialize)]
struct ReviewRecord<'a> {
    symbol: &'a str,
    name: &'a str,
    reason: String,
}

impl<'a> From<&'a ReviewEntry> for ReviewRecord<'a> {
    fn from(e: &'a ReviewEntry) -> Self {
        Self {
            symbol: &e.symbol,
            name: &e.name,
            reason: e.reason.to_string(),
        }
    }
}

#[derive(Serialize)]
struct SummaryRecord<'a> {
    symbol: &'a str,
    strike: f64,
    days_to_expiry: Option<f64>,
    n_sim: usize,
    mc_call_price: f64,
    mc_put_price: f64,
    mc_call_return_pct: Option<f64>,
    mc_put_return_pct: Option<f64>,
}

impl<'a> From<&'a BacktestRow> for SummaryRecord<'a> {
    fn from(row: &'a BacktestRow) -> Self {
        Self {
            symbol: &row.candidate.symbol,
            strike: row.candidate.strike,
            days_to_expiry: row.candidate.days_to_expiry,
            n_sim: row.n_sim,
            mc_call_price: row.mc_call_price,
            mc_put_price: row.mc_put_price,
            mc_call_return_pct: row.mc_call_return_pct,
            mc_put_return_pct: row.mc_put_return_pct,
        }
    }
}

fn opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn quote_cells(quote: Option<&McQuote>) -> [String; 4] {
    match quote {
        Some(q) => [
            q.call_price.to_string(),
            q.put_price.to_string(),
            opt(q.call_expected_return),
            opt(q.put_expected_return),
        ],
        None => Default::default(),
    }
}

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    fn prepare(dir: &Path, file: &str) -> Result<PathBuf, MarketscanError> {
        fs::create_dir_all(dir)?;
        Ok(dir.join(file))
    }

    fn write_records<T: Serialize>(
        dir: &Path,
        file: &str,
        records: impl IntoIterator<Item = T>,
    ) -> Result<(), MarketscanError> {
        let path = Self::prepare(dir, file)?;
        let mut wtr = csv::Writer::from_path(&path)?;
        let mut count = 0usize;
        for record in records {
            wtr.serialize(record)?;
            count += 1;
        }
        wtr.flush()?;
        info!(path = %path.display(), rows = count, "wrote report");
        Ok(())
    }

    fn write_scores(dir: &Path, file: &str, scores: &[Score]) -> Result<(), MarketscanError> {
        Self::write_records(
            dir,
            file,
            scores.iter().enumerate().map(|(i, s)| ScoreRecord {
                rank: i + 1,
                symbol: &s.symbol,
                regime: s.regime.to_string(),
                score: s.value,
            }),
        )
    }

    fn detail_header(rows: &[&BacktestRow]) -> Vec<String> {
        let mut header: Vec<String> = BACKTEST_COLUMNS.iter().map(|c| c.to_string()).collect();
        if let Some(first) = rows.first() {
            for (name, _) in &first.candidate.extras {
                if !header.contains(name) {
                    header.push(name.clone());
                }
            }
        }
        header
    }

    fn detail_cells(row: &BacktestRow, header: &[String]) -> Vec<String> {
        let c = &row.candidate;
        let mut cells = vec![
            c.symbol.clone(),
            c.spot.to_string(),
            c.strike.to_string(),
            c.t_years.to_string(),
            c.sigma_annual.to_string(),
            opt(c.days_to_expiry),
            opt(c.predicted_spot),
            opt(c.dividend_yield),
            opt(c.call_price),
            opt(c.put_price),
            row.drift.to_string(),
            row.n_sim.to_string(),
            row.mc_call_price.to_string(),
            row.mc_put_price.to_string(),
            row.mc_call_std.to_string(),
            row.mc_put_std.to_string(),
            opt(row.mc_call_return_pct),
            opt(row.mc_put_return_pct),
        ];
        for name in &header[cells.len()..] {
            let value = c
                .extras
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
                .unwrap_or_default();
            cells.push(value);
        }
        cells
    }

    fn write_summary(rows: &[&BacktestRow], dir: &Path) -> Result<(), MarketscanError> {
        Self::write_records(
            dir,
            BACKTEST_SUMMARY_FILE,
            rows.iter().map(|row| SummaryRecord::from(*row)),
        )
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_analysis(&self, report: &AnalysisReport, dir: &Path) -> Result<(), MarketscanError> {
        Self::write_records(
            dir,
            SIGNALS_FILE,
            report.signals.iter().map(|s| SignalRecord {
                symbol: &s.symbol,
                regime: s.regime.to_string(),
                horizon: s.horizon.to_string(),
                direction: s.direction.to_string(),
                entry: s.entry,
                stop: s.stop,
                take: s.take,
                trailing_mult: s.trailing_mult,
                confidence: s.confidence,
                rationale: &s.rationale,
            }),
        )?;
        Self::write_scores(dir, LONG_TOP_FILE, &report.long_top)?;
        Self::write_scores(dir, SHORT_TOP_FILE, &report.short_top)?;
        Self::write_records(
            dir,
            OUTCOMES_FILE,
            report.outcomes.iter().map(|o| match o {
                SymbolOutcome::Analyzed {
                    symbol,
                    regime,
                    signal_count,
                } => OutcomeRecord {
                    symbol,
                    status: "analyzed",
                    regime: regime.to_string(),
                    signal_count: Some(*signal_count),
                    reason: String::new(),
                },
                SymbolOutcome::Skipped { symbol, reason } => OutcomeRecord {
                    symbol,
                    status: "skipped",
                    regime: String::new(),
                    signal_count: None,
                    reason: reason.to_string(),
                },
            }),
        )
    }

    fn write_candidates(
        &self,
        lists: &[(&str, &[Candidate])],
        removals: &[Removal],
        dir: &Path,
    ) -> Result<(), MarketscanError> {
        for (stem, rows) in lists {
            Self::write_records(
                dir,
                &format!("{}.csv", stem),
                rows.iter().map(CandidateRecord::from),
            )?;
        }
        Self::write_records(
            dir,
            REMOVALS_FILE,
            removals.iter().map(|r| RemovalRecord {
                symbol: &r.symbol,
                name: &r.name,
                reason: r.reason.to_string(),
            }),
        )
    }

    fn write_review(&self, report: &ReviewReport, dir: &Path) -> Result<(), MarketscanError> {
        Self::write_records(
            dir,
            REVIEW_INCLUDED_FILE,
            report.included.iter().map(ReviewRecord::from),
        )?;
        Self::write_records(
            dir,
            REVIEW_EXCLUDED_FILE,
            report.excluded.iter().map(ReviewRecord::from),
        )
    }

    fn write_options(&self, rows: &[EnrichedOptionRow], dir: &Path) -> Result<(), MarketscanError> {
        let path = Self::prepare(dir, OPTIONS_FILE)?;
        let mut wtr = csv::Writer::from_path(&path)?;
        wtr.write_record(OPTION_COLUMNS)?;
        for enriched in rows {
            let r = &enriched.row;
            let mut cells = vec![
                r.symbol.clone(),
                r.days_to_expiry.to_string(),
                r.t_years.to_string(),
                r.strike_pct.to_string(),
                r.strike.to_string(),
                r.spot.to_string(),
                opt(r.predicted_spot),
                opt(r.sigma_annual),
                r.call_price.to_string(),
                r.put_price.to_string(),
                opt(r.expected_return_pct),
            ];
            cells.extend(quote_cells(Some(&enriched.mc)));
            cells.push(enriched.dividend_yield.to_string());
            cells.push(enriched.recommendation.to_string());
            cells.extend(quote_cells(enriched.hp.as_ref()));
            wtr.write_record(&cells)?;
        }
        wtr.flush()?;
        info!(path = %path.display(), rows = rows.len(), "wrote option candidates");
        Ok(())
    }

    fn write_backtest(&self, report: &BacktestReport, dir: &Path) -> Result<(), MarketscanError> {
        let priced: Vec<&BacktestRow> = report.priced().collect();
        let path = Self::prepare(dir, BACKTEST_DETAIL_FILE)?;
        let mut wtr = csv::Writer::from_path(&path)?;
        let header = Self::detail_header(&priced);
        wtr.write_record(&header)?;
        for row in &priced {
            wtr.write_record(Self::detail_cells(row, &header))?;
        }
        wtr.flush()?;
        info!(
            path = %path.display(),
            rows = priced.len(),
            failed = report.failure_count(),
            "wrote backtest detail"
        );
        Self::write_summary(&priced, dir)?;

        for outcome in &report.outcomes {
            if let RowOutcome::Failed { row, symbol, reason } = outcome {
                info!(row, %symbol, %reason, "row left out of backtest output");
            }
        }
        Ok(())
    }
}
