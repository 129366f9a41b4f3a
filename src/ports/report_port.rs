//! Report output port trait.

use crate::domain::analyzer::AnalysisReport;
use crate::domain::error::MarketscanError;
use crate::domain::mc_backtest::BacktestReport;
use crate::domain::options::EnrichedOptionRow;
use crate::domain::screener::{Candidate, Removal, ReviewReport};
use std::path::Path;

/// Writes run results under an output directory.
pub trait ReportPort {
    fn write_analysis(&self, report: &AnalysisReport, dir: &Path) -> Result<(), MarketscanError>;

    /// `lists` pairs a file stem with its rows, e.g. `("conservative_top20", rows)`.
    fn write_candidates(
        &self,
        lists: &[(&str, &[Candidate])],
        removals: &[Removal],
        dir: &Path,
    ) -> Result<(), MarketscanError>;

    fn write_review(&self, report: &ReviewReport, dir: &Path) -> Result<(), MarketscanError>;

    fn write_options(&self, rows: &[EnrichedOptionRow], dir: &Path) -> Result<(), MarketscanError>;

    fn write_backtest(&self, report: &BacktestReport, dir: &Path) -> Result<(), MarketscanError>;
}
