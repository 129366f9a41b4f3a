//! Reads option candidate tables for the Monte-Carlo backtester.
//!
//! Columns are matched by header name. Unknown columns are kept, in order, as
//! passthrough values on each candidate.

use crate::domain::error::MarketscanError;
use crate::domain::mc_backtest::OptionCandidate;
use std::path::Path;

pub const REQUIRED_COLUMNS: [&str; 5] = ["symbol", "spot", "strike", "T_years", "sigma_annual"];
pub const OPTIONAL_COLUMNS: [&str; 5] = [
    "call_price",
    "put_price",
    "predicted_spot",
    "dividend_yield",
    "days_to_expiry",
];

/// Blank or unparseable cells become NaN so the row fails validation later
/// instead of aborting the whole file.
fn number(record: &csv::StringRecord, idx: usize) -> f64 {
    record
        .get(idx)
        .map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

fn optional(record: &csv::StringRecord, idx: Option<usize>) -> Option<f64> {
    idx.map(|i| number(record, i)).filter(|v| v.is_finite())
}

pub fn read_option_candidates(path: &Path) -> Result<Vec<OptionCandidate>, MarketscanError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| MarketscanError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
    let headers = rdr.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h == name);

    let mut required = [0usize; 5];
    for (slot, name) in required.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = position(name).ok_or_else(|| MarketscanError::Data {
            reason: format!("{} is missing required column '{}'", path.display(), name),
        })?;
    }
    let [symbol_idx, spot_idx, strike_idx, t_idx, sigma_idx] = required;
    let [call_idx, put_idx, predicted_idx, dividend_idx, days_idx] =
        OPTIONAL_COLUMNS.map(|name| position(name));

    let extra_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !REQUIRED_COLUMNS.contains(h) && !OPTIONAL_COLUMNS.contains(h))
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    let mut candidates = Vec::new();
    for result in rdr.records() {
        let record = result?;
        candidates.push(OptionCandidate {
            symbol: record.get(symbol_idx).unwrap_or_default().trim().to_string(),
            spot: number(&record, spot_idx),
            strike: number(&record, strike_idx),
            t_years: number(&record, t_idx),
            sigma_annual: number(&record, sigma_idx),
            call_price: optional(&record, call_idx),
            put_price: optional(&record, put_idx),
            predicted_spot: optional(&record, predicted_idx),
            dividend_yield: optional(&record, dividend_idx),
            days_to_expiry: optional(&record, days_idx),
            extras: extra_columns
                .iter()
                .map(|(i, name)| (name.clone(), record.get(*i).unwrap_or_default().to_string()))
                .collect(),
        });
    }
    Ok(candidates)
}
