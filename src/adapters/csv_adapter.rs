//! CSV file data adapter.
//!
//! Layout of a data directory:
//! - `<SYMBOL>.csv` with header `date,open,high,low,close,volume`
//! - optional `symbols.csv` with header `symbol,name,sector`
//! - optional `dividends.csv` with header `symbol,dividend_yield`

use crate::domain::error::MarketscanError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::{DataPort, SymbolInfo};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub const SYMBOLS_FILE: &str = "symbols.csv";
pub const DIVIDENDS_FILE: &str = "dividends.csv";

#[derive(Debug, Deserialize)]
struct BarRecord {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Debug, Deserialize)]
struct SymbolRecord {
    symbol: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    sector: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DividendRecord {
    symbol: String,
    dividend_yield: f64,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn is_metadata_file(name: &str) -> bool {
        name == SYMBOLS_FILE || name == DIVIDENDS_FILE
    }

    fn open_reader(&self, path: &PathBuf) -> Result<csv::Reader<fs::File>, MarketscanError> {
        csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| MarketscanError::Data {
                reason: format!("failed to read {}: {}", path.display(), e),
            })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(&self, symbol: &str) -> Result<Vec<OhlcvBar>, MarketscanError> {
        let path = self.csv_path(symbol);
        let mut rdr = self.open_reader(&path)?;
        let mut bars = Vec::new();

        for (line, result) in rdr.deserialize::<BarRecord>().enumerate() {
            let record = result.map_err(|e| MarketscanError::Data {
                reason: format!("{} row {}: {}", path.display(), line + 1, e),
            })?;
            let date = NaiveDate::parse_from_str(&record.date, "%Y-%m-%d").map_err(|e| {
                MarketscanError::Data {
                    reason: format!("invalid date '{}' in {}: {}", record.date, path.display(), e),
                }
            })?;
            bars.push(OhlcvBar {
                symbol: symbol.to_string(),
                date,
                open: record.open,
                high: record.high,
                low: record.low,
                close: record.close,
                volume: record.volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, MarketscanError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| MarketscanError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if Self::is_metadata_file(&name_str) {
                continue;
            }
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn fetch_names(&self) -> Result<Vec<SymbolInfo>, MarketscanError> {
        let path = self.base_path.join(SYMBOLS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut rdr = self.open_reader(&path)?;
        let mut infos = Vec::new();
        for result in rdr.deserialize::<SymbolRecord>() {
            let record = result?;
            infos.push(SymbolInfo {
                symbol: record.symbol,
                name: non_empty(record.name),
                sector: non_empty(record.sector),
            });
        }
        Ok(infos)
    }

    fn fetch_dividend_yields(&self) -> Result<HashMap<String, f64>, MarketscanError> {
        let path = self.base_path.join(DIVIDENDS_FILE);
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let mut rdr = self.open_reader(&path)?;
        let mut yields = HashMap::new();
        for result in rdr.deserialize::<DividendRecord>() {
            let record = result?;
            yields.insert(record.symbol, record.dividend_yield);
        }
        Ok(yields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        // deliberately out of order
        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000.5\n";

        fs::write(path.join("FOLD.csv"), csv_content).unwrap();
        fs::write(path.join("KHODRO.csv"), "date,open,high,low,close,volume\n").unwrap();
        fs::write(
            path.join(SYMBOLS_FILE),
            "symbol,name,sector\nFOLD,Foolad Mobarakeh,Metals\nKHODRO,,\n",
        )
        .unwrap();
        fs::write(path.join(DIVIDENDS_FILE), "symbol,dividend_yield\nFOLD,0.04\n").unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_ohlcv_returns_sorted_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_ohlcv("FOLD").unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].volume, 50000.0);
        assert_eq!(bars[2].volume, 55000.5);
        assert_eq!(bars[0].symbol, "FOLD");
    }

    #[test]
    fn fetch_ohlcv_errors_for_missing_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let err = adapter.fetch_ohlcv("XYZ").unwrap_err();
        assert!(matches!(err, MarketscanError::Data { .. }));
    }

    #[test]
    fn fetch_ohlcv_rejects_bad_date() {
        let (_dir, path) = setup_test_data();
        fs::write(
            path.join("BAD.csv"),
            "date,open,high,low,close,volume\n2024/01/15,1,1,1,1,1\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(path);
        assert!(adapter.fetch_ohlcv("BAD").is_err());
    }

    #[test]
    fn list_symbols_skips_metadata_files() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert_eq!(adapter.list_symbols().unwrap(), vec!["FOLD", "KHODRO"]);
    }

    #[test]
    fn fetch_names_reads_metadata() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let names = adapter.fetch_names().unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names[0].name.as_deref(), Some("Foolad Mobarakeh"));
        assert_eq!(names[0].sector.as_deref(), Some("Metals"));
        assert_eq!(names[1].name, None);
    }

    #[test]
    fn metadata_files_are_optional() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        assert!(adapter.fetch_names().unwrap().is_empty());
        assert!(adapter.fetch_dividend_yields().unwrap().is_empty());
    }

    #[test]
    fn dividend_yields_are_keyed_by_symbol() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let yields = adapter.fetch_dividend_yields().unwrap();
        assert_eq!(yields.get("FOLD"), Some(&0.04));
    }
}
