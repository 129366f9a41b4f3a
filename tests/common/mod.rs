#![allow(dead_code)]

use chrono::NaiveDate;
use marketscan::domain::error::MarketscanError;
pub use marketscan::domain::ohlcv::OhlcvBar;
use marketscan::ports::data_port::{DataPort, SymbolInfo};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

pub struct MockDataPort {
    pub data: BTreeMap<String, Vec<OhlcvBar>>,
    pub infos: Vec<SymbolInfo>,
    pub errors: HashMap<String, String>,
    pub dividends: HashMap<String, f64>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
            infos: Vec::new(),
            errors: HashMap::new(),
            dividends: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_info(mut self, symbol: &str, name: Option<&str>, sector: Option<&str>) -> Self {
        self.infos.push(SymbolInfo {
            symbol: symbol.to_string(),
            name: name.map(str::to_string),
            sector: sector.map(str::to_string),
        });
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.data.entry(symbol.to_string()).or_default();
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(&self, symbol: &str) -> Result<Vec<OhlcvBar>, MarketscanError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(MarketscanError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, MarketscanError> {
        Ok(self.data.keys().cloned().collect())
    }

    fn fetch_names(&self) -> Result<Vec<SymbolInfo>, MarketscanError> {
        Ok(self.infos.clone())
    }

    fn fetch_dividend_yields(&self) -> Result<HashMap<String, f64>, MarketscanError> {
        Ok(self.dividends.clone())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive daily bars with a 2% intraday range around each close.
pub fn bars_from_closes(symbol: &str, closes: &[f64], volume: f64) -> Vec<OhlcvBar> {
    let start = date(2021, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            symbol: symbol.to_string(),
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume,
        })
        .collect()
}

/// Compounding drift with a small alternating wiggle so every indicator warms.
pub fn trending_bars(symbol: &str, count: usize, start: f64, daily_drift: f64) -> Vec<OhlcvBar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| {
            let wiggle = if i % 2 == 0 { 1.002 } else { 0.998 };
            start * (1.0 + daily_drift).powi(i as i32) * wiggle
        })
        .collect();
    bars_from_closes(symbol, &closes, 1_000_000.0)
}

/// A year of steady gains followed by a sharp sell-off into the lows.
pub fn sold_off_bars(symbol: &str) -> Vec<OhlcvBar> {
    let mut closes: Vec<f64> = (0..80).map(|i| 100.0 + i as f64 * 0.625).collect();
    closes.extend((0..40).map(|i| 150.0 - i as f64 * 1.2));
    bars_from_closes(symbol, &closes, 50_000.0)
}

pub fn write_bars_csv(dir: &Path, symbol: &str, bars: &[OhlcvBar]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
}

pub fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap();
    rdr.records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}
