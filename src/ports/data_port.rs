//! Market data access port trait.

use crate::domain::error::MarketscanError;
use crate::domain::ohlcv::OhlcvBar;
use std::collections::HashMap;

/// Descriptive metadata for a listed symbol.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SymbolInfo {
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
}

pub trait DataPort {
    /// Daily bars for `symbol`, ascending by date.
    fn fetch_ohlcv(&self, symbol: &str) -> Result<Vec<OhlcvBar>, MarketscanError>;

    fn list_symbols(&self) -> Result<Vec<String>, MarketscanError>;

    /// Name and sector metadata; symbols without metadata are simply absent.
    fn fetch_names(&self) -> Result<Vec<SymbolInfo>, MarketscanError>;

    /// Continuous dividend yield per symbol; none known by default.
    fn fetch_dividend_yields(&self) -> Result<HashMap<String, f64>, MarketscanError> {
        Ok(HashMap::new())
    }
}
