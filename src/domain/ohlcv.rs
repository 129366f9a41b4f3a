//! OHLCV bar representation.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// Traded value approximated as close * volume.
    pub fn value_traded(&self) -> f64 {
        self.close * self.volume
    }
}

/// Checks the ordering and finiteness assumptions every series must satisfy.
pub fn validate_series(bars: &[OhlcvBar]) -> Result<(), String> {
    if bars.is_empty() {
        return Err("series is empty".to_string());
    }
    for (i, bar) in bars.iter().enumerate() {
        let fields = [bar.open, bar.high, bar.low, bar.close, bar.volume];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(format!("non-finite value on {}", bar.date));
        }
        if bar.close <= 0.0 {
            return Err(format!("non-positive close on {}", bar.date));
        }
        if i > 0 && bars[i - 1].date >= bar.date {
            return Err(format!("dates not strictly ascending at {}", bar.date));
        }
    }
    Ok(())
}

pub fn closes(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
