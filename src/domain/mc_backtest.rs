//! Monte-Carlo replay of an option candidate table.
//!
//! Each row is simulated independently under GBM with a drift implied by its
//! predicted spot. A row that cannot be simulated becomes a
//! [`RowOutcome::Failed`] and the batch carries on.

use crate::domain::options::pricing::{expected_option_return, sample_terminal_prices, seeded_rng};
use rand::Rng;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct OptionCandidate {
    pub symbol: String,
    pub spot: f64,
    pub strike: f64,
    pub t_years: f64,
    pub sigma_annual: f64,
    pub call_price: Option<f64>,
    pub put_price: Option<f64>,
    pub predicted_spot: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub days_to_expiry: Option<f64>,
    /// Unrecognised columns, kept in input order.
    pub extras: Vec<(String, String)>,
}

impl OptionCandidate {
    fn check(&self) -> Result<(), String> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(format!("{} must be positive and finite, got {}", name, v))
            }
        };
        positive("spot", self.spot)?;
        positive("strike", self.strike)?;
        positive("T_years", self.t_years)?;
        if !self.sigma_annual.is_finite() || self.sigma_annual < 0.0 {
            return Err(format!(
                "sigma_annual must be non-negative and finite, got {}",
                self.sigma_annual
            ));
        }
        Ok(())
    }

    /// ln(predicted/spot)/T when a positive prediction exists, else 0, less the
    /// dividend yield.
    pub fn implied_drift(&self) -> f64 {
        let mu = match self.predicted_spot {
            Some(p) if p.is_finite() && p > 0.0 => (p / self.spot).ln() / self.t_years,
            _ => 0.0,
        };
        mu - self.dividend_yield.filter(|q| q.is_finite()).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HighPrecisionSet {
    pub symbols: Vec<String>,
    pub n_sim: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub n_sim: usize,
    pub risk_free_rate: f64,
    pub seed: Option<u64>,
    pub high_precision: Option<HighPrecisionSet>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            n_sim: 5000,
            risk_free_rate: 0.02,
            seed: None,
            high_precision: None,
        }
    }
}

impl BacktestConfig {
    pub fn draws_for(&self, symbol: &str) -> usize {
        match &self.high_precision {
            Some(hp) if hp.symbols.iter().any(|s| s == symbol) => hp.n_sim,
            _ => self.n_sim,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRow {
    pub candidate: OptionCandidate,
    pub drift: f64,
    pub n_sim: usize,
    pub mc_call_price: f64,
    pub mc_put_price: f64,
    pub mc_call_std: f64,
    pub mc_put_std: f64,
    pub mc_call_return_pct: Option<f64>,
    pub mc_put_return_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Priced(BacktestRow),
    Failed {
        row: usize,
        symbol: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct BacktestReport {
    pub outcomes: Vec<RowOutcome>,
}

impl BacktestReport {
    pub fn priced(&self) -> impl Iterator<Item = &BacktestRow> {
        self.outcomes.iter().filter_map(|o| match o {
            RowOutcome::Priced(row) => Some(row),
            RowOutcome::Failed { .. } => None,
        })
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RowOutcome::Failed { .. }))
            .count()
    }
}

/// Discounted mean and population std of the payoffs.
fn discounted_stats(payoffs: impl Iterator<Item = f64>, discount: f64) -> (f64, f64) {
    let values: Vec<f64> = payoffs.collect();
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (discount * mean, discount * var.sqrt())
}

fn simulate_row<R: Rng + ?Sized>(
    candidate: &OptionCandidate,
    config: &BacktestConfig,
    rng: &mut R,
) -> Result<BacktestRow, String> {
    candidate.check()?;
    let n_sim = config.draws_for(&candidate.symbol);
    if n_sim == 0 {
        return Err("simulation count is zero".to_string());
    }
    let drift = candidate.implied_drift();
    let terminal = sample_terminal_prices(
        rng,
        candidate.spot,
        drift,
        candidate.sigma_annual,
        candidate.t_years,
        n_sim,
    );
    let discount = (-config.risk_free_rate * candidate.t_years).exp();
    let k = candidate.strike;
    let (mc_call_price, mc_call_std) =
        discounted_stats(terminal.iter().map(|s| (s - k).max(0.0)), discount);
    let (mc_put_price, mc_put_std) =
        discounted_stats(terminal.iter().map(|s| (k - s).max(0.0)), discount);

    Ok(BacktestRow {
        candidate: candidate.clone(),
        drift,
        n_sim,
        mc_call_price,
        mc_put_price,
        mc_call_std,
        mc_put_std,
        mc_call_return_pct: candidate
            .call_price
            .and_then(|m| expected_option_return(mc_call_price, m)),
        mc_put_return_pct: candidate
            .put_price
            .and_then(|m| expected_option_return(mc_put_price, m)),
    })
}

pub fn run_backtest(candidates: &[OptionCandidate], config: &BacktestConfig) -> BacktestReport {
    let mut rng = seeded_rng(config.seed);
    let mut report = BacktestReport::default();

    for (i, candidate) in candidates.iter().enumerate() {
        match simulate_row(candidate, config, &mut rng) {
            Ok(row) => report.outcomes.push(RowOutcome::Priced(row)),
            Err(reason) => {
                warn!(row = i, symbol = %candidate.symbol, %reason, "backtest row failed");
                report.outcomes.push(RowOutcome::Failed {
                    row: i,
                    symbol: candidate.symbol.clone(),
                    reason,
                });
            }
        }
    }

    let failed = report.failure_count();
    if failed > 0 {
        warn!(failed, total = candidates.len(), "some backtest rows were skipped");
    }
    info!(
        priced = report.outcomes.len() - failed,
        n_sim = config.n_sim,
        "backtest complete"
    );
    report
}
