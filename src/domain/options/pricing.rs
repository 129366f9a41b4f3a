//! Closed-form and Monte-Carlo valuation of European options.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use statrs::function::erf::erf;
use std::fmt;

pub const TRADING_DAYS: f64 = 252.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Call,
    Put,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OptionKind::Call => "call",
            OptionKind::Put => "put",
        })
    }
}

impl OptionKind {
    pub fn payoff(&self, terminal: f64, strike: f64) -> f64 {
        match self {
            OptionKind::Call => (terminal - strike).max(0.0),
            OptionKind::Put => (strike - terminal).max(0.0),
        }
    }
}

fn log_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|w| w[0] > 0.0 && w[1] > 0.0)
        .map(|w| (w[1] / w[0]).ln())
        .collect()
}

/// Annualized sample standard deviation of the trailing `window` log returns.
pub fn forecast_volatility(closes: &[f64], window: usize) -> Option<f64> {
    if closes.len() < 5 {
        return None;
    }
    let returns = log_returns(closes);
    if returns.len() < 2 {
        return None;
    }
    let w = window.min(returns.len()).max(2);
    let recent = &returns[returns.len() - w..];
    let n = recent.len() as f64;
    let mean = recent.iter().sum::<f64>() / n;
    let var = recent.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(var.sqrt() * TRADING_DAYS.sqrt())
}

/// GBM expectation `S0·exp(μT)` with μ the annualized mean log return.
pub fn predict_price_gbm(closes: &[f64], days: u32) -> Option<f64> {
    let spot = *closes.last()?;
    let returns = log_returns(closes);
    if returns.is_empty() {
        return None;
    }
    let mu_annual = returns.iter().sum::<f64>() / returns.len() as f64 * TRADING_DAYS;
    Some(spot * (mu_annual * days as f64 / TRADING_DAYS).exp())
}

pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

fn degenerate(spot: f64, strike: f64, t_years: f64, sigma: f64) -> bool {
    !(t_years > 0.0 && sigma > 0.0 && spot > 0.0 && strike > 0.0)
}

/// European Black-Scholes price; 0 for non-positive or non-finite inputs.
pub fn black_scholes_price(
    spot: f64,
    strike: f64,
    t_years: f64,
    rate: f64,
    sigma: f64,
    kind: OptionKind,
) -> f64 {
    if degenerate(spot, strike, t_years, sigma) {
        return 0.0;
    }
    let vol_t = sigma * t_years.sqrt();
    let d1 = ((spot / strike).ln() + (rate + 0.5 * sigma * sigma) * t_years) / vol_t;
    let d2 = d1 - vol_t;
    let discount = (-rate * t_years).exp();
    match kind {
        OptionKind::Call => spot * norm_cdf(d1) - strike * discount * norm_cdf(d2),
        OptionKind::Put => strike * discount * norm_cdf(-d2) - spot * norm_cdf(-d1),
    }
}

/// Inputs of a terminal-price GBM simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GbmParams {
    pub spot: f64,
    pub strike: f64,
    pub t_years: f64,
    pub rate: f64,
    pub sigma: f64,
    pub dividend_yield: f64,
    /// Annual drift; `None` means risk-neutral `rate - dividend_yield`.
    pub drift: Option<f64>,
    pub n_sim: usize,
}

impl GbmParams {
    pub fn drift(&self) -> f64 {
        self.drift.unwrap_or(self.rate - self.dividend_yield)
    }

    pub fn discount(&self) -> f64 {
        (-self.rate * self.t_years).exp()
    }
}

/// Seeded generator, or an entropy-seeded one when `seed` is `None`.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Draws `n` terminal prices `S0·exp((μ−σ²/2)T + σ√T·Z)`.
pub fn sample_terminal_prices<R: Rng + ?Sized>(
    rng: &mut R,
    spot: f64,
    drift: f64,
    sigma: f64,
    t_years: f64,
    n: usize,
) -> Vec<f64> {
    let mean = (drift - 0.5 * sigma * sigma) * t_years;
    let scale = sigma * t_years.sqrt();
    (0..n)
        .map(|_| {
            let z: f64 = rng.sample(StandardNormal);
            spot * (mean + scale * z).exp()
        })
        .collect()
}

/// Discounted mean payoff over simulated terminal prices.
pub fn monte_carlo_price_with<R: Rng + ?Sized>(
    params: &GbmParams,
    kind: OptionKind,
    rng: &mut R,
) -> f64 {
    if degenerate(params.spot, params.strike, params.t_years, params.sigma) || params.n_sim == 0 {
        return 0.0;
    }
    let prices = sample_terminal_prices(
        rng,
        params.spot,
        params.drift(),
        params.sigma,
        params.t_years,
        params.n_sim,
    );
    let mean_payoff =
        prices.iter().map(|s| kind.payoff(*s, params.strike)).sum::<f64>() / prices.len() as f64;
    params.discount() * mean_payoff
}

/// Monte-Carlo price; identical `seed` values reproduce identical prices.
pub fn monte_carlo_option_price(params: &GbmParams, kind: OptionKind, seed: Option<u64>) -> f64 {
    monte_carlo_price_with(params, kind, &mut seeded_rng(seed))
}

/// `(model − market) / market`; `None` without a usable market price.
pub fn expected_option_return(model_price: f64, market_price: f64) -> Option<f64> {
    if market_price.is_finite() && market_price > 0.0 && model_price.is_finite() {
        Some((model_price - market_price) / market_price)
    } else {
        None
    }
}
