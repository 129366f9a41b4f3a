//! Option candidate tables: strike × expiry grids per symbol, enriched with
//! Monte-Carlo prices and a trade recommendation.

use crate::domain::options::pricing::{
    black_scholes_price, expected_option_return, forecast_volatility, monte_carlo_price_with,
    predict_price_gbm, seeded_rng, GbmParams, OptionKind, TRADING_DAYS,
};
use rand::Rng;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct OptionsConfig {
    pub risk_free_rate: f64,
    /// Strike multipliers relative to spot.
    pub strikes: Vec<f64>,
    pub expiries: Vec<u32>,
    pub vol_window: usize,
    pub n_sim: usize,
    pub hp_n_sim: usize,
    /// Leading symbols repriced at `hp_n_sim`.
    pub hp_symbols: usize,
    pub seed: Option<u64>,
    /// Volatility assumed for simulation when none can be forecast.
    pub fallback_sigma: f64,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.02,
            strikes: vec![0.9, 1.0, 1.1],
            expiries: vec![30, 60, 90],
            vol_window: 30,
            n_sim: 2000,
            hp_n_sim: 20000,
            hp_symbols: 3,
            seed: None,
            fallback_sigma: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionRow {
    pub symbol: String,
    pub days_to_expiry: u32,
    pub t_years: f64,
    pub strike_pct: f64,
    pub strike: f64,
    pub spot: f64,
    pub predicted_spot: Option<f64>,
    pub sigma_annual: Option<f64>,
    pub call_price: f64,
    pub put_price: f64,
    /// Move of the predicted spot past the strike, relative to the strike.
    pub expected_return_pct: Option<f64>,
}

/// Closed-form grid for one symbol. Empty when there are no closes.
pub fn generate_option_table(symbol: &str, closes: &[f64], config: &OptionsConfig) -> Vec<OptionRow> {
    let Some(&spot) = closes.last() else {
        return Vec::new();
    };
    let sigma = forecast_volatility(closes, config.vol_window);
    let r = config.risk_free_rate;

    let mut rows = Vec::with_capacity(config.expiries.len() * config.strikes.len());
    for &days in &config.expiries {
        let t_years = (days as f64 / TRADING_DAYS).max(1.0 / TRADING_DAYS);
        let predicted_spot = predict_price_gbm(closes, days);
        for &strike_pct in &config.strikes {
            let strike = spot * strike_pct;
            let vol = sigma.unwrap_or(0.0);
            rows.push(OptionRow {
                symbol: symbol.to_string(),
                days_to_expiry: days,
                t_years,
                strike_pct,
                strike,
                spot,
                predicted_spot,
                sigma_annual: sigma,
                call_price: black_scholes_price(spot, strike, t_years, r, vol, OptionKind::Call),
                put_price: black_scholes_price(spot, strike, t_years, r, vol, OptionKind::Put),
                expected_return_pct: predicted_spot
                    .filter(|_| strike > 0.0)
                    .map(|p| (p - strike) / strike),
            });
        }
    }
    rows
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    StrongBuyCall,
    BuyCall,
    StrongBuyPut,
    BuyPut,
    Hold,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Recommendation::StrongBuyCall => "strong_buy_call",
            Recommendation::BuyCall => "buy_call",
            Recommendation::StrongBuyPut => "strong_buy_put",
            Recommendation::BuyPut => "buy_put",
            Recommendation::Hold => "hold",
        })
    }
}

const STRONG_EDGE: f64 = 0.20;
const EDGE: f64 = 0.05;

/// Calls are checked before puts, strong before plain.
pub fn recommend(call_return: Option<f64>, put_return: Option<f64>) -> Recommendation {
    let above = |ret: Option<f64>, threshold: f64| ret.is_some_and(|r| r > threshold);
    if above(call_return, STRONG_EDGE) {
        Recommendation::StrongBuyCall
    } else if above(call_return, EDGE) {
        Recommendation::BuyCall
    } else if above(put_return, STRONG_EDGE) {
        Recommendation::StrongBuyPut
    } else if above(put_return, EDGE) {
        Recommendation::BuyPut
    } else {
        Recommendation::Hold
    }
}

/// Monte-Carlo prices and their edge over the closed-form prices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct McQuote {
    pub call_price: f64,
    pub put_price: f64,
    pub call_expected_return: Option<f64>,
    pub put_expected_return: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedOptionRow {
    pub row: OptionRow,
    pub dividend_yield: f64,
    pub mc: McQuote,
    pub recommendation: Recommendation,
    /// Higher-precision rerun, present for prioritized symbols only.
    pub hp: Option<McQuote>,
}

fn quote<R: Rng + ?Sized>(
    row: &OptionRow,
    dividend_yield: f64,
    n_sim: usize,
    config: &OptionsConfig,
    rng: &mut R,
) -> McQuote {
    let params = GbmParams {
        spot: row.spot,
        strike: row.strike,
        t_years: row.t_years,
        rate: config.risk_free_rate,
        sigma: row.sigma_annual.unwrap_or(config.fallback_sigma),
        dividend_yield,
        drift: None,
        n_sim,
    };
    let call_price = monte_carlo_price_with(&params, OptionKind::Call, rng);
    let put_price = monte_carlo_price_with(&params, OptionKind::Put, rng);
    McQuote {
        call_price,
        put_price,
        call_expected_return: expected_option_return(call_price, row.call_price),
        put_expected_return: expected_option_return(put_price, row.put_price),
    }
}

/// Prices every row by simulation under the risk-neutral drift, then reruns
/// the rows of the first `hp_symbols` distinct symbols with `hp_n_sim` draws.
pub fn enrich_with_monte_carlo(
    rows: Vec<OptionRow>,
    dividend_yields: &HashMap<String, f64>,
    config: &OptionsConfig,
) -> Vec<EnrichedOptionRow> {
    let mut rng = seeded_rng(config.seed);

    let mut priority: Vec<&str> = Vec::new();
    for row in &rows {
        if priority.len() >= config.hp_symbols {
            break;
        }
        if !priority.contains(&row.symbol.as_str()) {
            priority.push(&row.symbol);
        }
    }
    let priority: Vec<String> = priority.into_iter().map(str::to_string).collect();

    let mut enriched: Vec<EnrichedOptionRow> = rows
        .into_iter()
        .map(|row| {
            let dividend_yield = dividend_yields.get(&row.symbol).copied().unwrap_or(0.0);
            let mc = quote(&row, dividend_yield, config.n_sim, config, &mut rng);
            let recommendation = recommend(mc.call_expected_return, mc.put_expected_return);
            EnrichedOptionRow {
                row,
                dividend_yield,
                mc,
                recommendation,
                hp: None,
            }
        })
        .collect();

    if config.hp_n_sim > 0 {
        for entry in enriched.iter_mut().filter(|e| priority.contains(&e.row.symbol)) {
            debug!(
                symbol = %entry.row.symbol,
                strike = entry.row.strike,
                days = entry.row.days_to_expiry,
                "high-precision rerun"
            );
            entry.hp = Some(quote(
                &entry.row,
                entry.dividend_yield,
                config.hp_n_sim,
                config,
                &mut rng,
            ));
        }
    }

    info!(
        rows = enriched.len(),
        high_precision = enriched.iter().filter(|e| e.hp.is_some()).count(),
        "option table enriched"
    );
    enriched
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn closes() -> Vec<f64> {
        (0..60)
            .map(|i| 100.0 * 1.002_f64.powi(i) * (1.0 + 0.02 * ((i as f64) * 1.3).sin()))
            .collect()
    }

    #[test]
    fn grid_is_expiries_by_strikes() {
        let config = OptionsConfig::default();
        let rows = generate_option_table("AAA", &closes(), &config);
        assert_eq!(rows.len(), 9);
        let spot = *closes().last().unwrap();
        assert_relative_eq!(rows[0].strike, spot * 0.9);
        assert_eq!(rows[0].days_to_expiry, 30);
        assert_eq!(rows[8].days_to_expiry, 90);
        assert_relative_eq!(rows[3].t_years, 60.0 / 252.0);
        assert!(rows.iter().all(|r| r.call_price > 0.0 && r.put_price > 0.0));

        let r = &rows[4];
        let expected = (r.predicted_spot.unwrap() - r.strike) / r.strike;
        assert_relative_eq!(r.expected_return_pct.unwrap(), expected);
    }

    #[test]
    fn zero_day_expiry_uses_one_trading_day() {
        let config = OptionsConfig {
            expiries: vec![0],
            ..OptionsConfig::default()
        };
        let rows = generate_option_table("AAA", &closes(), &config);
        assert_relative_eq!(rows[0].t_years, 1.0 / 252.0);
    }

    #[test]
    fn short_history_prices_to_zero() {
        let rows = generate_option_table("NEW", &[100.0, 101.0, 102.0], &OptionsConfig::default());
        assert!(rows.iter().all(|r| r.sigma_annual.is_none() && r.call_price == 0.0));
        assert!(generate_option_table("NONE", &[], &OptionsConfig::default()).is_empty());
    }

    #[test]
    fn recommendation_order() {
        assert_eq!(recommend(Some(0.3), Some(0.5)), Recommendation::StrongBuyCall);
        assert_eq!(recommend(Some(0.1), Some(0.5)), Recommendation::BuyCall);
        assert_eq!(recommend(None, Some(0.5)), Recommendation::StrongBuyPut);
        assert_eq!(recommend(Some(0.0), Some(0.06)), Recommendation::BuyPut);
        assert_eq!(recommend(Some(0.05), Some(0.05)), Recommendation::Hold);
        assert_eq!(Recommendation::StrongBuyPut.to_string(), "strong_buy_put");
    }

    #[test]
    fn enrichment_reprices_leading_symbols_at_high_precision() {
        let config = OptionsConfig {
            seed: Some(11),
            n_sim: 500,
            hp_n_sim: 1000,
            hp_symbols: 1,
            ..OptionsConfig::default()
        };
        let mut rows = generate_option_table("AAA", &closes(), &config);
        rows.extend(generate_option_table("BBB", &closes(), &config));
        let mut yields = HashMap::new();
        yields.insert("BBB".to_string(), 0.03);

        let enriched = enrich_with_monte_carlo(rows, &yields, &config);
        assert_eq!(enriched.len(), 18);
        assert!(enriched[..9].iter().all(|e| e.hp.is_some()));
        assert!(enriched[9..].iter().all(|e| e.hp.is_none()));
        assert_relative_eq!(enriched[9].dividend_yield, 0.03);
        assert!(enriched.iter().all(|e| e.mc.call_expected_return.is_some()));
    }

    #[test]
    fn enrichment_is_reproducible_with_seed() {
        let config = OptionsConfig {
            seed: Some(3),
            n_sim: 300,
            hp_n_sim: 0,
            ..OptionsConfig::default()
        };
        let a = enrich_with_monte_carlo(generate_option_table("A", &closes(), &config), &HashMap::new(), &config);
        let b = enrich_with_monte_carlo(generate_option_table("A", &closes(), &config), &HashMap::new(), &config);
        assert_eq!(a, b);
    }
}
