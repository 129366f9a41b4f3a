//! Option valuation: Black-Scholes, GBM Monte-Carlo and candidate tables.

pub mod pricing;
pub mod table;

pub use pricing::{
    black_scholes_price, expected_option_return, forecast_volatility, monte_carlo_option_price,
    norm_cdf, predict_price_gbm, seeded_rng, GbmParams, OptionKind,
};
pub use table::{
    enrich_with_monte_carlo, generate_option_table, recommend, EnrichedOptionRow, McQuote,
    OptionRow, OptionsConfig, Recommendation,
};
