//! Configuration validation.
//!
//! Checks every configured value before a run starts, so the analytical core
//! never sees an out-of-range weight, threshold or simulation count.

use crate::domain::error::MarketscanError;
use crate::ports::config_port::ConfigPort;
use std::str::FromStr;

pub const REGIME_SECTIONS: [&str; 3] = ["weights.bull", "weights.bear", "weights.neutral"];
pub const WEIGHT_KEYS: [&str; 5] = ["wm", "wt", "wb", "wr", "wl"];

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> MarketscanError {
    MarketscanError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Reads a raw numeric value, failing on text that does not parse. A missing
/// key is `Ok(None)`.
fn raw_number<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, MarketscanError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(section, key, format!("'{}' is not a number", s.trim()))),
    }
}

fn check_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    accept: impl Fn(f64) -> bool,
    reason: &str,
) -> Result<(), MarketscanError> {
    match raw_number::<f64>(config, section, key)? {
        Some(v) if !v.is_finite() || !accept(v) => Err(invalid(section, key, reason)),
        _ => Ok(()),
    }
}

fn check_count(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    minimum: i64,
) -> Result<(), MarketscanError> {
    match raw_number::<i64>(config, section, key)? {
        Some(v) if v < minimum => Err(invalid(
            section,
            key,
            format!("{} must be at least {}", key, minimum),
        )),
        _ => Ok(()),
    }
}

/// Comma-separated list of values; `Ok(None)` when the key is absent.
pub fn parse_list<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<Vec<T>>, MarketscanError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(None);
    };
    let mut values = Vec::new();
    for token in raw.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(invalid(section, key, "empty token in list"));
        }
        values.push(
            trimmed
                .parse::<T>()
                .map_err(|_| invalid(section, key, format!("cannot parse '{}'", trimmed)))?,
        );
    }
    Ok(Some(values))
}

/// Optional non-negative seed.
pub fn parse_seed(
    config: &dyn ConfigPort,
    section: &str,
) -> Result<Option<u64>, MarketscanError> {
    raw_number::<u64>(config, section, "seed")
}

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), MarketscanError> {
    for section in REGIME_SECTIONS {
        for key in WEIGHT_KEYS {
            check_double(config, section, key, |v| v >= 0.0, "weight must be non-negative")?;
        }
    }
    check_count(config, "analysis", "min_history_days", 1)?;
    check_count(config, "analysis", "top_n", 1)?;
    check_double(
        config,
        "liquidity",
        "min_value_traded",
        |v| v >= 0.0,
        "min_value_traded must be non-negative",
    )?;
    check_double(
        config,
        "liquidity",
        "penalty_factor",
        |v| v >= 0.0,
        "penalty_factor must be non-negative",
    )?;
    check_double(
        config,
        "filters",
        "limit_buffer_pct",
        |v| v >= 0.0,
        "limit_buffer_pct must be non-negative",
    )?;
    Ok(())
}

pub fn validate_screener_config(config: &dyn ConfigPort) -> Result<(), MarketscanError> {
    check_count(config, "screener", "universe_size", 1)?;
    check_count(config, "screener", "min_history", 1)?;
    check_count(config, "screener", "target_size", 1)?;
    check_double(
        config,
        "screener",
        "min_gain",
        |v| (0.0..1.0).contains(&v),
        "min_gain must be between 0 and 1",
    )?;
    Ok(())
}

pub fn validate_options_config(config: &dyn ConfigPort) -> Result<(), MarketscanError> {
    check_double(
        config,
        "options",
        "risk_free_rate",
        |v| (0.0..1.0).contains(&v),
        "risk_free_rate must be between 0 and 1",
    )?;
    if let Some(strikes) = parse_list::<f64>(config, "options", "strikes")? {
        if strikes.is_empty() || strikes.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(invalid("options", "strikes", "strike multipliers must be positive"));
        }
    }
    parse_list::<u32>(config, "options", "expiries")?;
    check_count(config, "options", "n_sim", 1)?;
    check_count(config, "options", "hp_n_sim", 0)?;
    check_count(config, "options", "hp_symbols", 0)?;
    check_count(config, "options", "vol_window", 2)?;
    check_double(
        config,
        "options",
        "fallback_sigma",
        |v| v >= 0.0,
        "fallback_sigma must be non-negative",
    )?;
    parse_seed(config, "options")?;
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), MarketscanError> {
    check_count(config, "backtest", "n_sim", 1)?;
    check_double(
        config,
        "backtest",
        "risk_free_rate",
        |v| (0.0..1.0).contains(&v),
        "risk_free_rate must be between 0 and 1",
    )?;
    check_count(config, "backtest", "hp_n_sim", 1)?;
    parse_list::<String>(config, "backtest", "hp_symbols")?;
    parse_seed(config, "backtest")?;
    Ok(())
}

/// Every section in one pass, as the `validate` command runs it.
pub fn validate_all(config: &dyn ConfigPort) -> Result<(), MarketscanError> {
    validate_analysis_config(config)?;
    validate_screener_config(config)?;
    validate_options_config(config)?;
    validate_backtest_config(config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn empty_config_uses_defaults_and_passes() {
        assert!(validate_all(&make_config("")).is_ok());
    }

    #[test]
    fn full_config_passes() {
        let config = make_config(
            r#"
[weights.bull]
wm = 0.3
wt = 0.35
wb = 0.25
wr = 0.07
wl = 0.03

[analysis]
min_history_days = 260
top_n = 20

[liquidity]
min_value_traded = 1.5e9
penalty_factor = 0.5

[filters]
avoid_limit_up_down = true
limit_buffer_pct = 0.5

[screener]
min_gain = 0.25
universe_size = 800

[options]
strikes = 0.9, 1.0, 1.1
expiries = 30,60,90
seed = 42

[backtest]
n_sim = 5000
risk_free_rate = 0.02
"#,
        );
        assert!(validate_all(&config).is_ok());
    }

    #[test]
    fn negative_weight_fails() {
        let config = make_config("[weights.bear]\nwr = -0.1\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, MarketscanError::ConfigInvalid { section, key, .. }
            if section == "weights.bear" && key == "wr"));
    }

    #[test]
    fn non_numeric_weight_fails() {
        let config = make_config("[weights.neutral]\nwm = heavy\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, MarketscanError::ConfigInvalid { key, .. } if key == "wm"));
    }

    #[test]
    fn zero_top_n_fails() {
        let config = make_config("[analysis]\ntop_n = 0\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, MarketscanError::ConfigInvalid { key, .. } if key == "top_n"));
    }

    #[test]
    fn min_gain_of_one_fails() {
        let config = make_config("[screener]\nmin_gain = 1.0\n");
        let err = validate_screener_config(&config).unwrap_err();
        assert!(matches!(err, MarketscanError::ConfigInvalid { key, .. } if key == "min_gain"));
    }

    #[test]
    fn bad_strike_list_fails() {
        let config = make_config("[options]\nstrikes = 0.9,,1.1\n");
        assert!(validate_options_config(&config).is_err());
        let config = make_config("[options]\nstrikes = 0.9,-1\n");
        let err = validate_options_config(&config).unwrap_err();
        assert!(matches!(err, MarketscanError::ConfigInvalid { key, .. } if key == "strikes"));
    }

    #[test]
    fn negative_seed_fails() {
        let config = make_config("[backtest]\nseed = -4\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, MarketscanError::ConfigInvalid { key, .. } if key == "seed"));
    }

    #[test]
    fn zero_simulations_fail() {
        let config = make_config("[backtest]\nn_sim = 0\n");
        assert!(validate_backtest_config(&config).is_err());
    }

    #[test]
    fn parse_list_reads_values() {
        let config = make_config("[options]\nexpiries = 30, 60 ,90\n");
        let expiries: Vec<u32> = parse_list(&config, "options", "expiries").unwrap().unwrap();
        assert_eq!(expiries, vec![30, 60, 90]);
        assert!(parse_list::<u32>(&config, "options", "missing").unwrap().is_none());
    }
}
