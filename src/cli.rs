//! CLI definition and dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::option_csv_adapter::read_option_candidates;
use crate::adapters::symbol_rules::SymbolRuleSet;
use crate::domain::analyzer::{analyze_universe, UniverseInput};
use crate::domain::config::{
    AnalysisConfig, FilterConfig, LiquidityConfig, RegimeWeights, ScoreWeights,
    EQUAL_WEIGHT_INDEX_KEY, MARKET_INDEX_KEY,
};
use crate::domain::config_validation::{
    parse_list, parse_seed, validate_all, validate_analysis_config, validate_backtest_config,
    validate_options_config, validate_screener_config, REGIME_SECTIONS,
};
use crate::domain::error::MarketscanError;
use crate::domain::mc_backtest::{run_backtest, BacktestConfig, HighPrecisionSet};
use crate::domain::ohlcv::{closes, OhlcvBar};
use crate::domain::options::{enrich_with_monte_carlo, generate_option_table, OptionsConfig};
use crate::domain::screener::{
    bottom_sharp, growth_candidates, review_universe, screen_universe, ScreenInput,
    ScreenerConfig,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::{DataPort, SymbolInfo};
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "marketscan",
    about = "Regime-aware equity signals, bottom screens and option valuation"
)]
pub struct Cli {
    /// Log at DEBUG level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Which minimum-gain threshold the screen applies.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    /// `[screener] min_gain` as configured
    Configured,
    Conservative,
    Aggressive,
}

impl Preset {
    pub fn label(&self) -> &'static str {
        match self {
            Preset::Configured => "configured",
            Preset::Conservative => "conservative",
            Preset::Aggressive => "aggressive",
        }
    }

    pub fn apply(&self, config: ScreenerConfig) -> ScreenerConfig {
        let min_gain = match self {
            Preset::Configured => config.min_gain,
            Preset::Conservative => ScreenerConfig::conservative().min_gain,
            Preset::Aggressive => ScreenerConfig::aggressive().min_gain,
        };
        ScreenerConfig { min_gain, ..config }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify regimes, emit signals and rank the universe long and short
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data_dir: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Run the bottom-seeking screen and write candidate lists
    Screen {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data_dir: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, value_enum, default_value_t = Preset::Configured)]
        preset: Preset,
    },
    /// List which symbols the screen keeps and why the others are dropped
    Review {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data_dir: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Build option candidate tables priced in closed form and by simulation
    Options {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data_dir: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Comma-separated symbols; defaults to the screen's top list
        #[arg(long)]
        symbols: Option<String>,
    },
    /// Replay an option candidate table under Monte-Carlo simulation
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Option candidate CSV, as written by `options`
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Analyze {
            config,
            data_dir,
            output,
        } => run_analyze(&config, &data_dir, &output),
        Command::Screen {
            config,
            data_dir,
            output,
            preset,
        } => run_screen(&config, &data_dir, &output, preset),
        Command::Review {
            config,
            data_dir,
            output,
        } => run_review(&config, &data_dir, &output),
        Command::Options {
            config,
            data_dir,
            output,
            symbols,
        } => run_options(&config, &data_dir, &output, symbols.as_deref()),
        Command::Backtest {
            config,
            input,
            output,
        } => run_backtest_command(&config, &input, &output),
        Command::Validate { config } => run_validate(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, MarketscanError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

fn count(config: &dyn ConfigPort, section: &str, key: &str, default: usize) -> usize {
    usize::try_from(config.get_int(section, key, default as i64)).unwrap_or(default)
}

fn build_weights(config: &dyn ConfigPort, section: &str, base: ScoreWeights) -> ScoreWeights {
    ScoreWeights {
        wm: config.get_double(section, "wm", base.wm),
        wt: config.get_double(section, "wt", base.wt),
        wb: config.get_double(section, "wb", base.wb),
        wr: config.get_double(section, "wr", base.wr),
        wl: config.get_double(section, "wl", base.wl),
    }
}

pub fn build_analysis_config(config: &dyn ConfigPort) -> Result<AnalysisConfig, MarketscanError> {
    validate_analysis_config(config)?;
    let defaults = AnalysisConfig::default();
    let [bull, bear, neutral] = REGIME_SECTIONS;
    Ok(AnalysisConfig {
        weights: RegimeWeights {
            bull: build_weights(config, bull, defaults.weights.bull),
            bear: build_weights(config, bear, defaults.weights.bear),
            neutral: build_weights(config, neutral, defaults.weights.neutral),
        },
        min_history_days: count(config, "analysis", "min_history_days", defaults.min_history_days),
        top_n: count(config, "analysis", "top_n", defaults.top_n),
        liquidity: LiquidityConfig {
            min_value_traded: config.get_double(
                "liquidity",
                "min_value_traded",
                defaults.liquidity.min_value_traded,
            ),
            penalty_factor: config.get_double(
                "liquidity",
                "penalty_factor",
                defaults.liquidity.penalty_factor,
            ),
        },
        filters: FilterConfig {
            avoid_limit_up_down: config.get_bool(
                "filters",
                "avoid_limit_up_down",
                defaults.filters.avoid_limit_up_down,
            ),
            limit_buffer_pct: config.get_double(
                "filters",
                "limit_buffer_pct",
                defaults.filters.limit_buffer_pct,
            ),
        },
        indicators: defaults.indicators,
    })
}

pub fn build_screener_config(config: &dyn ConfigPort) -> Result<ScreenerConfig, MarketscanError> {
    validate_screener_config(config)?;
    let defaults = ScreenerConfig::default();
    let name_blacklist = parse_list::<String>(config, "screener", "name_blacklist")?
        .unwrap_or(defaults.name_blacklist);
    Ok(ScreenerConfig {
        universe_size: count(config, "screener", "universe_size", defaults.universe_size),
        min_gain: config.get_double("screener", "min_gain", defaults.min_gain),
        min_history: count(config, "screener", "min_history", defaults.min_history),
        target_size: count(config, "screener", "target_size", defaults.target_size),
        name_blacklist,
    })
}

pub fn build_options_config(config: &dyn ConfigPort) -> Result<OptionsConfig, MarketscanError> {
    validate_options_config(config)?;
    let defaults = OptionsConfig::default();
    Ok(OptionsConfig {
        risk_free_rate: config.get_double("options", "risk_free_rate", defaults.risk_free_rate),
        strikes: parse_list(config, "options", "strikes")?.unwrap_or(defaults.strikes),
        expiries: parse_list(config, "options", "expiries")?.unwrap_or(defaults.expiries),
        vol_window: count(config, "options", "vol_window", defaults.vol_window),
        n_sim: count(config, "options", "n_sim", defaults.n_sim),
        hp_n_sim: count(config, "options", "hp_n_sim", defaults.hp_n_sim),
        hp_symbols: count(config, "options", "hp_symbols", defaults.hp_symbols),
        seed: parse_seed(config, "options")?,
        fallback_sigma: config.get_double("options", "fallback_sigma", defaults.fallback_sigma),
    })
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, MarketscanError> {
    validate_backtest_config(config)?;
    let defaults = BacktestConfig::default();
    let n_sim = count(config, "backtest", "n_sim", defaults.n_sim);
    let high_precision = parse_list::<String>(config, "backtest", "hp_symbols")?
        .filter(|symbols| !symbols.is_empty())
        .map(|symbols| HighPrecisionSet {
            symbols,
            n_sim: count(config, "backtest", "hp_n_sim", n_sim),
        });
    Ok(BacktestConfig {
        n_sim,
        risk_free_rate: config.get_double("backtest", "risk_free_rate", defaults.risk_free_rate),
        seed: parse_seed(config, "backtest")?,
        high_precision,
    })
}

pub fn build_symbol_rules(config: &dyn ConfigPort) -> Result<SymbolRuleSet, MarketscanError> {
    SymbolRuleSet::from_config(config)
}

fn is_index_key(symbol: &str) -> bool {
    symbol == MARKET_INDEX_KEY || symbol == EQUAL_WEIGHT_INDEX_KEY
}

/// A symbol that survived ingestion.
#[derive(Debug, Clone)]
pub struct LoadedSymbol {
    pub symbol: String,
    pub name: Option<String>,
    pub bars: Vec<OhlcvBar>,
}

/// Loads every listed symbol, dropping those the rule-set excludes and those
/// whose file cannot be read. Index series bypass the rules.
pub fn load_symbols(
    data_port: &dyn DataPort,
    rules: &SymbolRuleSet,
) -> Result<Vec<LoadedSymbol>, MarketscanError> {
    let infos: HashMap<String, SymbolInfo> = data_port
        .fetch_names()?
        .into_iter()
        .map(|info| (info.symbol.clone(), info))
        .collect();

    let mut loaded = Vec::new();
    let mut excluded = 0usize;
    for symbol in data_port.list_symbols()? {
        let info = infos.get(&symbol).cloned().unwrap_or_else(|| SymbolInfo {
            symbol: symbol.clone(),
            ..SymbolInfo::default()
        });
        if !is_index_key(&symbol) {
            if let Some(category) = rules.exclusion_for(&info) {
                info!(symbol = %symbol, category, "excluded by symbol rules");
                excluded += 1;
                continue;
            }
        }
        match data_port.fetch_ohlcv(&symbol) {
            Ok(bars) => loaded.push(LoadedSymbol {
                symbol,
                name: info.name,
                bars,
            }),
            Err(e) => warn!(symbol = %symbol, error = %e, "skipping unreadable symbol"),
        }
    }
    info!(loaded = loaded.len(), excluded, "symbols loaded");
    Ok(loaded)
}

fn screen_inputs(loaded: Vec<LoadedSymbol>) -> Vec<ScreenInput> {
    loaded
        .into_iter()
        .filter(|s| !is_index_key(&s.symbol))
        .map(|s| ScreenInput {
            symbol: s.symbol,
            name: s.name,
            bars: s.bars,
        })
        .collect()
}

fn load_data(
    config: &dyn ConfigPort,
    data_dir: &Path,
) -> Result<Vec<LoadedSymbol>, MarketscanError> {
    let rules = build_symbol_rules(config)?;
    let adapter = CsvAdapter::new(data_dir.to_path_buf());
    let loaded = load_symbols(&adapter, &rules)?;
    if loaded.iter().all(|s| is_index_key(&s.symbol)) {
        return Err(MarketscanError::InsufficientData {
            symbol: data_dir.display().to_string(),
            bars: 0,
            minimum: 1,
        });
    }
    Ok(loaded)
}

fn run_analyze(config_path: &Path, data_dir: &Path, output: &Path) -> Result<(), MarketscanError> {
    let config = load_config(config_path)?;
    let analysis = build_analysis_config(&config)?;
    let loaded = load_data(&config, data_dir)?;

    let input = UniverseInput {
        symbols: loaded
            .into_iter()
            .map(|s| (s.symbol, s.bars))
            .collect::<BTreeMap<_, _>>(),
        indices: None,
    };
    let report = analyze_universe(&input, &analysis)?;

    eprintln!(
        "Analyzed {} of {} symbols: {} signals",
        report.analyzed_count(),
        report.outcomes.len(),
        report.signals.len()
    );
    for (label, top) in [("long", &report.long_top), ("short", &report.short_top)] {
        if let Some(best) = top.first() {
            eprintln!("  top {}: {} ({:.3}, {})", label, best.symbol, best.value, best.regime);
        }
    }

    CsvReportAdapter::new().write_analysis(&report, output)?;
    eprintln!("Reports written to: {}", output.display());
    Ok(())
}

fn run_screen(
    config_path: &Path,
    data_dir: &Path,
    output: &Path,
    preset: Preset,
) -> Result<(), MarketscanError> {
    let config = load_config(config_path)?;
    let screener = preset.apply(build_screener_config(&config)?);
    let inputs = screen_inputs(load_data(&config, data_dir)?);

    let result = screen_universe(&inputs, &screener);
    let top = result.top(screener.target_size);
    let growth = growth_candidates(&result.universe);
    let sharp = bottom_sharp(&result.universe);

    eprintln!(
        "Screened {} symbols: {} passed at min_gain {:.2}, {} removed",
        result.universe.len(),
        result.candidates.len(),
        screener.min_gain,
        result.removals.len()
    );

    let top_stem = format!("{}_top{}", preset.label(), screener.target_size);
    CsvReportAdapter::new().write_candidates(
        &[
            (top_stem.as_str(), top.as_slice()),
            ("screen_universe", result.universe.as_slice()),
            ("growth_candidates", growth.as_slice()),
            ("bottom_sharp", sharp.as_slice()),
        ],
        &result.removals,
        output,
    )?;
    eprintln!("Candidate lists written to: {}", output.display());
    Ok(())
}

fn run_review(config_path: &Path, data_dir: &Path, output: &Path) -> Result<(), MarketscanError> {
    let config = load_config(config_path)?;
    let screener = build_screener_config(&config)?;
    let inputs = screen_inputs(load_data(&config, data_dir)?);

    let report = review_universe(&inputs, &screener);
    eprintln!(
        "Review: {} included, {} excluded",
        report.included.len(),
        report.excluded.len()
    );
    CsvReportAdapter::new().write_review(&report, output)?;
    Ok(())
}

fn run_options(
    config_path: &Path,
    data_dir: &Path,
    output: &Path,
    symbols: Option<&str>,
) -> Result<(), MarketscanError> {
    let config = load_config(config_path)?;
    let options = build_options_config(&config)?;
    let loaded = load_data(&config, data_dir)?;

    let selected: Vec<String> = match symbols {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        None => {
            let screener = build_screener_config(&config)?;
            let result = screen_universe(&screen_inputs(loaded.clone()), &screener);
            result
                .top(screener.target_size)
                .into_iter()
                .map(|c| c.symbol)
                .collect()
        }
    };

    let mut rows = Vec::new();
    for symbol in &selected {
        let Some(found) = loaded.iter().find(|s| &s.symbol == symbol) else {
            warn!(symbol = %symbol, "no history for symbol, skipping");
            continue;
        };
        let table = generate_option_table(symbol, &closes(&found.bars), &options);
        if table.is_empty() {
            warn!(symbol = %symbol, "empty option table, skipping");
        }
        rows.extend(table);
    }

    let dividends = CsvAdapter::new(data_dir.to_path_buf()).fetch_dividend_yields()?;
    let enriched = enrich_with_monte_carlo(rows, &dividends, &options);
    eprintln!(
        "Option table: {} rows across {} symbols",
        enriched.len(),
        selected.len()
    );
    CsvReportAdapter::new().write_options(&enriched, output)?;
    Ok(())
}

fn run_backtest_command(
    config_path: &Path,
    input: &Path,
    output: &Path,
) -> Result<(), MarketscanError> {
    let config = load_config(config_path)?;
    let backtest = build_backtest_config(&config)?;
    let candidates = read_option_candidates(input)?;
    info!(rows = candidates.len(), path = %input.display(), "loaded option candidates");

    let report = run_backtest(&candidates, &backtest);
    let failed = report.failure_count();
    eprintln!(
        "Backtest: {} rows priced, {} skipped",
        report.outcomes.len() - failed,
        failed
    );
    CsvReportAdapter::new().write_backtest(&report, output)?;
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), MarketscanError> {
    let config = load_config(config_path)?;
    validate_all(&config)?;
    build_symbol_rules(&config)?;
    eprintln!("Configuration is valid.");
    Ok(())
}
