//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::{CsvReportAdapter, stats_json};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    parse_period_list, read_double, read_period, validate_backtest_config, validate_data_config,
    validate_strategy_config, validate_sweep_config,
};
use crate::domain::error::TrendtraderError;
use crate::domain::metrics::Timeframe;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::strategy::{DEFAULT_FAST_PERIOD, DEFAULT_SLOW_PERIOD, StrategyKind};
use crate::domain::sweep::{self, Objective, SweepConfig, SweepReport};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "trendtrader", about = "Trend-following strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a single backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Bar CSV file, overrides [data] path
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Strategy name, overrides [strategy] name
        #[arg(short, long)]
        strategy: Option<String>,
        #[arg(long)]
        fast: Option<usize>,
        #[arg(long)]
        slow: Option<usize>,
        /// Directory for equity.csv, trades.csv and stats.json
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Grid-search strategy parameters and rank the results
    Sweep {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// total_return or sharpe, overrides [sweep] objective
        #[arg(long)]
        objective: Option<String>,
        /// Directory for sweep.csv
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file without running
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Strategy selection overrides from the command line.
#[derive(Debug, Clone, Default)]
pub struct StrategyOverrides {
    pub name: Option<String>,
    pub fast: Option<usize>,
    pub slow: Option<usize>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data,
            strategy,
            fast,
            slow,
            output,
        } => {
            let overrides = StrategyOverrides {
                name: strategy,
                fast,
                slow,
            };
            run_backtest(&config, data.as_ref(), &overrides, output.as_ref())
        }
        Command::Sweep {
            config,
            data,
            objective,
            output,
        } => run_sweep(&config, data.as_ref(), objective.as_deref(), output.as_ref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = TrendtraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn fail(err: TrendtraderError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, TrendtraderError> {
    let timeframe = match adapter.get_string("backtest", "timeframe") {
        Some(raw) => raw.parse::<Timeframe>()?,
        None => Timeframe::default(),
    };
    let defaults = BacktestConfig::default();

    let config = BacktestConfig {
        initial_equity: read_double(adapter, "backtest", "initial_equity")?
            .unwrap_or(defaults.initial_equity),
        fee_rate: read_double(adapter, "backtest", "fee_rate")?.unwrap_or(defaults.fee_rate),
        annualization_factor: read_double(adapter, "backtest", "annualization_factor")?
            .unwrap_or_else(|| timeframe.bars_per_year()),
        allow_shorting: adapter.get_bool("backtest", "allow_shorting", false),
        stop_loss_pct: read_double(adapter, "backtest", "stop_loss")?.unwrap_or(0.0),
        take_profit_pct: read_double(adapter, "backtest", "take_profit")?.unwrap_or(0.0),
    };
    config.validate()?;
    Ok(config)
}

pub fn build_strategy(
    adapter: &dyn ConfigPort,
    overrides: &StrategyOverrides,
) -> Result<StrategyKind, TrendtraderError> {
    let name = match &overrides.name {
        Some(n) => n.clone(),
        None => adapter
            .get_string("strategy", "name")
            .unwrap_or_else(|| "sma_cross".to_string()),
    };
    let fast = match overrides.fast {
        Some(f) => f,
        None => read_period(adapter, "strategy", "fast")?.unwrap_or(DEFAULT_FAST_PERIOD),
    };
    let slow = match overrides.slow {
        Some(s) => s,
        None => read_period(adapter, "strategy", "slow")?.unwrap_or(DEFAULT_SLOW_PERIOD),
    };
    StrategyKind::from_name(&name, fast, slow)
}

pub fn build_sweep_config(
    adapter: &dyn ConfigPort,
    objective_override: Option<&str>,
) -> Result<SweepConfig, TrendtraderError> {
    let defaults = SweepConfig::default();

    let fast_periods = match adapter.get_string("sweep", "fast_periods") {
        Some(raw) => parse_period_list(&raw, "fast_periods")?,
        None => defaults.fast_periods,
    };
    let slow_periods = match adapter.get_string("sweep", "slow_periods") {
        Some(raw) => parse_period_list(&raw, "slow_periods")?,
        None => defaults.slow_periods,
    };
    let objective = match objective_override
        .map(str::to_string)
        .or_else(|| adapter.get_string("sweep", "objective"))
    {
        Some(raw) => raw.parse::<Objective>()?,
        None => defaults.objective,
    };

    Ok(SweepConfig {
        fast_periods,
        slow_periods,
        objective,
    })
}

pub fn resolve_data_path(
    data_override: Option<&PathBuf>,
    adapter: &dyn ConfigPort,
) -> Result<PathBuf, TrendtraderError> {
    if let Some(path) = data_override {
        return Ok(path.clone());
    }
    validate_data_config(adapter)?;
    adapter
        .get_string("data", "path")
        .map(|p| PathBuf::from(p.trim()))
        .ok_or_else(|| TrendtraderError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        })
}

fn run_backtest(
    config_path: &PathBuf,
    data_override: Option<&PathBuf>,
    overrides: &StrategyOverrides,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(e);
    }

    // Stage 2: Resolve strategy and run parameters
    let strategy = match build_strategy(&adapter, overrides) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let data_path = match resolve_data_path(data_override, &adapter) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };
    eprintln!("Strategy: {strategy}");

    // Stage 3: Data, simulation, report
    let data_port = CsvAdapter::new(data_path);
    let report_port = CsvReportAdapter::new();
    match run_backtest_pipeline(
        &data_port,
        &strategy,
        &bt_config,
        output_path.map(|p| p.as_path()),
        &report_port,
    ) {
        Ok(result) => {
            print_backtest_summary(&strategy, &bt_config, &result);
            match stats_json(&result.stats, &strategy) {
                Ok(json) => {
                    println!("{json}");
                    ExitCode::SUCCESS
                }
                Err(e) => fail(e),
            }
        }
        Err(e) => fail(e),
    }
}

/// Fetch bars, run one backtest and optionally write its report.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    strategy: &StrategyKind,
    bt_config: &BacktestConfig,
    output_path: Option<&Path>,
    report_port: &dyn ReportPort,
) -> Result<BacktestResult, TrendtraderError> {
    let bars = fetch_nonempty(data_port)?;
    eprintln!(
        "Running backtest: {} bars from {}",
        bars.len(),
        data_port.source_name()
    );

    let result = backtest_engine::run_backtest(&bars, strategy, bt_config)?;

    if let Some(dir) = output_path {
        report_port.write(&result, strategy, &dir.to_string_lossy())?;
        eprintln!("Report written to: {}", dir.display());
    }
    Ok(result)
}

fn fetch_nonempty(data_port: &dyn DataPort) -> Result<Vec<OhlcvBar>, TrendtraderError> {
    let bars = data_port.fetch_bars()?;
    if bars.is_empty() {
        return Err(TrendtraderError::NoData {
            source_name: data_port.source_name(),
        });
    }
    info!(bars = bars.len(), source = %data_port.source_name(), "bars loaded");
    Ok(bars)
}

fn print_backtest_summary(strategy: &StrategyKind, config: &BacktestConfig, result: &BacktestResult) {
    let stats = &result.stats;
    eprintln!("\n=== Backtest Results: {strategy} ===");
    eprintln!("Initial Equity:   {:.2}", stats.initial_equity);
    eprintln!("Final Equity:     {:.2}", stats.final_equity);
    eprintln!("Total Return:     {:.2}%", stats.total_return * 100.0);
    eprintln!("Max Drawdown:     {:.2}%", stats.max_drawdown * 100.0);
    eprintln!(
        "Sharpe (approx):  {:.2}  (factor {})",
        stats.sharpe_approx, config.annualization_factor
    );
    eprintln!("Total Trades:     {}", stats.num_trades);
    if let Some(side) = result.open_position.side() {
        eprintln!("Open Position:    {side:?} (marked to last close)");
    }
}

fn run_sweep(
    config_path: &PathBuf,
    data_override: Option<&PathBuf>,
    objective_override: Option<&str>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_backtest_config(&adapter).and_then(|_| validate_sweep_config(&adapter)) {
        return fail(e);
    }

    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let sweep_config = match build_sweep_config(&adapter, objective_override) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let data_path = match resolve_data_path(data_override, &adapter) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    let data_port = CsvAdapter::new(data_path);
    let report_port = CsvReportAdapter::new();
    match run_sweep_pipeline(
        &data_port,
        &bt_config,
        &sweep_config,
        output_path.map(|p| p.as_path()),
        &report_port,
    ) {
        Ok(report) => {
            print_sweep_summary(&report);
            match report.best() {
                Some(best) => match stats_json(&best.stats, &best.strategy) {
                    Ok(json) => {
                        println!("{json}");
                        ExitCode::SUCCESS
                    }
                    Err(e) => fail(e),
                },
                None => ExitCode::SUCCESS,
            }
        }
        Err(e) => fail(e),
    }
}

/// Fetch bars once, sweep every candidate and optionally write the ranking.
pub fn run_sweep_pipeline(
    data_port: &dyn DataPort,
    bt_config: &BacktestConfig,
    sweep_config: &SweepConfig,
    output_path: Option<&Path>,
    report_port: &dyn ReportPort,
) -> Result<SweepReport, TrendtraderError> {
    let bars = fetch_nonempty(data_port)?;
    let candidates = sweep_config.candidates().len();
    eprintln!(
        "Sweeping {} candidates over {} bars by {}",
        candidates,
        bars.len(),
        sweep_config.objective
    );

    let report = sweep::run_sweep(&bars, bt_config, sweep_config)?;

    if let Some(dir) = output_path {
        report_port.write_sweep(&report, &dir.to_string_lossy())?;
        eprintln!("Sweep report written to: {}", dir.display());
    }
    Ok(report)
}

fn print_sweep_summary(report: &SweepReport) {
    eprintln!("\n=== Top Strategies by {} ===", report.objective);
    for (i, entry) in report.entries.iter().take(5).enumerate() {
        eprintln!(
            "  {}. {:<24} return {:>8.2}%  sharpe {:>6.2}  trades {}",
            i + 1,
            entry.strategy.to_string(),
            entry.stats.total_return * 100.0,
            entry.stats.sharpe_approx,
            entry.stats.num_trades,
        );
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let checks: [(&str, fn(&dyn ConfigPort) -> Result<(), TrendtraderError>); 3] = [
        ("backtest", validate_backtest_config),
        ("strategy", validate_strategy_config),
        ("sweep", validate_sweep_config),
    ];
    for (section, check) in checks {
        if let Err(e) = check(&adapter) {
            eprintln!("  [{section}] invalid");
            return fail(e);
        }
        eprintln!("  [{section}] ok");
    }

    if let Err(e) = validate_data_config(&adapter) {
        warn!("{e}");
        eprintln!("  [data] no path configured; pass --data when running");
    } else {
        eprintln!("  [data] ok");
    }

    match build_strategy(&adapter, &StrategyOverrides::default()) {
        Ok(strategy) => eprintln!("\nStrategy: {strategy}"),
        Err(e) => return fail(e),
    }
    eprintln!("Configuration is valid.");
    ExitCode::SUCCESS
}
