//! Backtest pipeline: indicators, signals, simulation, statistics.
//!
//! `BacktestConfig` holds every run parameter. [`run_backtest`] validates the
//! config and the bar series up front, so a rejected run leaves no partial
//! output.

use tracing::{debug, info};

use super::error::TrendtraderError;
use super::execution::{ExecutionConfig, Simulator};
use super::indicator_helpers::compute_indicators;
use super::metrics::{Stats, Timeframe};
use super::ohlcv::{OhlcvBar, ensure_ordered};
use super::portfolio::EquityPoint;
use super::position::{PositionState, Trade};
use super::signal::{SignalGenerator, SignalRow};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_equity: f64,
    pub fee_rate: f64,
    /// Bars per year used to annualize the Sharpe ratio.
    pub annualization_factor: f64,
    pub allow_shorting: bool,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_equity: 10_000.0,
            fee_rate: 0.001,
            annualization_factor: Timeframe::H1.bars_per_year(),
            allow_shorting: false,
            stop_loss_pct: 0.0,
            take_profit_pct: 0.0,
        }
    }
}

impl BacktestConfig {
    pub fn execution_config(&self) -> ExecutionConfig {
        ExecutionConfig {
            initial_equity: self.initial_equity,
            fee_rate: self.fee_rate,
            allow_shorting: self.allow_shorting,
            stop_loss_pct: self.stop_loss_pct,
            take_profit_pct: self.take_profit_pct,
        }
    }

    pub fn validate(&self) -> Result<(), TrendtraderError> {
        self.execution_config().validate()?;
        if !(self.annualization_factor.is_finite() && self.annualization_factor > 0.0) {
            return Err(TrendtraderError::config_invalid(
                "backtest",
                "annualization_factor",
                "annualization_factor must be positive",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub signals: Vec<SignalRow>,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
    pub stats: Stats,
    /// Position still open after the last evaluated bar, if any.
    pub open_position: PositionState,
}

/// Run one strategy over `bars`.
pub fn run_backtest(
    bars: &[OhlcvBar],
    strategy: &dyn SignalGenerator,
    config: &BacktestConfig,
) -> Result<BacktestResult, TrendtraderError> {
    config.validate()?;
    strategy.validate()?;
    ensure_ordered(bars)?;

    let simulator = Simulator::new(config.execution_config())?;

    let required = strategy.required_indicators();
    let indicators = compute_indicators(bars, &required);
    debug!(indicators = indicators.len(), bars = bars.len(), "indicators computed");

    let signals = strategy.generate(bars, &indicators);
    let ready = signals.iter().filter(|s| s.ready).count();
    debug!(ready, "signals generated");

    let sim = simulator.run(bars, &signals);
    let stats = Stats::compute(
        &sim.equity_curve,
        sim.trades.len(),
        config.initial_equity,
        config.annualization_factor,
    );

    info!(
        bars = bars.len(),
        trades = stats.num_trades,
        total_return = stats.total_return,
        "backtest complete"
    );

    Ok(BacktestResult {
        signals,
        equity_curve: sim.equity_curve,
        trades: sim.trades,
        stats,
        open_position: sim.final_account.state,
    })
}
