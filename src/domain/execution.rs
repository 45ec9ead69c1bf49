//! Trade execution and fill simulation.
//!
//! A single-position state machine over bars `0..N-1`. Each bar's signal row
//! is acted on at the *next* bar's open; equity is marked at the current
//! bar's close. The last bar has no executable next open and produces no
//! equity point.
//!
//! Per bar, in order:
//! 1. Skip trading if the row is not ready or the next open is not a positive
//!    finite price
//! 2. Exit check (signal, stop-loss, take-profit)
//! 3. Entry check, only if flat after step 2
//! 4. Mark to market

use chrono::{DateTime, Utc};
use tracing::debug;

use super::error::TrendtraderError;
use super::ohlcv::OhlcvBar;
use super::portfolio::{Account, EquityPoint};
use super::position::{ExitReason, OpenPosition, PositionState, Side, Trade};
use super::signal::SignalRow;

/// Configuration for execution parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    pub initial_equity: f64,
    /// Single-sided proportional fee, e.g. 0.001 = 0.1% per fill.
    pub fee_rate: f64,
    pub allow_shorting: bool,
    /// Percent below (long) / above (short) entry; 0 disables.
    pub stop_loss_pct: f64,
    /// Percent above (long) / below (short) entry; 0 disables.
    pub take_profit_pct: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            initial_equity: 10_000.0,
            fee_rate: 0.001,
            allow_shorting: false,
            stop_loss_pct: 0.0,
            take_profit_pct: 0.0,
        }
    }
}

impl ExecutionConfig {
    pub fn validate(&self) -> Result<(), TrendtraderError> {
        if !(self.initial_equity.is_finite() && self.initial_equity > 0.0) {
            return Err(TrendtraderError::config_invalid(
                "backtest",
                "initial_equity",
                "initial_equity must be positive",
            ));
        }
        if !(self.fee_rate.is_finite() && (0.0..1.0).contains(&self.fee_rate)) {
            return Err(TrendtraderError::config_invalid(
                "backtest",
                "fee_rate",
                "fee_rate must be in [0, 1)",
            ));
        }
        if !(self.stop_loss_pct.is_finite() && self.stop_loss_pct >= 0.0) {
            return Err(TrendtraderError::config_invalid(
                "backtest",
                "stop_loss",
                "stop_loss must be non-negative",
            ));
        }
        if !(self.take_profit_pct.is_finite() && self.take_profit_pct >= 0.0) {
            return Err(TrendtraderError::config_invalid(
                "backtest",
                "take_profit",
                "take_profit must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Full-equity position size at `price` with the entry fee reserved.
pub fn position_size(cash: f64, price: f64, fee_rate: f64) -> f64 {
    cash / (price * (1.0 + fee_rate))
}

/// Fee-adjusted return with the fee charged on both legs.
pub fn round_trip_return(side: Side, entry_price: f64, exit_price: f64, fee_rate: f64) -> f64 {
    match side {
        Side::Long => (exit_price * (1.0 - fee_rate)) / (entry_price * (1.0 + fee_rate)) - 1.0,
        Side::Short => (entry_price * (1.0 - fee_rate)) / (exit_price * (1.0 + fee_rate)) - 1.0,
    }
}

/// Open a full-equity position at `price`. Returns `None` if not flat or if
/// there is no cash left to size a position with.
pub fn enter(
    account: &Account,
    side: Side,
    price: f64,
    time: DateTime<Utc>,
    fee_rate: f64,
) -> Option<Account> {
    if !account.state.is_flat() || account.cash <= 0.0 {
        return None;
    }

    let quantity = position_size(account.cash, price, fee_rate);
    let cost = quantity * price;
    let fee = cost * fee_rate;
    let position = OpenPosition {
        quantity,
        entry_price: price,
        entry_time: time,
    };

    Some(Account {
        cash: account.cash - (cost + fee),
        state: match side {
            Side::Long => PositionState::Long(position),
            Side::Short => PositionState::Short(position),
        },
    })
}

/// Close the open position at `price`. Returns `None` if flat.
///
/// Long exit credits `qty * price - fee`. Short exit returns the escrowed
/// entry notional plus the price difference, minus the fee.
pub fn exit(
    account: &Account,
    price: f64,
    time: DateTime<Utc>,
    reason: ExitReason,
    fee_rate: f64,
) -> Option<(Account, Trade)> {
    let (side, position) = match account.state {
        PositionState::Flat => return None,
        PositionState::Long(p) => (Side::Long, p),
        PositionState::Short(p) => (Side::Short, p),
    };

    let gross = position.quantity * price;
    let fee = gross * fee_rate;
    let cash_in = match side {
        Side::Long => gross - fee,
        Side::Short => position.quantity * (2.0 * position.entry_price - price) - fee,
    };

    let trade = Trade {
        side,
        quantity: position.quantity,
        entry_time: position.entry_time,
        exit_time: time,
        entry_price: position.entry_price,
        exit_price: price,
        pnl: cash_in,
        ret: round_trip_return(side, position.entry_price, price, fee_rate),
        exit_reason: reason,
    };

    Some((
        Account {
            cash: account.cash + cash_in,
            state: PositionState::Flat,
        },
        trade,
    ))
}

/// Outcome of one bar's evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub account: Account,
    pub trade: Option<Trade>,
}

fn exit_reason(
    state: &PositionState,
    signal: &SignalRow,
    close: f64,
    config: &ExecutionConfig,
) -> Option<ExitReason> {
    let signalled = match state {
        PositionState::Flat => return None,
        PositionState::Long(_) => signal.long_exit,
        PositionState::Short(_) => signal.short_exit,
    };

    if signalled {
        Some(ExitReason::Signal)
    } else if state.should_stop_loss(close, config.stop_loss_pct) {
        Some(ExitReason::StopLoss)
    } else if state.should_take_profit(close, config.take_profit_pct) {
        Some(ExitReason::TakeProfit)
    } else {
        None
    }
}

/// Apply one bar's signal row to `account`, filling at `next_open`.
///
/// Exit is checked before entry, so a position closed on this bar leaves the
/// account flat for the entry check. An entry signal while a position is open
/// is ignored. A long entry takes precedence over a short entry.
pub fn transition(
    account: &Account,
    signal: &SignalRow,
    bar: &OhlcvBar,
    next_open: Option<f64>,
    config: &ExecutionConfig,
) -> Transition {
    let unchanged = Transition {
        account: *account,
        trade: None,
    };

    let Some(fill) = next_open.filter(|p| p.is_finite() && *p > 0.0) else {
        return unchanged;
    };
    if !signal.ready {
        return unchanged;
    }

    let mut current = *account;
    let mut trade = None;

    if let Some(reason) = exit_reason(&current.state, signal, bar.close, config) {
        if let Some((closed, t)) = exit(&current, fill, bar.open_time, reason, config.fee_rate) {
            current = closed;
            trade = Some(t);
        }
    }

    let entry_side = if signal.long_entry {
        Some(Side::Long)
    } else if signal.short_entry && config.allow_shorting {
        Some(Side::Short)
    } else {
        None
    };

    if let Some(side) = entry_side {
        if let Some(opened) = enter(&current, side, fill, bar.open_time, config.fee_rate) {
            current = opened;
        }
    }

    Transition {
        account: current,
        trade,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
    /// State after the last evaluated bar; may still hold an open position.
    pub final_account: Account,
}

/// Sequential execution simulator. Holds only its configuration, so one
/// instance can be run repeatedly; every run starts from a fresh account.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: ExecutionConfig,
}

impl Simulator {
    pub fn new(config: ExecutionConfig) -> Result<Self, TrendtraderError> {
        config.validate()?;
        Ok(Simulator { config })
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Walk `bars` with their aligned `signals`. Missing rows count as not ready.
    pub fn run(&self, bars: &[OhlcvBar], signals: &[SignalRow]) -> SimulationResult {
        let mut account = Account::new(self.config.initial_equity);
        let steps = bars.len().saturating_sub(1);
        let mut equity_curve = Vec::with_capacity(steps);
        let mut trades = Vec::new();

        for i in 0..steps {
            let bar = &bars[i];
            let signal = signals.get(i).copied().unwrap_or_default();
            let next_open = Some(bars[i + 1].open);

            let step = transition(&account, &signal, bar, next_open, &self.config);
            if let Some(trade) = step.trade {
                debug!(
                    side = ?trade.side,
                    entry = %trade.entry_time,
                    exit = %trade.exit_time,
                    ret = trade.ret,
                    "trade closed"
                );
                trades.push(trade);
            }
            if account.state.is_flat() && !step.account.state.is_flat() {
                debug!(time = %bar.open_time, price = bars[i + 1].open, "position opened");
            }
            account = step.account;

            equity_curve.push(EquityPoint {
                time: bar.open_time,
                equity: account.equity(bar.close),
            });
        }

        SimulationResult {
            equity_curve,
            trades,
            final_account: account,
        }
    }
}
