//! Position state and closed-trade records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

/// An open position. `entry_price` is the raw fill price (next bar open).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenPosition {
    pub quantity: f64,
    pub entry_price: f64,
    pub entry_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Long(OpenPosition),
    Short(OpenPosition),
}

impl PositionState {
    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }

    pub fn is_long(&self) -> bool {
        matches!(self, PositionState::Long(_))
    }

    pub fn is_short(&self) -> bool {
        matches!(self, PositionState::Short(_))
    }

    pub fn side(&self) -> Option<Side> {
        match self {
            PositionState::Flat => None,
            PositionState::Long(_) => Some(Side::Long),
            PositionState::Short(_) => Some(Side::Short),
        }
    }

    pub fn open_position(&self) -> Option<&OpenPosition> {
        match self {
            PositionState::Flat => None,
            PositionState::Long(p) | PositionState::Short(p) => Some(p),
        }
    }

    /// Value of the position at `price`. A short is valued as its escrowed
    /// entry notional plus the unrealized price difference.
    pub fn market_value(&self, price: f64) -> f64 {
        match self {
            PositionState::Flat => 0.0,
            PositionState::Long(p) => p.quantity * price,
            PositionState::Short(p) => p.quantity * (2.0 * p.entry_price - price),
        }
    }

    /// Stop-loss check on `price`; `stop_loss_pct` of 0 disables it.
    pub fn should_stop_loss(&self, price: f64, stop_loss_pct: f64) -> bool {
        if stop_loss_pct <= 0.0 {
            return false;
        }
        match self {
            PositionState::Flat => false,
            PositionState::Long(p) => price <= p.entry_price * (1.0 - stop_loss_pct / 100.0),
            PositionState::Short(p) => price >= p.entry_price * (1.0 + stop_loss_pct / 100.0),
        }
    }

    /// Take-profit check on `price`; `take_profit_pct` of 0 disables it.
    pub fn should_take_profit(&self, price: f64, take_profit_pct: f64) -> bool {
        if take_profit_pct <= 0.0 {
            return false;
        }
        match self {
            PositionState::Flat => false,
            PositionState::Long(p) => price >= p.entry_price * (1.0 + take_profit_pct / 100.0),
            PositionState::Short(p) => price <= p.entry_price * (1.0 - take_profit_pct / 100.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    Signal,
    StopLoss,
    TakeProfit,
}

/// A fully closed round trip.
///
/// `entry_time`/`exit_time` are the times of the bars whose signals triggered
/// the fills; the fills themselves happen at the following bar's open.
///
/// `pnl` is the cash credited on exit (proceeds after the exit fee), not net
/// profit against entry cost. `ret` is the fee-adjusted percentage return with
/// the fee charged on both legs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub side: Side,
    pub quantity: f64,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: f64,
    pub ret: f64,
    pub exit_reason: ExitReason,
}
