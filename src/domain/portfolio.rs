//! Account state and equity tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::position::PositionState;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub time: DateTime<Utc>,
    pub equity: f64,
}

/// Cash plus the single position slot. Owned by one simulation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Account {
    pub cash: f64,
    pub state: PositionState,
}

impl Account {
    pub fn new(initial_equity: f64) -> Self {
        Account {
            cash: initial_equity,
            state: PositionState::Flat,
        }
    }

    /// Mark-to-market equity at `price`.
    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.state.market_value(price)
    }
}
