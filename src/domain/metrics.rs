//! Performance statistics.
//!
//! All ratios are derived from the equity curve alone; the trade ledger only
//! contributes its length. Sharpe is annualized with a configured bars-per-year
//! factor and carries no risk-free adjustment.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::TrendtraderError;
use super::portfolio::EquityPoint;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const HOURS_PER_DAY: f64 = 24.0;

/// Bar interval, used to derive the default annualization factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Timeframe {
    M1,
    M3,
    M5,
    M15,
    M30,
    #[default]
    H1,
    H2,
    H4,
    H6,
    H12,
    D1,
}

impl Timeframe {
    fn minutes(&self) -> f64 {
        match self {
            Timeframe::M1 => 1.0,
            Timeframe::M3 => 3.0,
            Timeframe::M5 => 5.0,
            Timeframe::M15 => 15.0,
            Timeframe::M30 => 30.0,
            Timeframe::H1 => 60.0,
            Timeframe::H2 => 120.0,
            Timeframe::H4 => 240.0,
            Timeframe::H6 => 360.0,
            Timeframe::H12 => 720.0,
            Timeframe::D1 => 1440.0,
        }
    }

    /// Bars per year under the 252-day, 24-hour convention (1h gives 6048).
    pub fn bars_per_year(&self) -> f64 {
        TRADING_DAYS_PER_YEAR * HOURS_PER_DAY * 60.0 / self.minutes()
    }
}

impl FromStr for Timeframe {
    type Err = TrendtraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1m" => Ok(Timeframe::M1),
            "3m" => Ok(Timeframe::M3),
            "5m" => Ok(Timeframe::M5),
            "15m" => Ok(Timeframe::M15),
            "30m" => Ok(Timeframe::M30),
            "1h" => Ok(Timeframe::H1),
            "2h" => Ok(Timeframe::H2),
            "4h" => Ok(Timeframe::H4),
            "6h" => Ok(Timeframe::H6),
            "12h" => Ok(Timeframe::H12),
            "1d" => Ok(Timeframe::D1),
            other => Err(TrendtraderError::config_invalid(
                "backtest",
                "timeframe",
                format!("unsupported timeframe '{other}'"),
            )),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::M1 => "1m",
            Timeframe::M3 => "3m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H2 => "2h",
            Timeframe::H4 => "4h",
            Timeframe::H6 => "6h",
            Timeframe::H12 => "12h",
            Timeframe::D1 => "1d",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub initial_equity: f64,
    pub final_equity: f64,
    pub total_return: f64,
    /// Deepest peak-to-trough decline as a non-positive fraction.
    pub max_drawdown: f64,
    pub sharpe_approx: f64,
    pub num_trades: usize,
}

impl Stats {
    pub fn compute(
        equity_curve: &[EquityPoint],
        num_trades: usize,
        initial_equity: f64,
        annualization_factor: f64,
    ) -> Self {
        let final_equity = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_equity);

        let total_return = if initial_equity > 0.0 && !equity_curve.is_empty() {
            final_equity / initial_equity - 1.0
        } else {
            0.0
        };

        Stats {
            initial_equity,
            final_equity,
            total_return,
            max_drawdown: compute_max_drawdown(equity_curve),
            sharpe_approx: compute_sharpe(equity_curve, annualization_factor),
            num_trades,
        }
    }
}

/// Minimum of `equity[i] / running_peak - 1`. Zero for an empty curve.
pub fn compute_max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let Some(first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        }
        if peak > 0.0 {
            let dd = point.equity / peak - 1.0;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

/// Per-bar simple returns with a leading zero, one per equity point.
pub fn bar_returns(equity_curve: &[EquityPoint]) -> Vec<f64> {
    if equity_curve.is_empty() {
        return Vec::new();
    }

    std::iter::once(0.0)
        .chain(equity_curve.windows(2).map(|w| {
            let prev = w[0].equity;
            if prev != 0.0 {
                w[1].equity / prev - 1.0
            } else {
                0.0
            }
        }))
        .collect()
}

/// `mean / population std * sqrt(factor)`, or 0 when the std is zero.
pub fn compute_sharpe(equity_curve: &[EquityPoint], annualization_factor: f64) -> f64 {
    let returns = bar_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    if std_dev > 0.0 && std_dev.is_finite() {
        mean / std_dev * annualization_factor.sqrt()
    } else {
        0.0
    }
}
