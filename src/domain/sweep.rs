//! Parameter sweep over strategy variants.
//!
//! Every SMA and EMA cross in the fast/slow grid (pairs with `fast >= slow`
//! are skipped) plus the trend-structure strategy are backtested against the
//! same bars in parallel, then ranked by the chosen objective.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use tracing::info;

use super::backtest::{BacktestConfig, run_backtest};
use super::error::TrendtraderError;
use super::metrics::Stats;
use super::ohlcv::{OhlcvBar, ensure_ordered};
use super::strategy::{MaKind, StrategyKind};

pub const DEFAULT_FAST_PERIODS: [usize; 6] = [5, 7, 9, 10, 15, 20];
pub const DEFAULT_SLOW_PERIODS: [usize; 7] = [30, 40, 50, 60, 100, 150, 200];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Objective {
    #[default]
    TotalReturn,
    Sharpe,
}

impl Objective {
    pub fn score(&self, stats: &Stats) -> f64 {
        match self {
            Objective::TotalReturn => stats.total_return,
            Objective::Sharpe => stats.sharpe_approx,
        }
    }
}

impl FromStr for Objective {
    type Err = TrendtraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "total_return" | "return" => Ok(Objective::TotalReturn),
            "sharpe" | "sharpe_approx" => Ok(Objective::Sharpe),
            other => Err(TrendtraderError::config_invalid(
                "sweep",
                "objective",
                format!("unknown objective '{other}' (expected total_return or sharpe)"),
            )),
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objective::TotalReturn => write!(f, "total_return"),
            Objective::Sharpe => write!(f, "sharpe"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub fast_periods: Vec<usize>,
    pub slow_periods: Vec<usize>,
    pub objective: Objective,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            fast_periods: DEFAULT_FAST_PERIODS.to_vec(),
            slow_periods: DEFAULT_SLOW_PERIODS.to_vec(),
            objective: Objective::default(),
        }
    }
}

impl SweepConfig {
    /// All candidate strategies in a fixed order: SMA grid, EMA grid, trend structure.
    pub fn candidates(&self) -> Vec<StrategyKind> {
        let mut out = Vec::new();
        for ma in [MaKind::Sma, MaKind::Ema] {
            for &fast in &self.fast_periods {
                for &slow in &self.slow_periods {
                    if fast == 0 || fast >= slow {
                        continue;
                    }
                    out.push(StrategyKind::MovingAverageCross { ma, fast, slow });
                }
            }
        }
        out.push(StrategyKind::TrendStructure);
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepEntry {
    pub strategy: StrategyKind,
    pub stats: Stats,
    pub score: f64,
}

/// Entries ranked best first.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    pub objective: Objective,
    pub entries: Vec<SweepEntry>,
}

impl SweepReport {
    pub fn best(&self) -> Option<&SweepEntry> {
        self.entries.first()
    }
}

pub fn run_sweep(
    bars: &[OhlcvBar],
    backtest: &BacktestConfig,
    sweep: &SweepConfig,
) -> Result<SweepReport, TrendtraderError> {
    backtest.validate()?;
    ensure_ordered(bars)?;

    let candidates = sweep.candidates();
    info!(candidates = candidates.len(), objective = %sweep.objective, "starting sweep");

    let mut entries = candidates
        .par_iter()
        .enumerate()
        .map(|(idx, strategy)| {
            let result = run_backtest(bars, strategy, backtest)?;
            let score = sweep.objective.score(&result.stats);
            Ok((
                idx,
                SweepEntry {
                    strategy: *strategy,
                    stats: result.stats,
                    score,
                },
            ))
        })
        .collect::<Result<Vec<_>, TrendtraderError>>()?;

    // NaN scores sink to the bottom; ties keep candidate order.
    entries.sort_by(|(ia, a), (ib, b)| rank(a.score, b.score).then(ia.cmp(ib)));

    let entries: Vec<SweepEntry> = entries.into_iter().map(|(_, e)| e).collect();
    if let Some(best) = entries.first() {
        info!(strategy = %best.strategy, score = best.score, "sweep complete");
    }

    Ok(SweepReport {
        objective: sweep.objective,
        entries,
    })
}

fn rank(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}
