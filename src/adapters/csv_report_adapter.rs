//! CSV/JSON report adapter implementing ReportPort.
//!
//! A backtest writes `equity.csv`, `trades.csv` and `stats.json` into the
//! output directory; a sweep writes `sweep.csv`.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::TrendtraderError;
use crate::domain::metrics::Stats;
use crate::domain::strategy::StrategyKind;
use crate::domain::sweep::SweepReport;
use crate::ports::report_port::ReportPort;

pub const EQUITY_FILE: &str = "equity.csv";
pub const TRADES_FILE: &str = "trades.csv";
pub const STATS_FILE: &str = "stats.json";
pub const SWEEP_FILE: &str = "sweep.csv";

#[derive(Serialize)]
struct StatsRecord<'a> {
    strategy: String,
    #[serde(flatten)]
    stats: &'a Stats,
}

#[derive(Serialize)]
struct SweepRow {
    rank: usize,
    strategy: &'static str,
    fast: Option<usize>,
    slow: Option<usize>,
    score: f64,
    total_return: f64,
    max_drawdown: f64,
    sharpe_approx: f64,
    num_trades: usize,
}

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn report_err(e: impl std::fmt::Display) -> TrendtraderError {
    TrendtraderError::Report {
        reason: e.to_string(),
    }
}

const EQUITY_HEADER: [&str; 2] = ["time", "equity"];
const TRADES_HEADER: [&str; 9] = [
    "side",
    "quantity",
    "entry_time",
    "exit_time",
    "entry_price",
    "exit_price",
    "pnl",
    "ret",
    "exit_reason",
];
const SWEEP_HEADER: [&str; 9] = [
    "rank",
    "strategy",
    "fast",
    "slow",
    "score",
    "total_return",
    "max_drawdown",
    "sharpe_approx",
    "num_trades",
];

/// `header` is written only when `rows` is empty; csv::Writer otherwise
/// derives it from the first record.
fn write_rows<T: Serialize>(
    path: &Path,
    header: &[&str],
    rows: impl IntoIterator<Item = T>,
) -> Result<(), TrendtraderError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| report_err(format!("{}: {e}", path.display())))?;
    let mut written = 0usize;
    for row in rows {
        writer.serialize(row).map_err(report_err)?;
        written += 1;
    }
    if written == 0 {
        writer.write_record(header).map_err(report_err)?;
    }
    writer.flush()?;
    Ok(())
}

/// Serialize stats as a flat JSON object tagged with the strategy label.
pub fn stats_json(stats: &Stats, strategy: &StrategyKind) -> Result<String, TrendtraderError> {
    let record = StatsRecord {
        strategy: strategy.to_string(),
        stats,
    };
    serde_json::to_string_pretty(&record).map_err(report_err)
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        strategy: &StrategyKind,
        output_path: &str,
    ) -> Result<(), TrendtraderError> {
        let dir = Path::new(output_path);
        fs::create_dir_all(dir)?;

        write_rows(&dir.join(EQUITY_FILE), &EQUITY_HEADER, &result.equity_curve)?;
        write_rows(&dir.join(TRADES_FILE), &TRADES_HEADER, &result.trades)?;
        fs::write(dir.join(STATS_FILE), stats_json(&result.stats, strategy)?)?;

        info!(dir = %dir.display(), trades = result.trades.len(), "report written");
        Ok(())
    }

    fn write_sweep(&self, report: &SweepReport, output_path: &str) -> Result<(), TrendtraderError> {
        let dir = Path::new(output_path);
        fs::create_dir_all(dir)?;

        let rows = report.entries.iter().enumerate().map(|(i, e)| {
            let (fast, slow) = match e.strategy {
                StrategyKind::MovingAverageCross { fast, slow, .. } => (Some(fast), Some(slow)),
                StrategyKind::TrendStructure => (None, None),
            };
            SweepRow {
                rank: i + 1,
                strategy: e.strategy.name(),
                fast,
                slow,
                score: e.score,
                total_return: e.stats.total_return,
                max_drawdown: e.stats.max_drawdown,
                sharpe_approx: e.stats.sharpe_approx,
                num_trades: e.stats.num_trades,
            }
        });
        write_rows(&dir.join(SWEEP_FILE), &SWEEP_HEADER, rows)?;

        info!(dir = %dir.display(), entries = report.entries.len(), "sweep report written");
        Ok(())
    }
}
