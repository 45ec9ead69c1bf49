#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::cell::RefCell;
use std::process::ExitCode;
use trendtrader::domain::backtest::{BacktestConfig, BacktestResult};
use trendtrader::domain::error::TrendtraderError;
pub use trendtrader::domain::ohlcv::OhlcvBar;
use trendtrader::domain::strategy::StrategyKind;
use trendtrader::domain::sweep::SweepReport;
use trendtrader::ports::data_port::DataPort;
use trendtrader::ports::report_port::ReportPort;

pub struct MockDataPort {
    pub bars: Vec<OhlcvBar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new(bars: Vec<OhlcvBar>) -> Self {
        Self { bars, error: None }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            bars: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self) -> Result<Vec<OhlcvBar>, TrendtraderError> {
        if let Some(reason) = &self.error {
            return Err(TrendtraderError::DataLoad {
                source_name: self.source_name(),
                reason: reason.clone(),
            });
        }
        Ok(self.bars.clone())
    }

    fn source_name(&self) -> String {
        "mock".to_string()
    }
}

/// Records every write instead of touching the filesystem.
pub struct MockReportPort {
    pub backtests: RefCell<Vec<(BacktestResult, StrategyKind, String)>>,
    pub sweeps: RefCell<Vec<(SweepReport, String)>>,
}

impl MockReportPort {
    pub fn new() -> Self {
        Self {
            backtests: RefCell::new(Vec::new()),
            sweeps: RefCell::new(Vec::new()),
        }
    }
}

impl ReportPort for MockReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        strategy: &StrategyKind,
        output_path: &str,
    ) -> Result<(), TrendtraderError> {
        self.backtests
            .borrow_mut()
            .push((result.clone(), *strategy, output_path.to_string()));
        Ok(())
    }

    fn write_sweep(&self, report: &SweepReport, output_path: &str) -> Result<(), TrendtraderError> {
        self.sweeps
            .borrow_mut()
            .push((report.clone(), output_path.to_string()));
        Ok(())
    }
}

pub fn hour(i: usize) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(i as i64)
}

pub fn make_bar(i: usize, open: f64, close: f64) -> OhlcvBar {
    OhlcvBar {
        open_time: hour(i),
        open,
        high: open.max(close) + 1.0,
        low: open.min(close) - 1.0,
        close,
        volume: 1000.0,
    }
}

/// Hourly bars whose open equals their close.
pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i, c, c))
        .collect()
}

/// Smooth oscillation with a mild upward drift; produces several crosses.
pub fn wave_bars(count: usize) -> Vec<OhlcvBar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| 100.0 + 12.0 * ((i as f64) / 7.0).sin() + 0.05 * i as f64)
        .collect();
    bars_from_closes(&closes)
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        initial_equity: 10_000.0,
        fee_rate: 0.001,
        annualization_factor: 6048.0,
        allow_shorting: false,
        stop_loss_pct: 0.0,
        take_profit_pct: 0.0,
    }
}

pub fn bars_csv(bars: &[OhlcvBar]) -> String {
    let mut out = String::from("open_time,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.open_time.timestamp_millis(),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    out
}

/// `ExitCode` has no `PartialEq`; compare the debug representation.
pub fn same_exit_code(a: ExitCode, b: ExitCode) -> bool {
    format!("{a:?}") == format!("{b:?}")
}
