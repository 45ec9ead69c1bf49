//! Report output port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::TrendtraderError;
use crate::domain::strategy::StrategyKind;
use crate::domain::sweep::SweepReport;

/// Port for persisting backtest and sweep results.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        strategy: &StrategyKind,
        output_path: &str,
    ) -> Result<(), TrendtraderError>;

    fn write_sweep(&self, report: &SweepReport, output_path: &str) -> Result<(), TrendtraderError>;
}
