//! Shared entry point for indicator calculations.

use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::smma::calculate_smma;
use crate::domain::indicator::{IndicatorSeries, IndicatorSet, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_indicator(bars: &[OhlcvBar], indicator_type: IndicatorType) -> IndicatorSeries {
    match indicator_type {
        IndicatorType::Sma(period) => calculate_sma(bars, period),
        IndicatorType::Ema(period) => calculate_ema(bars, period),
        IndicatorType::Smma { period, shift } => calculate_smma(bars, period, shift),
    }
}

/// Compute each requested indicator once; duplicates in `types` are ignored.
pub fn compute_indicators(bars: &[OhlcvBar], types: &[IndicatorType]) -> IndicatorSet {
    let mut set = IndicatorSet::new();
    for &indicator_type in types {
        if !set.contains(&indicator_type) {
            set.insert(calculate_indicator(bars, indicator_type));
        }
    }
    set
}
