//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorType`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A time series of indicator values aligned with the bars
//! - `IndicatorSet`: Every series computed for one bar sequence

pub mod ema;
pub mod sma;
pub mod smma;

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub open_time: DateTime<Utc>,
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    /// Smoothed average of the median price, shifted forward by `shift` bars.
    Smma { period: usize, shift: usize },
}

impl IndicatorType {
    /// Slow line of the three-line trend indicator.
    pub const JAW: IndicatorType = IndicatorType::Smma {
        period: 13,
        shift: 8,
    };
    pub const TEETH: IndicatorType = IndicatorType::Smma {
        period: 8,
        shift: 5,
    };
    /// Fast line of the three-line trend indicator.
    pub const LIPS: IndicatorType = IndicatorType::Smma {
        period: 5,
        shift: 3,
    };
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at `index`, or `None` during warm-up or past the end of the series.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .filter(|p| p.valid && p.value.is_finite())
            .map(|p| p.value)
    }
}

/// Indicator series keyed by type, all aligned 1:1 with the same bars.
#[derive(Debug, Clone, Default)]
pub struct IndicatorSet {
    series: HashMap<IndicatorType, IndicatorSeries>,
}

impl IndicatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, series: IndicatorSeries) {
        self.series.insert(series.indicator_type, series);
    }

    pub fn contains(&self, indicator_type: &IndicatorType) -> bool {
        self.series.contains_key(indicator_type)
    }

    pub fn series(&self, indicator_type: &IndicatorType) -> Option<&IndicatorSeries> {
        self.series.get(indicator_type)
    }

    /// Value of `indicator_type` at bar `index`; `None` if missing or undefined.
    pub fn get(&self, indicator_type: &IndicatorType, index: usize) -> Option<f64> {
        self.series.get(indicator_type)?.value_at(index)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Hourly bars with high = close + 1 and low = close - 1, so the median
/// price equals the close.
#[cfg(test)]
pub(crate) fn make_bars(closes: &[f64]) -> Vec<crate::domain::ohlcv::OhlcvBar> {
    use crate::domain::ohlcv::OhlcvBar;
    use chrono::{Duration, TimeZone};

    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            open_time: start + Duration::hours(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        })
        .collect()
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Smma { period, shift } => write!(f, "SMMA({},+{})", period, shift),
        }
    }
}
