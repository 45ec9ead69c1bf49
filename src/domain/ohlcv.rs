//! OHLCV bar representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::TrendtraderError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    /// (high + low) / 2
    pub fn median_price(&self) -> f64 {
        (self.high + self.low) / 2.0
    }
}

/// Check that `open_time` is strictly increasing across the sequence.
pub fn ensure_ordered(bars: &[OhlcvBar]) -> Result<(), TrendtraderError> {
    for (i, pair) in bars.windows(2).enumerate() {
        if pair[1].open_time <= pair[0].open_time {
            return Err(TrendtraderError::UnorderedBars {
                index: i + 1,
                previous: pair[0].open_time,
                time: pair[1].open_time,
            });
        }
    }
    Ok(())
}
