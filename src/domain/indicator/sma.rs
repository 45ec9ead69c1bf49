//! Simple Moving Average indicator.
//!
//! SMA[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.is_empty() {
        return IndicatorSeries {
            indicator_type: IndicatorType::Sma(period),
            values: Vec::new(),
        };
    }

    let mut values = Vec::with_capacity(bars.len());
    // Length of the run of identical closes ending at the current bar.
    let mut same_run = 0usize;

    for (i, bar) in bars.iter().enumerate() {
        if i > 0 && bar.close == bars[i - 1].close {
            same_run += 1;
        } else {
            same_run = 1;
        }

        if i + 1 < period {
            values.push(IndicatorPoint {
                open_time: bar.open_time,
                valid: false,
                value: 0.0,
            });
            continue;
        }

        // A constant window averages to exactly that value; other windows
        // are summed afresh so rounding never carries between bars.
        let value = if same_run >= period {
            bar.close
        } else {
            bars[i + 1 - period..=i].iter().map(|b| b.close).sum::<f64>() / period as f64
        };
        values.push(IndicatorPoint {
            open_time: bar.open_time,
            valid: true,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}
