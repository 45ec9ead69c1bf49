//! Smoothed Moving Average of the median price, shifted forward.
//!
//! SMMA[i] = P[i]/n + SMMA[i-1]*(1 - 1/n), seeded with the first median price.
//! The shifted value at bar i is the SMMA computed through bar i - shift, so
//! the first `shift` bars are invalid.
//!
//! The three-line trend indicator is three of these: jaw (13, 8),
//! teeth (8, 5) and lips (5, 3).

use crate::domain::indicator::ema::ema_of_series;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_smma(bars: &[OhlcvBar], period: usize, shift: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Smma { period, shift };
    if period == 0 || bars.is_empty() {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let prices: Vec<f64> = bars.iter().map(OhlcvBar::median_price).collect();
    let smoothed = ema_of_series(&prices, 1.0 / period as f64);

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| match i.checked_sub(shift) {
            Some(source) => IndicatorPoint {
                open_time: bar.open_time,
                valid: true,
                value: smoothed[source],
            },
            None => IndicatorPoint {
                open_time: bar.open_time,
                valid: false,
                value: 0.0,
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::make_bars;
    use approx::assert_relative_eq;

    #[test]
    fn smma_without_shift() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_smma(&bars, 2, 0);

        assert!(series.values.iter().all(|p| p.valid));
        assert_relative_eq!(series.values[0].value, 10.0);
        assert_relative_eq!(series.values[1].value, 15.0);
        assert_relative_eq!(series.values[2].value, 22.5);
    }

    #[test]
    fn smma_shift_delays_values() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0]);
        let plain = calculate_smma(&bars, 2, 0);
        let shifted = calculate_smma(&bars, 2, 2);

        assert!(!shifted.values[0].valid);
        assert!(!shifted.values[1].valid);
        assert_eq!(shifted.value_at(2), plain.value_at(0));
        assert_eq!(shifted.value_at(3), plain.value_at(1));
    }

    #[test]
    fn smma_uses_median_price() {
        let mut bars = make_bars(&[10.0]);
        bars[0].high = 30.0;
        bars[0].low = 10.0;
        let series = calculate_smma(&bars, 5, 0);
        assert_relative_eq!(series.values[0].value, 20.0);
    }

    #[test]
    fn smma_ignores_later_bars() {
        let bars = make_bars(&[10.0, 12.0, 14.0, 16.0, 18.0]);
        let mut altered = bars.clone();
        altered[4].high = 500.0;

        let a = calculate_smma(&bars, 3, 1);
        let b = calculate_smma(&altered, 3, 1);
        for i in 0..5 {
            assert_eq!(a.value_at(i), b.value_at(i));
        }
    }

    #[test]
    fn jaw_teeth_lips_warmup() {
        let bars = make_bars(&[1.0; 12]);
        for (ty, shift) in [
            (IndicatorType::JAW, 8),
            (IndicatorType::TEETH, 5),
            (IndicatorType::LIPS, 3),
        ] {
            let IndicatorType::Smma { period, .. } = ty else {
                panic!("expected SMMA");
            };
            let series = calculate_smma(&bars, period, shift);
            assert_eq!(series.indicator_type, ty);
            assert_eq!(series.values.iter().filter(|p| !p.valid).count(), shift);
        }
    }

    #[test]
    fn smma_period_0() {
        let bars = make_bars(&[10.0]);
        assert!(calculate_smma(&bars, 0, 0).values.is_empty());
    }
}
