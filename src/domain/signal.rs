//! Per-bar entry/exit signal generation.
//!
//! # Evaluation Semantics
//!
//! - Row `i` reads bars and indicator values at indices `<= i` only
//! - A bar where any required indicator is undefined yields an all-false row
//!   with `ready == false`
//! - Crossovers compare against the immediately preceding bar and never fire
//!   at index 0
//! - Trend-structure entries fire on the rising edge of the trend; exits are
//!   level-triggered

use crate::domain::error::TrendtraderError;
use crate::domain::indicator::{IndicatorSet, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::strategy::StrategyKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalRow {
    /// Every indicator the strategy reads is defined at this bar.
    pub ready: bool,
    pub long_entry: bool,
    pub short_entry: bool,
    pub long_exit: bool,
    pub short_exit: bool,
}

/// Capability the backtest pipeline is parameterized by.
pub trait SignalGenerator {
    fn required_indicators(&self) -> Vec<IndicatorType>;

    /// One row per bar, causally aligned with `bars`.
    fn generate(&self, bars: &[OhlcvBar], indicators: &IndicatorSet) -> Vec<SignalRow>;

    /// Reject parameters the generator cannot run with.
    fn validate(&self) -> Result<(), TrendtraderError> {
        Ok(())
    }
}

impl SignalGenerator for StrategyKind {
    fn required_indicators(&self) -> Vec<IndicatorType> {
        match *self {
            StrategyKind::MovingAverageCross { ma, fast, slow } => {
                vec![ma.indicator(fast), ma.indicator(slow)]
            }
            StrategyKind::TrendStructure => {
                vec![IndicatorType::JAW, IndicatorType::TEETH, IndicatorType::LIPS]
            }
        }
    }

    fn generate(&self, bars: &[OhlcvBar], indicators: &IndicatorSet) -> Vec<SignalRow> {
        match *self {
            StrategyKind::MovingAverageCross { ma, fast, slow } => {
                ma_cross_signals(bars, indicators, ma.indicator(fast), ma.indicator(slow))
            }
            StrategyKind::TrendStructure => trend_structure_signals(bars, indicators),
        }
    }

    fn validate(&self) -> Result<(), TrendtraderError> {
        StrategyKind::validate(self)
    }
}

pub fn ma_cross_signals(
    bars: &[OhlcvBar],
    indicators: &IndicatorSet,
    fast: IndicatorType,
    slow: IndicatorType,
) -> Vec<SignalRow> {
    (0..bars.len())
        .map(|i| {
            let (Some(fast_curr), Some(slow_curr)) = (indicators.get(&fast, i), indicators.get(&slow, i))
            else {
                return SignalRow::default();
            };

            let prev = i.checked_sub(1).and_then(|p| {
                Some((indicators.get(&fast, p)?, indicators.get(&slow, p)?))
            });

            let (golden, death) = match prev {
                Some((fast_prev, slow_prev)) => (
                    fast_prev <= slow_prev && fast_curr > slow_curr,
                    fast_prev >= slow_prev && fast_curr < slow_curr,
                ),
                None => (false, false),
            };

            SignalRow {
                ready: true,
                long_entry: golden,
                long_exit: death,
                short_entry: death,
                short_exit: golden,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct Lines {
    jaw: f64,
    teeth: f64,
    lips: f64,
}

impl Lines {
    fn at(indicators: &IndicatorSet, index: usize) -> Option<Self> {
        Some(Lines {
            jaw: indicators.get(&IndicatorType::JAW, index)?,
            teeth: indicators.get(&IndicatorType::TEETH, index)?,
            lips: indicators.get(&IndicatorType::LIPS, index)?,
        })
    }

    fn long_trend(&self) -> bool {
        self.lips > self.teeth && self.teeth > self.jaw
    }

    fn short_trend(&self) -> bool {
        self.lips < self.teeth && self.teeth < self.jaw
    }

    fn rising_from(&self, prev: &Lines) -> bool {
        self.lips > prev.lips && self.teeth > prev.teeth && self.jaw > prev.jaw
    }

    fn falling_from(&self, prev: &Lines) -> bool {
        self.lips < prev.lips && self.teeth < prev.teeth && self.jaw < prev.jaw
    }
}

pub fn trend_structure_signals(bars: &[OhlcvBar], indicators: &IndicatorSet) -> Vec<SignalRow> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let Some(curr) = Lines::at(indicators, i) else {
                return SignalRow::default();
            };
            let prev = i.checked_sub(1).and_then(|p| Lines::at(indicators, p));

            let long_slope = prev.is_some_and(|p| curr.rising_from(&p));
            let short_slope = prev.is_some_and(|p| curr.falling_from(&p));
            let prev_long_trend = prev.is_some_and(|p| p.long_trend());
            let prev_short_trend = prev.is_some_and(|p| p.short_trend());

            SignalRow {
                ready: true,
                long_entry: curr.long_trend()
                    && long_slope
                    && bar.close > curr.lips
                    && !prev_long_trend,
                short_entry: curr.short_trend()
                    && short_slope
                    && bar.close < curr.lips
                    && !prev_short_trend,
                long_exit: bar.close < curr.jaw || curr.lips <= curr.teeth,
                short_exit: bar.close > curr.jaw || curr.lips >= curr.teeth,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::{make_bars, IndicatorPoint, IndicatorSeries};
    use crate::domain::indicator_helpers::compute_indicators;

    fn series(indicator_type: IndicatorType, bars: &[OhlcvBar], values: &[Option<f64>]) -> IndicatorSeries {
        IndicatorSeries {
            indicator_type,
            values: bars
                .iter()
                .zip(values)
                .map(|(bar, v)| IndicatorPoint {
                    open_time: bar.open_time,
                    valid: v.is_some(),
                    value: v.unwrap_or(0.0),
                })
                .collect(),
        }
    }

    fn set_of(parts: Vec<IndicatorSeries>) -> IndicatorSet {
        let mut set = IndicatorSet::new();
        for s in parts {
            set.insert(s);
        }
        set
    }

    #[test]
    fn golden_cross_fires_once() {
        let bars = make_bars(&[1.0; 5]);
        let fast = IndicatorType::Sma(2);
        let slow = IndicatorType::Sma(3);
        let set = set_of(vec![
            series(fast, &bars, &[None, Some(9.0), Some(11.0), Some(12.0), Some(13.0)]),
            series(slow, &bars, &[None, Some(10.0), Some(10.0), Some(10.0), Some(10.0)]),
        ]);

        let rows = ma_cross_signals(&bars, &set, fast, slow);
        assert!(!rows[0].ready);
        assert!(!rows[1].long_entry);
        assert!(rows[2].long_entry);
        assert!(rows[2].short_exit);
        assert!(!rows[3].long_entry);
        assert!(!rows[4].long_entry);
    }

    #[test]
    fn death_cross_fires_exit() {
        let bars = make_bars(&[1.0; 3]);
        let fast = IndicatorType::Ema(2);
        let slow = IndicatorType::Ema(4);
        let set = set_of(vec![
            series(fast, &bars, &[Some(11.0), Some(10.0), Some(9.0)]),
            series(slow, &bars, &[Some(10.0), Some(10.0), Some(10.0)]),
        ]);

        let rows = ma_cross_signals(&bars, &set, fast, slow);
        assert!(!rows[1].long_exit);
        assert!(rows[2].long_exit);
        assert!(rows[2].short_entry);
    }

    #[test]
    fn equal_averages_do_not_refire() {
        let bars = make_bars(&[1.0; 6]);
        let fast = IndicatorType::Sma(2);
        let slow = IndicatorType::Sma(3);
        // cross, touch, touch, stay above
        let set = set_of(vec![
            series(fast, &bars, &[Some(9.0), Some(11.0), Some(10.0), Some(10.0), Some(10.5), Some(11.0)]),
            series(slow, &bars, &[Some(10.0); 6]),
        ]);

        let rows = ma_cross_signals(&bars, &set, fast, slow);
        let entries: Vec<usize> = (0..6).filter(|&i| rows[i].long_entry).collect();
        // the move from equal to above at index 4 is a genuine cross
        assert_eq!(entries, vec![1, 4]);
        assert!(!rows[2].long_exit && !rows[3].long_exit);
    }

    #[test]
    fn index_zero_never_crosses() {
        let bars = make_bars(&[1.0]);
        let fast = IndicatorType::Ema(2);
        let slow = IndicatorType::Ema(3);
        let set = set_of(vec![
            series(fast, &bars, &[Some(20.0)]),
            series(slow, &bars, &[Some(10.0)]),
        ]);
        let rows = ma_cross_signals(&bars, &set, fast, slow);
        assert!(rows[0].ready);
        assert!(!rows[0].long_entry);
    }

    fn trend_set(bars: &[OhlcvBar], lines: &[Option<(f64, f64, f64)>]) -> IndicatorSet {
        let pick = |f: fn(&(f64, f64, f64)) -> f64| -> Vec<Option<f64>> {
            lines.iter().map(|l| l.as_ref().map(f)).collect()
        };
        set_of(vec![
            series(IndicatorType::JAW, bars, &pick(|l| l.0)),
            series(IndicatorType::TEETH, bars, &pick(|l| l.1)),
            series(IndicatorType::LIPS, bars, &pick(|l| l.2)),
        ])
    }

    #[test]
    fn trend_entry_on_rising_edge_only() {
        let bars = make_bars(&[100.0; 7]);
        // (jaw, teeth, lips): flat and tangled, then five bars of rising structure
        let lines = vec![
            None,
            Some((10.0, 10.0, 10.0)),
            Some((11.0, 12.0, 13.0)),
            Some((12.0, 13.0, 14.0)),
            Some((13.0, 14.0, 15.0)),
            Some((14.0, 15.0, 16.0)),
            Some((15.0, 16.0, 17.0)),
        ];
        let rows = trend_structure_signals(&bars, &trend_set(&bars, &lines));

        assert_eq!(rows[0], SignalRow::default());
        let entries: Vec<bool> = rows[2..].iter().map(|r| r.long_entry).collect();
        assert_eq!(entries, vec![true, false, false, false, false]);
        assert!(rows[2..].iter().all(|r| !r.long_exit));
    }

    #[test]
    fn trend_entry_requires_close_above_lips() {
        let bars = make_bars(&[12.0, 12.0]);
        let lines = vec![Some((10.0, 10.0, 10.0)), Some((11.0, 12.0, 13.0))];
        let rows = trend_structure_signals(&bars, &trend_set(&bars, &lines));
        assert!(!rows[1].long_entry);
    }

    #[test]
    fn trend_exit_is_level_triggered() {
        let bars = make_bars(&[100.0, 5.0, 5.0]);
        let lines = vec![
            Some((10.0, 12.0, 14.0)),
            Some((11.0, 13.0, 15.0)),
            Some((12.0, 14.0, 16.0)),
        ];
        let rows = trend_structure_signals(&bars, &trend_set(&bars, &lines));
        assert!(!rows[0].long_exit);
        assert!(rows[1].long_exit);
        assert!(rows[2].long_exit);
    }

    #[test]
    fn trend_exit_when_lips_meet_teeth() {
        let bars = make_bars(&[100.0]);
        let lines = vec![Some((10.0, 12.0, 12.0))];
        let rows = trend_structure_signals(&bars, &trend_set(&bars, &lines));
        assert!(rows[0].long_exit);
        assert!(rows[0].short_exit);
    }

    #[test]
    fn short_trend_entry() {
        let bars = make_bars(&[1.0, 1.0]);
        let lines = vec![Some((20.0, 20.0, 20.0)), Some((19.0, 18.0, 17.0))];
        let rows = trend_structure_signals(&bars, &trend_set(&bars, &lines));
        assert!(rows[1].short_entry);
        assert!(!rows[1].long_entry);
        assert!(rows[1].long_exit);
    }

    #[test]
    fn generator_output_length_matches_bars() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 11.0, 10.0, 9.0, 10.0, 12.0, 14.0, 15.0]);
        for kind in [
            StrategyKind::sma_cross(2, 3).unwrap(),
            StrategyKind::ema_cross(2, 4).unwrap(),
            StrategyKind::TrendStructure,
        ] {
            let set = compute_indicators(&bars, &kind.required_indicators());
            assert_eq!(kind.generate(&bars, &set).len(), bars.len());
        }
    }

    #[test]
    fn warmup_rows_are_not_ready() {
        let bars = make_bars(&[10.0; 12]);
        let kind = StrategyKind::TrendStructure;
        let set = compute_indicators(&bars, &kind.required_indicators());
        let rows = kind.generate(&bars, &set);
        assert!(rows[..8].iter().all(|r| *r == SignalRow::default()));
        assert!(rows[8].ready);
    }
}
