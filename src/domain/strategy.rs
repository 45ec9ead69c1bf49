//! Strategy selection and parameters.
//!
//! A strategy is resolved once from its name into a [`StrategyKind`]; signal
//! generation then matches on the variant instead of re-dispatching by name.

use std::fmt;

use crate::domain::error::TrendtraderError;
use crate::domain::indicator::IndicatorType;

pub const DEFAULT_FAST_PERIOD: usize = 20;
pub const DEFAULT_SLOW_PERIOD: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaKind {
    Sma,
    Ema,
}

impl MaKind {
    pub fn indicator(&self, period: usize) -> IndicatorType {
        match self {
            MaKind::Sma => IndicatorType::Sma(period),
            MaKind::Ema => IndicatorType::Ema(period),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Golden/death cross of a fast and a slow moving average.
    MovingAverageCross { ma: MaKind, fast: usize, slow: usize },
    /// Three-line smoothed-average trend structure.
    TrendStructure,
}

impl StrategyKind {
    pub fn sma_cross(fast: usize, slow: usize) -> Result<Self, TrendtraderError> {
        Self::ma_cross(MaKind::Sma, fast, slow)
    }

    pub fn ema_cross(fast: usize, slow: usize) -> Result<Self, TrendtraderError> {
        Self::ma_cross(MaKind::Ema, fast, slow)
    }

    pub fn trend_structure() -> Self {
        StrategyKind::TrendStructure
    }

    fn ma_cross(ma: MaKind, fast: usize, slow: usize) -> Result<Self, TrendtraderError> {
        let kind = StrategyKind::MovingAverageCross { ma, fast, slow };
        kind.validate()?;
        Ok(kind)
    }

    /// Resolve a strategy by name. `fast`/`slow` are ignored by `trend_structure`.
    pub fn from_name(name: &str, fast: usize, slow: usize) -> Result<Self, TrendtraderError> {
        match name.trim().to_lowercase().as_str() {
            "sma_cross" | "sma" => Self::sma_cross(fast, slow),
            "ema_cross" | "ema" => Self::ema_cross(fast, slow),
            "trend_structure" | "alligator" => Ok(Self::trend_structure()),
            _ => Err(TrendtraderError::UnknownStrategy {
                name: name.to_string(),
            }),
        }
    }

    pub fn validate(&self) -> Result<(), TrendtraderError> {
        if let StrategyKind::MovingAverageCross { fast, slow, .. } = *self {
            if fast == 0 {
                return Err(TrendtraderError::InvalidStrategy {
                    reason: "fast period must be at least 1".into(),
                });
            }
            if fast >= slow {
                return Err(TrendtraderError::InvalidStrategy {
                    reason: format!("fast period ({fast}) must be less than slow period ({slow})"),
                });
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::MovingAverageCross { ma: MaKind::Sma, .. } => "sma_cross",
            StrategyKind::MovingAverageCross { ma: MaKind::Ema, .. } => "ema_cross",
            StrategyKind::TrendStructure => "trend_structure",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::MovingAverageCross { fast, slow, .. } => {
                write!(f, "{}({},{})", self.name(), fast, slow)
            }
            StrategyKind::TrendStructure => write!(f, "{}", self.name()),
        }
    }
}
