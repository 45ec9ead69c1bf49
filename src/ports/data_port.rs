//! Bar data port trait.

use crate::domain::error::TrendtraderError;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// All bars for the configured instrument, ordered by `open_time`.
    fn fetch_bars(&self) -> Result<Vec<OhlcvBar>, TrendtraderError>;

    /// Human-readable description of where the bars come from.
    fn source_name(&self) -> String;
}
