//! CSV file bar adapter.
//!
//! Expects a header row naming `open_time,open,high,low,close,volume` (column
//! order is free). `open_time` may be epoch milliseconds, RFC 3339, or a naive
//! `YYYY-MM-DD[ HH:MM:SS]` taken as UTC.

use crate::domain::error::TrendtraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fs;
use std::path::PathBuf;

const TIME_COLUMNS: [&str; 4] = ["open_time", "timestamp", "time", "date"];

pub struct CsvAdapter {
    path: PathBuf,
}

struct Columns {
    time: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn load_error(&self, reason: impl Into<String>) -> TrendtraderError {
        TrendtraderError::DataLoad {
            source_name: self.path.display().to_string(),
            reason: reason.into(),
        }
    }

    fn columns(&self, headers: &csv::StringRecord) -> Result<Columns, TrendtraderError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| self.load_error(format!("missing {name} column")))
        };
        let time = TIME_COLUMNS
            .iter()
            .find_map(|name| find(*name).ok())
            .ok_or_else(|| self.load_error("missing open_time column"))?;

        Ok(Columns {
            time,
            open: find("open")?,
            high: find("high")?,
            low: find("low")?,
            close: find("close")?,
            volume: find("volume")?,
        })
    }

    fn field<'r>(
        &self,
        record: &'r csv::StringRecord,
        idx: usize,
        name: &str,
        line: usize,
    ) -> Result<&'r str, TrendtraderError> {
        record
            .get(idx)
            .map(str::trim)
            .ok_or_else(|| self.load_error(format!("line {line}: missing {name} value")))
    }

    fn number(
        &self,
        record: &csv::StringRecord,
        idx: usize,
        name: &str,
        line: usize,
    ) -> Result<f64, TrendtraderError> {
        self.field(record, idx, name, line)?
            .parse()
            .map_err(|e| self.load_error(format!("line {line}: invalid {name} value: {e}")))
    }
}

/// Parse a bar timestamp in any of the accepted formats.
pub fn parse_open_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ms) = raw.parse::<i64>() {
        return DateTime::from_timestamp_millis(ms);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self) -> Result<Vec<OhlcvBar>, TrendtraderError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| self.load_error(format!("failed to read file: {e}")))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| self.load_error(format!("CSV header error: {e}")))?
            .clone();
        let cols = self.columns(&headers)?;
        let mut bars = Vec::new();

        for (i, result) in rdr.records().enumerate() {
            // header is line 1
            let line = i + 2;
            let record =
                result.map_err(|e| self.load_error(format!("CSV parse error: {e}")))?;

            let time_str = self.field(&record, cols.time, "open_time", line)?;
            let open_time = parse_open_time(time_str).ok_or_else(|| {
                self.load_error(format!("line {line}: invalid open_time '{time_str}'"))
            })?;

            bars.push(OhlcvBar {
                open_time,
                open: self.number(&record, cols.open, "open", line)?,
                high: self.number(&record, cols.high, "high", line)?,
                low: self.number(&record, cols.low, "low", line)?,
                close: self.number(&record, cols.close, "close", line)?,
                volume: self.number(&record, cols.volume, "volume", line)?,
            });
        }

        if bars.is_empty() {
            return Err(TrendtraderError::NoData {
                source_name: self.source_name(),
            });
        }

        bars.sort_by_key(|b| b.open_time);
        if let Some(w) = bars.windows(2).find(|w| w[0].open_time == w[1].open_time) {
            return Err(self.load_error(format!("duplicate bar at {}", w[1].open_time)));
        }
        Ok(bars)
    }

    fn source_name(&self) -> String {
        self.path.display().to_string()
    }
}
