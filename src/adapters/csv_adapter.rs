//! CSV file data adapter.
//!
//! Reads `<dir>/<SYMBOL>.csv` with header `date,open,high,low,close,volume`.

use crate::domain::error::SwingError;
use crate::domain::ohlcv::{normalize_series, OhlcvBar};
use crate::domain::period::{resample, Interval, Period};
use crate::ports::data_port::DataPort;
use chrono::{Months, NaiveDate};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn read_bars(&self, symbol: &str) -> Result<Vec<OhlcvBar>, SwingError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| {
            SwingError::unavailable(symbol, format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result
                .map_err(|e| SwingError::unavailable(symbol, format!("CSV parse error: {}", e)))?;
            let line = row + 2;

            let date_str = field_str(&record, 0, "date", symbol, line)?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                SwingError::unavailable(symbol, format!("line {}: invalid date: {}", line, e))
            })?;

            bars.push(OhlcvBar {
                date,
                open: field(&record, 1, "open", symbol, line)?,
                high: field(&record, 2, "high", symbol, line)?,
                low: field(&record, 3, "low", symbol, line)?,
                close: field(&record, 4, "close", symbol, line)?,
                volume: volume_field(&record, symbol, line)?,
            });
        }

        Ok(normalize_series(bars))
    }
}

fn field_str<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    name: &str,
    symbol: &str,
    line: usize,
) -> Result<&'r str, SwingError> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| SwingError::unavailable(symbol, format!("line {}: missing {} column", line, name)))
}

fn field<T>(
    record: &csv::StringRecord,
    idx: usize,
    name: &str,
    symbol: &str,
    line: usize,
) -> Result<T, SwingError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    field_str(record, idx, name, symbol, line)?
        .parse()
        .map_err(|e| SwingError::unavailable(symbol, format!("line {}: invalid {} value: {}", line, name, e)))
}

/// Volume may be written as a float (`1200.0`); it must be a whole,
/// non-negative number that fits in an `i64`.
fn volume_field(record: &csv::StringRecord, symbol: &str, line: usize) -> Result<i64, SwingError> {
    let raw = field_str(record, 5, "volume", symbol, line)?;
    let volume = match raw.parse::<i64>() {
        Ok(v) => Some(v).filter(|v| *v >= 0),
        Err(_) => {
            let v: f64 = field(record, 5, "volume", symbol, line)?;
            (v.is_finite() && v.fract() == 0.0 && (0.0..i64::MAX as f64).contains(&v))
                .then(|| v as i64)
        }
    };
    volume.ok_or_else(|| {
        SwingError::unavailable(symbol, format!("line {}: volume out of range: {}", line, raw))
    })
}

/// Keeps bars dated after `newest - period`.
fn within_period(bars: Vec<OhlcvBar>, period: Period) -> Vec<OhlcvBar> {
    let Some(newest) = bars.last().map(|b| b.date) else {
        return bars;
    };
    let Some(cutoff) = newest.checked_sub_months(Months::new(period.months())) else {
        return bars;
    };
    bars.into_iter().filter(|b| b.date > cutoff).collect()
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<OhlcvBar>, SwingError> {
        let bars = within_period(self.read_bars(symbol)?, period);
        debug!(symbol = %symbol, bars = bars.len(), %period, %interval, "loaded csv bars");
        Ok(resample(&bars, interval))
    }
}
