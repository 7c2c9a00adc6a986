#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashMap;
use swingscan::domain::error::SwingError;
pub use swingscan::domain::ohlcv::OhlcvBar;
use swingscan::domain::period::{Interval, Period};
use swingscan::domain::watchlist::Watchlist;
use swingscan::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub calls: RefCell<Vec<(String, Period, Interval)>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn fetched_symbols(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(s, _, _)| s.clone()).collect()
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<OhlcvBar>, SwingError> {
        self.calls
            .borrow_mut()
            .push((symbol.to_string(), period, interval));
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SwingError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn bar(i: usize, open: f64, high: f64, low: f64, close: f64, volume: i64) -> OhlcvBar {
    OhlcvBar {
        date: date(2022, 1, 3) + chrono::Duration::days(i as i64),
        open,
        high,
        low,
        close,
        volume,
    }
}

/// Steady climb of 0.1 per bar from 100; the final bar closes `jump` above
/// trend on `last_volume`.
///
/// `rising(250, 0.0, 2000)` fires Golden Retrace at 124.90 / 123.80 / 125.90,
/// R:R 0.91. `rising(250, 1.0, 2000)` fires both strategies (R:R 0.48 and 2.35).
pub fn rising(n: usize, jump: f64, last_volume: i64) -> Vec<OhlcvBar> {
    let mut bars: Vec<OhlcvBar> = (0..n)
        .map(|i| {
            let c = 100.0 + i as f64 * 0.1;
            bar(i, c - 0.5, c + 1.0, c - 1.0, c, 1000)
        })
        .collect();
    let c = bars[n - 1].close + jump;
    bars[n - 1] = bar(n - 1, c - 0.5, c + 1.0, c - 1.0, c, last_volume);
    bars
}

/// Forty flat bars at 100, then a final bar closing at `last_close`.
///
/// `flat_then(110.0, 111.0, 1300)` fires BB Breakout at 104.97 / 100.50 /
/// 118.94, R:R 3.13.
pub fn flat_then(last_close: f64, last_high: f64, last_volume: i64) -> Vec<OhlcvBar> {
    let mut bars: Vec<OhlcvBar> = (0..40)
        .map(|i| bar(i, 100.0, 100.5, 99.5, 100.0, 1000))
        .collect();
    bars.push(bar(40, 100.0, last_high, 99.5, last_close, last_volume));
    bars
}

/// Slow decline that never triggers either strategy.
pub fn falling(n: usize) -> Vec<OhlcvBar> {
    (0..n)
        .map(|i| {
            let c = 200.0 - i as f64 * 0.1;
            bar(i, c + 0.5, c + 1.0, c - 1.0, c, 1000)
        })
        .collect()
}

pub fn watchlist(symbols: &[&str]) -> Watchlist {
    Watchlist::parse(&symbols.join("\n")).unwrap()
}

/// Writes bars as `<dir>/<symbol>.csv` in the layout the CSV adapter reads.
pub fn write_csv(dir: &std::path::Path, symbol: &str, bars: &[OhlcvBar]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    std::fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
}
