//! OHLCV bar representation.

use chrono::NaiveDate;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// high >= max(open, close, low) and low <= min(open, close, high),
    /// with strictly positive prices.
    pub fn is_consistent(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) || self.volume < 0 {
            return false;
        }
        self.high >= self.open.max(self.close).max(self.low)
            && self.low <= self.open.min(self.close).min(self.high)
    }
}

/// Drops inconsistent bars, sorts ascending by date and keeps the last bar
/// seen for any repeated date.
pub fn normalize_series(mut bars: Vec<OhlcvBar>) -> Vec<OhlcvBar> {
    bars.retain(|b| {
        let ok = b.is_consistent();
        if !ok {
            warn!(date = %b.date, open = b.open, high = b.high, low = b.low, close = b.close,
                "dropping inconsistent bar");
        }
        ok
    });
    bars.sort_by_key(|b| b.date);
    let mut out: Vec<OhlcvBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(prev) if prev.date == bar.date => *prev = bar,
            _ => out.push(bar),
        }
    }
    out
}
