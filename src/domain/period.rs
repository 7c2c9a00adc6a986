//! History period and bar interval selectors, plus interval resampling.
//!
//! Both selectors round-trip through the short strings used by market data
//! providers ("6mo", "1wk"). Unknown strings are rejected up front so a bad
//! configuration fails before any fetch is attempted.

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;

use crate::domain::error::SwingError;
use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
}

impl Period {
    pub const ALL: [Period; 5] = [
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
        }
    }

    /// Look-back in calendar months.
    pub fn months(self) -> u32 {
        match self {
            Period::OneMonth => 1,
            Period::ThreeMonths => 3,
            Period::SixMonths => 6,
            Period::OneYear => 12,
            Period::TwoYears => 24,
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::SixMonths
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = SwingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Period::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                SwingError::invalid(
                    "scan",
                    "period",
                    format!("unknown period '{s}' (expected one of 1mo, 3mo, 6mo, 1y, 2y)"),
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    Daily,
    FiveDay,
    Weekly,
}

impl Interval {
    pub const ALL: [Interval; 3] = [Interval::Daily, Interval::FiveDay, Interval::Weekly];

    pub fn as_str(self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::FiveDay => "5d",
            Interval::Weekly => "1wk",
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::Daily
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = SwingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Interval::ALL
            .into_iter()
            .find(|i| i.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                SwingError::invalid(
                    "scan",
                    "interval",
                    format!("unknown interval '{s}' (expected one of 1d, 5d, 1wk)"),
                )
            })
    }
}

/// Aggregates daily bars into the requested interval.
///
/// Each output bar takes the first open, highest high, lowest low, last close
/// and summed volume of its group, dated at the group's first bar. Weekly
/// groups follow ISO weeks; five-day groups are consecutive runs of five bars.
/// Input must already be sorted ascending.
pub fn resample(bars: &[OhlcvBar], interval: Interval) -> Vec<OhlcvBar> {
    match interval {
        Interval::Daily => bars.to_vec(),
        Interval::FiveDay => bars.chunks(5).map(aggregate).collect(),
        Interval::Weekly => {
            let mut out = Vec::new();
            let mut start = 0;
            for i in 1..=bars.len() {
                let boundary =
                    i == bars.len() || bars[i].date.iso_week() != bars[start].date.iso_week();
                if boundary {
                    out.push(aggregate(&bars[start..i]));
                    start = i;
                }
            }
            out
        }
    }
}

fn aggregate(group: &[OhlcvBar]) -> OhlcvBar {
    let first = &group[0];
    let last = &group[group.len() - 1];
    OhlcvBar {
        date: first.date,
        open: first.open,
        high: group.iter().map(|b| b.high).fold(f64::MIN, f64::max),
        low: group.iter().map(|b| b.low).fold(f64::MAX, f64::min),
        close: last.close,
        volume: group.iter().map(|b| b.volume).sum(),
    }
}
