//! Market structure: trend label, long-term bias and recent key levels.

use std::fmt;

use crate::domain::indicator::IndicatorSet;
use crate::domain::ohlcv::OhlcvBar;

pub const STRUCTURE_LOOKBACK: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Uptrend,
    Downtrend,
    Sideways,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Uptrend => write!(f, "UPTREND"),
            Trend::Downtrend => write!(f, "DOWNTREND"),
            Trend::Sideways => write!(f, "SIDEWAYS"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructureSnapshot {
    pub trend: Trend,
    /// `close > EMA(200)`; `None` until 200 bars of history exist.
    pub above_long_term: Option<bool>,
    /// Highest high over the trailing window (resistance).
    pub recent_high: f64,
    /// Lowest low over the trailing window (support).
    pub recent_low: f64,
    /// Bars actually covered by the key-level window.
    pub lookback_bars: usize,
}

/// First match wins: EMA20 > EMA50 and close > EMA20 is an uptrend,
/// EMA20 < EMA50 and close < EMA20 a downtrend, anything else (ties
/// included) sideways.
pub fn classify_trend(close: f64, ema_20: f64, ema_50: f64) -> Trend {
    if ema_20 > ema_50 && close > ema_20 {
        Trend::Uptrend
    } else if ema_20 < ema_50 && close < ema_20 {
        Trend::Downtrend
    } else {
        Trend::Sideways
    }
}

/// `bars` and `indicators` must be aligned; returns `None` for an empty series.
pub fn classify_structure(
    bars: &[OhlcvBar],
    indicators: &IndicatorSet,
    lookback: usize,
) -> Option<StructureSnapshot> {
    let latest = bars.last()?;
    let row = indicators.latest();

    let above_long_term = indicators.long_term_bias(latest.close);

    let window = &bars[bars.len().saturating_sub(lookback.max(1))..];
    let recent_high = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let recent_low = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);

    Some(StructureSnapshot {
        trend: classify_trend(latest.close, row.ema_20, row.ema_50),
        above_long_term,
        recent_high,
        recent_low,
        lookback_bars: window.len(),
    })
}
