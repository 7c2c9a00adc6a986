//! Entry-signal evaluation.
//!
//! Each [`StrategyKind`] is a pure predicate over the latest bar and indicator
//! row. [`evaluate_signals`] runs every registered strategy in a fixed order,
//! so two candidates can come back for one symbol.

use std::fmt;

use crate::domain::indicator::IndicatorSet;
use crate::domain::ohlcv::OhlcvBar;

/// Tunable thresholds shared by the strategies.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalParams {
    /// Volume must exceed this multiple of its 20-bar average.
    pub volume_spike_multiplier: f64,
    /// Max |close - EMA20| / close for a pullback to count as shallow.
    pub ema_proximity_pct: f64,
    /// Bars (including the latest) scanned for the retrace target.
    pub swing_high_lookback: usize,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            volume_spike_multiplier: 1.2,
            ema_proximity_pct: 0.02,
            swing_high_lookback: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    GoldenRetrace,
    BbBreakout,
}

impl StrategyKind {
    /// Evaluation order.
    pub const ALL: [StrategyKind; 2] = [StrategyKind::GoldenRetrace, StrategyKind::BbBreakout];

    pub fn code(self) -> &'static str {
        match self {
            StrategyKind::GoldenRetrace => "GOLDEN_RETRACE",
            StrategyKind::BbBreakout => "BB_BREAKOUT",
        }
    }

    pub fn evaluate(
        self,
        bars: &[OhlcvBar],
        indicators: &IndicatorSet,
        params: &SignalParams,
    ) -> Option<SignalCandidate> {
        match self {
            StrategyKind::GoldenRetrace => golden_retrace(bars, indicators, params),
            StrategyKind::BbBreakout => bb_breakout(bars, indicators, params),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::GoldenRetrace => write!(f, "Golden Retrace"),
            StrategyKind::BbBreakout => write!(f, "BB Breakout"),
        }
    }
}

/// A long trade setup. Prices and the ratio are rounded to cents.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalCandidate {
    pub strategy: StrategyKind,
    pub entry: f64,
    pub stop_loss: f64,
    pub target: f64,
    pub reward_risk: f64,
}

impl SignalCandidate {
    /// Rounds the levels and rejects setups whose rounded risk
    /// (entry - stop) is not strictly positive.
    pub fn from_levels(
        strategy: StrategyKind,
        entry: f64,
        stop_loss: f64,
        target: f64,
    ) -> Option<Self> {
        let entry = round2(entry);
        let stop_loss = round2(stop_loss);
        let target = round2(target);
        let risk = entry - stop_loss;
        if risk.is_nan() || risk <= 0.0 {
            return None;
        }
        Some(Self {
            strategy,
            entry,
            stop_loss,
            target,
            reward_risk: round2((target - entry) / risk),
        })
    }

    pub fn risk(&self) -> f64 {
        self.entry - self.stop_loss
    }
}

/// Rounds the exact binary value to two decimals, ties to even.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// `volume > multiplier * vol_ma`; false while the average is undefined.
pub fn is_volume_spike(volume: i64, vol_ma: Option<f64>, multiplier: f64) -> bool {
    match vol_ma {
        Some(avg) => volume as f64 > multiplier * avg,
        None => false,
    }
}

pub fn evaluate_signals(
    bars: &[OhlcvBar],
    indicators: &IndicatorSet,
    params: &SignalParams,
) -> Vec<SignalCandidate> {
    if bars.is_empty() || bars.len() != indicators.len() {
        return Vec::new();
    }
    StrategyKind::ALL
        .iter()
        .filter_map(|s| s.evaluate(bars, indicators, params))
        .collect()
}

/// Shallow pullback to the 20 EMA inside an uptrend, above a warm 200 EMA,
/// on rising volume. Stop under the prior bar's low, target at the recent
/// swing high.
fn golden_retrace(
    bars: &[OhlcvBar],
    indicators: &IndicatorSet,
    params: &SignalParams,
) -> Option<SignalCandidate> {
    let [.., prior, latest] = bars else {
        return None;
    };
    let row = indicators.latest();
    let close = latest.close;

    let trend_up = row.ema_50 < row.ema_20;
    let near_ema = (close - row.ema_20).abs() / close < params.ema_proximity_pct;
    let long_term_bullish = indicators.long_term_bias(close) == Some(true);
    let spike = is_volume_spike(latest.volume, row.vol_ma, params.volume_spike_multiplier);

    if !(trend_up && near_ema && long_term_bullish && spike) {
        return None;
    }

    let lookback = params.swing_high_lookback.max(1);
    let swing_high = bars[bars.len().saturating_sub(lookback)..]
        .iter()
        .map(|b| b.high)
        .fold(f64::MIN, f64::max);

    SignalCandidate::from_levels(StrategyKind::GoldenRetrace, close, prior.low, swing_high)
}

/// Close above the upper Bollinger band on rising volume. Entry at the band,
/// stop at the middle band, target one band-width above the close.
fn bb_breakout(
    bars: &[OhlcvBar],
    indicators: &IndicatorSet,
    params: &SignalParams,
) -> Option<SignalCandidate> {
    let latest = bars.last()?;
    let row = indicators.latest();
    let (upper, middle, lower) = (row.upper_bb?, row.ma_20?, row.lower_bb?);

    let breakout = latest.close > upper;
    let spike = is_volume_spike(latest.volume, row.vol_ma, params.volume_spike_multiplier);
    if !(breakout && spike) {
        return None;
    }

    let width = upper - lower;
    SignalCandidate::from_levels(StrategyKind::BbBreakout, upper, middle, latest.close + width)
}
