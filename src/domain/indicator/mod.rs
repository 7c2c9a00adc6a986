//! Technical indicator engine.
//!
//! [`compute_indicators`] derives the fixed indicator set used by the
//! structure classifier and the signal evaluator:
//! - EMA 20/50/200 of close (seeded recursive form, defined at every index)
//! - SMA 20 and sample StdDev 20 of close
//! - Bollinger bands at SMA 20 +/- 2 StdDev
//! - SMA 20 of volume
//!
//! Every value at index i depends only on bars 0..=i. Windowed values are
//! `None` until their window is full.

pub mod bollinger;
pub mod ema;
pub mod sma;
pub mod stddev;

use chrono::NaiveDate;
use std::fmt;

use crate::domain::error::SwingError;
use crate::domain::ohlcv::OhlcvBar;

pub const EMA_SHORT: usize = 20;
pub const EMA_MEDIUM: usize = 50;
pub const EMA_LONG: usize = 200;
pub const BB_PERIOD: usize = 20;
pub const BB_MULT: f64 = 2.0;
pub const VOLUME_PERIOD: usize = 20;
pub const SQUEEZE_LOOKBACK: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Ema(usize),
    Sma(usize),
    Stddev(usize),
    BollingerUpper(usize),
    BollingerLower(usize),
    VolumeSma(usize),
}

impl IndicatorKind {
    /// Columns of an [`IndicatorSet`], in display order.
    pub const ALL: [IndicatorKind; 8] = [
        IndicatorKind::Ema(EMA_SHORT),
        IndicatorKind::Ema(EMA_MEDIUM),
        IndicatorKind::Ema(EMA_LONG),
        IndicatorKind::Sma(BB_PERIOD),
        IndicatorKind::Stddev(BB_PERIOD),
        IndicatorKind::BollingerUpper(BB_PERIOD),
        IndicatorKind::BollingerLower(BB_PERIOD),
        IndicatorKind::VolumeSma(VOLUME_PERIOD),
    ];
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorKind::Ema(period) => write!(f, "EMA({})", period),
            IndicatorKind::Sma(period) => write!(f, "SMA({})", period),
            IndicatorKind::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorKind::BollingerUpper(period) => write!(f, "BB_UPPER({})", period),
            IndicatorKind::BollingerLower(period) => write!(f, "BB_LOWER({})", period),
            IndicatorKind::VolumeSma(period) => write!(f, "VOL_SMA({})", period),
        }
    }
}

/// One row of the indicator table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub ema_20: f64,
    pub ema_50: f64,
    pub ema_200: f64,
    pub ma_20: Option<f64>,
    pub std_20: Option<f64>,
    pub upper_bb: Option<f64>,
    pub lower_bb: Option<f64>,
    pub vol_ma: Option<f64>,
}

/// Column-oriented indicator table aligned index-for-index with its bars.
/// Never empty.
#[derive(Debug, Clone)]
pub struct IndicatorSet {
    dates: Vec<NaiveDate>,
    ema_20: Vec<f64>,
    ema_50: Vec<f64>,
    ema_200: Vec<f64>,
    ma_20: Vec<Option<f64>>,
    std_20: Vec<Option<f64>>,
    upper_bb: Vec<Option<f64>>,
    lower_bb: Vec<Option<f64>>,
    vol_ma: Vec<Option<f64>>,
}

impl IndicatorSet {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn row(&self, i: usize) -> Option<IndicatorRow> {
        (i < self.len()).then(|| self.row_at(i))
    }

    pub fn latest(&self) -> IndicatorRow {
        self.row_at(self.len() - 1)
    }

    fn row_at(&self, i: usize) -> IndicatorRow {
        IndicatorRow {
            date: self.dates[i],
            ema_20: self.ema_20[i],
            ema_50: self.ema_50[i],
            ema_200: self.ema_200[i],
            ma_20: self.ma_20[i],
            std_20: self.std_20[i],
            upper_bb: self.upper_bb[i],
            lower_bb: self.lower_bb[i],
            vol_ma: self.vol_ma[i],
        }
    }

    /// True once enough bars exist for the `span`-period EMA to have
    /// shed its seed.
    pub fn is_warm(&self, span: usize) -> bool {
        self.len() >= span
    }

    /// Whether `close` sits above the latest EMA200; `None` until that
    /// average is warm.
    pub fn long_term_bias(&self, close: f64) -> Option<bool> {
        self.is_warm(EMA_LONG)
            .then(|| close > self.latest().ema_200)
    }

    pub fn value(&self, kind: IndicatorKind, i: usize) -> Option<f64> {
        if i >= self.len() {
            return None;
        }
        match kind {
            IndicatorKind::Ema(EMA_SHORT) => Some(self.ema_20[i]),
            IndicatorKind::Ema(EMA_MEDIUM) => Some(self.ema_50[i]),
            IndicatorKind::Ema(EMA_LONG) => Some(self.ema_200[i]),
            IndicatorKind::Sma(BB_PERIOD) => self.ma_20[i],
            IndicatorKind::Stddev(BB_PERIOD) => self.std_20[i],
            IndicatorKind::BollingerUpper(BB_PERIOD) => self.upper_bb[i],
            IndicatorKind::BollingerLower(BB_PERIOD) => self.lower_bb[i],
            IndicatorKind::VolumeSma(VOLUME_PERIOD) => self.vol_ma[i],
            _ => None,
        }
    }

    /// Normalized Bollinger bandwidth, `(upper - lower) / middle`, per row.
    pub fn bandwidth(&self) -> Vec<Option<f64>> {
        bollinger::normalized_bandwidth(&self.upper_bb, &self.lower_bb, &self.ma_20)
    }

    /// Diagnostic only: latest bandwidth below its trailing average.
    pub fn squeeze(&self) -> Option<bool> {
        bollinger::squeeze_state(&self.bandwidth(), SQUEEZE_LOOKBACK)
    }
}

pub fn compute_indicators(bars: &[OhlcvBar]) -> Result<IndicatorSet, SwingError> {
    if bars.is_empty() {
        return Err(SwingError::EmptySeries);
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume as f64).collect();

    let ma_20 = sma::calculate_sma(&closes, BB_PERIOD);
    let std_20 = stddev::calculate_stddev(&closes, BB_PERIOD);
    let bands = bollinger::calculate_bollinger(&ma_20, &std_20, BB_MULT);

    Ok(IndicatorSet {
        dates: bars.iter().map(|b| b.date).collect(),
        ema_20: ema::calculate_ema(&closes, EMA_SHORT),
        ema_50: ema::calculate_ema(&closes, EMA_MEDIUM),
        ema_200: ema::calculate_ema(&closes, EMA_LONG),
        ma_20,
        std_20,
        upper_bb: bands.upper,
        lower_bb: bands.lower,
        vol_ma: sma::calculate_sma(&volumes, VOLUME_PERIOD),
    })
}
