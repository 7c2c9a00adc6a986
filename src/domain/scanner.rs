//! Watchlist scan driver and single-symbol analysis.
//!
//! A scan fetches each symbol in list order, runs the indicator engine and
//! the signal evaluator, and ranks every emitted candidate by reward/risk.
//! Per-symbol failures are recorded as skips and never abort the batch.

use std::fmt;
use std::ops::ControlFlow;

use tracing::{debug, info, warn};

use crate::domain::error::SwingError;
use crate::domain::indicator::{compute_indicators, IndicatorSet};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::period::{Interval, Period};
use crate::domain::signal::{evaluate_signals, SignalCandidate, SignalParams};
use crate::domain::structure::{classify_structure, StructureSnapshot, STRUCTURE_LOOKBACK};
use crate::domain::watchlist::{display_symbol, Watchlist, DEFAULT_SUFFIX};
use crate::ports::data_port::DataPort;

/// Everything a scan or analysis needs besides the data source.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    pub period: Period,
    pub interval: Interval,
    pub params: SignalParams,
    /// Exchange suffix stripped from symbols in results.
    pub symbol_suffix: String,
    pub structure_lookback: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            period: Period::default(),
            interval: Interval::default(),
            params: SignalParams::default(),
            symbol_suffix: DEFAULT_SUFFIX.to_string(),
            structure_lookback: STRUCTURE_LOOKBACK,
        }
    }
}

/// A candidate tagged with the display form of its symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedSignal {
    pub symbol: String,
    pub candidate: SignalCandidate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    FetchFailed(String),
    NoData,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::FetchFailed(reason) => write!(f, "fetch failed: {}", reason),
            SkipReason::NoData => write!(f, "no data returned"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

/// Result of one scan, owned by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    /// Ranked by reward/risk, highest first.
    pub signals: Vec<TaggedSignal>,
    /// Symbols that were fetched and evaluated.
    pub scanned: usize,
    pub skipped: Vec<SkippedSymbol>,
    /// Set when the progress callback stopped the scan early.
    pub cancelled: bool,
}

impl ScanReport {
    pub fn count(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

/// Single-symbol inspection result.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub symbol: String,
    pub bars: Vec<OhlcvBar>,
    pub indicators: IndicatorSet,
    pub structure: StructureSnapshot,
    pub signals: Vec<SignalCandidate>,
    pub squeeze: Option<bool>,
}

impl Analysis {
    pub fn latest_bar(&self) -> &OhlcvBar {
        // bars is never empty once analysis succeeds
        &self.bars[self.bars.len() - 1]
    }
}

pub fn scan(port: &dyn DataPort, watchlist: &Watchlist, options: &ScanOptions) -> ScanReport {
    scan_with_progress(port, watchlist, options, |_, _, _| ControlFlow::Continue(()))
}

/// Runs a scan, calling `progress(index, total, symbol)` before each symbol.
/// Returning `ControlFlow::Break` stops the scan; the report then holds
/// results from the symbols already completed and is flagged `cancelled`.
pub fn scan_with_progress<F>(
    port: &dyn DataPort,
    watchlist: &Watchlist,
    options: &ScanOptions,
    mut progress: F,
) -> ScanReport
where
    F: FnMut(usize, usize, &str) -> ControlFlow<()>,
{
    let total = watchlist.len();
    let mut report = ScanReport::default();

    for (index, symbol) in watchlist.symbols().iter().enumerate() {
        if progress(index, total, symbol).is_break() {
            info!(completed = index, total, "scan cancelled");
            report.cancelled = true;
            break;
        }

        let bars = match port.fetch_bars(symbol, options.period, options.interval) {
            Ok(bars) => bars,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "skipping symbol");
                report.skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason: SkipReason::FetchFailed(e.to_string()),
                });
                continue;
            }
        };

        // compute_indicators only fails on an empty series
        let indicators = match compute_indicators(&bars) {
            Ok(ind) => ind,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "skipping symbol: no data");
                report.skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason: SkipReason::NoData,
                });
                continue;
            }
        };

        report.scanned += 1;
        let display = display_symbol(symbol, &options.symbol_suffix);
        let found = evaluate_signals(&bars, &indicators, &options.params);
        debug!(symbol = %symbol, bars = bars.len(), signals = found.len(), "evaluated");

        report
            .signals
            .extend(found.into_iter().map(|candidate| TaggedSignal {
                symbol: display.to_string(),
                candidate,
            }));
    }

    rank_signals(&mut report.signals);
    report
}

/// Sorts by reward/risk descending. Ties keep insertion order.
pub fn rank_signals(signals: &mut [TaggedSignal]) {
    signals.sort_by(|a, b| b.candidate.reward_risk.total_cmp(&a.candidate.reward_risk));
}

/// Fetches one symbol and returns its full indicator table, structure and
/// any active signals.
pub fn analyze(
    port: &dyn DataPort,
    symbol: &str,
    options: &ScanOptions,
) -> Result<Analysis, SwingError> {
    let bars = port
        .fetch_bars(symbol, options.period, options.interval)
        .map_err(|e| match e {
            SwingError::DataUnavailable { .. } => e,
            other => SwingError::unavailable(symbol, other.to_string()),
        })?;

    if bars.is_empty() {
        return Err(SwingError::unavailable(symbol, "no bars returned"));
    }

    let indicators = compute_indicators(&bars)?;
    let structure = classify_structure(&bars, &indicators, options.structure_lookback)
        .ok_or(SwingError::EmptySeries)?;
    let signals = evaluate_signals(&bars, &indicators, &options.params);
    let squeeze = indicators.squeeze();

    debug!(symbol = %symbol, bars = bars.len(), trend = %structure.trend, "analyzed");

    Ok(Analysis {
        symbol: symbol.to_string(),
        bars,
        indicators,
        structure,
        signals,
        squeeze,
    })
}
