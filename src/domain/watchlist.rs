//! Watchlist of symbols scanned on every run.
//!
//! Parsed once from a one-symbol-per-line list and read-only afterwards.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::domain::error::SwingError;

/// Built-in list used when no watchlist file is configured.
pub const DEFAULT_WATCHLIST: &str = include_str!("../../config/watchlist.txt");

pub const DEFAULT_SUFFIX: &str = ".NS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watchlist {
    symbols: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WatchlistError {
    #[error("watchlist contains no symbols")]
    Empty,

    #[error("duplicate symbol on line {line}: {symbol}")]
    DuplicateSymbol { symbol: String, line: usize },

    #[error("invalid symbol on line {line}: {symbol:?}")]
    InvalidSymbol { symbol: String, line: usize },
}

impl Watchlist {
    pub fn parse(input: &str) -> Result<Self, WatchlistError> {
        let mut symbols = Vec::new();
        let mut seen = HashSet::new();

        for (idx, raw) in input.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if trimmed.chars().any(char::is_whitespace) {
                return Err(WatchlistError::InvalidSymbol {
                    symbol: trimmed.to_string(),
                    line,
                });
            }
            let symbol = trimmed.to_uppercase();
            if !seen.insert(symbol.clone()) {
                return Err(WatchlistError::DuplicateSymbol { symbol, line });
            }
            symbols.push(symbol);
        }

        if symbols.is_empty() {
            return Err(WatchlistError::Empty);
        }
        Ok(Self { symbols })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SwingError> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content)?)
    }

    pub fn builtin() -> Result<Self, WatchlistError> {
        Self::parse(DEFAULT_WATCHLIST)
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Strips the exchange suffix for display ("SBIN.NS" -> "SBIN").
pub fn display_symbol<'a>(symbol: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() {
        return symbol;
    }
    symbol.strip_suffix(suffix).unwrap_or(symbol)
}

/// Upper-cases a bare ticker and appends the exchange suffix if missing.
pub fn qualify_symbol(ticker: &str, suffix: &str) -> String {
    let ticker = ticker.trim().to_uppercase();
    if suffix.is_empty() || ticker.ends_with(&suffix.to_uppercase()) {
        ticker
    } else {
        format!("{ticker}{suffix}")
    }
}
