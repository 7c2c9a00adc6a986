//! Core domain types and logic.

pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod ohlcv;
pub mod period;
pub mod position;
pub mod scanner;
pub mod signal;
pub mod structure;
pub mod watchlist;
