//! Market data access port.

use crate::domain::error::SwingError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::period::{Interval, Period};

pub trait DataPort {
    /// Bars for `symbol` covering `period` at `interval` granularity, in
    /// ascending date order. An error or an empty vector both mean the
    /// symbol has no usable data.
    fn fetch_bars(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<OhlcvBar>, SwingError>;
}
