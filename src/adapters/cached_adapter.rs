//! Time-limited in-process cache in front of any data port.

use crate::domain::error::SwingError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::period::{Interval, Period};
use crate::ports::data_port::DataPort;
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

type CacheKey = (String, Period, Interval);

/// Caches successful fetches keyed by (symbol, period, interval). Failed
/// fetches are passed through and never cached.
pub struct CachedDataPort<P> {
    inner: P,
    ttl: Duration,
    entries: RefCell<HashMap<CacheKey, (Instant, Vec<OhlcvBar>)>>,
}

impl<P: DataPort> CachedDataPort<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RefCell::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl<P: DataPort> DataPort for CachedDataPort<P> {
    fn fetch_bars(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<OhlcvBar>, SwingError> {
        let key = (symbol.to_string(), period, interval);

        if let Some((fetched_at, bars)) = self.entries.borrow().get(&key) {
            if fetched_at.elapsed() < self.ttl {
                debug!(symbol = %symbol, "cache hit");
                return Ok(bars.clone());
            }
        }

        let bars = self.inner.fetch_bars(symbol, period, interval)?;
        self.entries
            .borrow_mut()
            .insert(key, (Instant::now(), bars.clone()));
        Ok(bars)
    }
}
