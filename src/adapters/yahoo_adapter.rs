//! Yahoo Finance chart API data adapter.
//!
//! Fetches OHLCV bars from the v8 chart endpoint using Yahoo's own
//! `range`/`interval` selectors. Transient failures (timeouts, connection
//! errors, 429 and 5xx responses) are retried with exponential backoff.

use crate::domain::error::SwingError;
use crate::domain::ohlcv::{normalize_series, OhlcvBar};
use crate::domain::period::{Interval, Period};
use crate::ports::data_port::DataPort;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooAdapter {
    pub fn new(timeout_secs: u64, max_retries: u32) -> Result<Self, SwingError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(std::io::Error::other)?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            max_retries,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Points the adapter at a different chart endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn chart_url(&self, symbol: &str, period: Period, interval: Interval) -> String {
        format!(
            "{}/{}?range={}&interval={}",
            self.base_url.trim_end_matches('/'),
            symbol,
            period,
            interval
        )
    }

    fn fetch_with_retry(&self, symbol: &str, url: &str) -> Result<ChartResponse, SwingError> {
        let mut last_error = String::new();

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                debug!(symbol = %symbol, attempt, delay_ms = delay.as_millis() as u64, "retrying");
                std::thread::sleep(delay);
            }

            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
                    {
                        last_error = format!("HTTP {status}");
                        warn!(symbol = %symbol, %status, attempt, "transient HTTP error");
                        continue;
                    }

                    // 404 still carries a chart.error body worth reporting
                    if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
                        return Err(SwingError::unavailable(symbol, format!("HTTP {status}")));
                    }

                    return resp.json::<ChartResponse>().map_err(|e| {
                        SwingError::unavailable(symbol, format!("failed to parse response: {e}"))
                    });
                }
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = e.to_string();
                    warn!(symbol = %symbol, error = %e, attempt, "network error");
                }
                Err(e) => return Err(SwingError::unavailable(symbol, e.to_string())),
            }
        }

        Err(SwingError::unavailable(
            symbol,
            format!(
                "giving up after {} attempts: {}",
                self.max_retries + 1,
                last_error
            ),
        ))
    }
}

/// Converts a chart response into ascending bars. Rows missing any price
/// field (holidays, halted sessions) are dropped.
fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<OhlcvBar>, SwingError> {
    let result = match (resp.chart.result, resp.chart.error) {
        (Some(result), _) => result,
        (None, Some(err)) => {
            return Err(SwingError::unavailable(
                symbol,
                format!("{}: {}", err.code, err.description),
            ))
        }
        (None, None) => {
            return Err(SwingError::unavailable(symbol, "empty result with no error"))
        }
    };

    let Some(data) = result.into_iter().next() else {
        return Ok(Vec::new());
    };
    let timestamps = data.timestamp.unwrap_or_default();
    let Some(quote) = data.indicators.quote.into_iter().next() else {
        return Ok(Vec::new());
    };

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.naive_utc().date())
            .ok_or_else(|| SwingError::unavailable(symbol, format!("invalid timestamp: {ts}")))?;

        let open = quote.open.get(i).copied().flatten();
        let high = quote.high.get(i).copied().flatten();
        let low = quote.low.get(i).copied().flatten();
        let close = quote.close.get(i).copied().flatten();
        let volume = quote.volume.get(i).copied().flatten();

        let (Some(open), Some(high), Some(low), Some(close)) = (open, high, low, close) else {
            debug!(symbol = %symbol, %date, "dropping row with missing prices");
            continue;
        };
        let Ok(volume) = i64::try_from(volume.unwrap_or(0)) else {
            warn!(symbol = %symbol, %date, "dropping row with out-of-range volume");
            continue;
        };

        bars.push(OhlcvBar {
            date,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    Ok(normalize_series(bars))
}

impl DataPort for YahooAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<OhlcvBar>, SwingError> {
        let url = self.chart_url(symbol, period, interval);
        debug!(symbol = %symbol, url = %url, "fetching chart");
        let chart = self.fetch_with_retry(symbol, &url)?;
        let bars = parse_response(symbol, chart)?;
        debug!(symbol = %symbol, bars = bars.len(), "fetched bars");
        Ok(bars)
    }
}
