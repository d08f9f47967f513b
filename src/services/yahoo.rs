//! Yahoo Finance chart-API provider.
//!
//! One HTTP request per symbol against the v8 chart endpoint. A single-symbol
//! fetch surfaces as a bare series and a multi-symbol fetch as a table, so the
//! shaping layer sees both response shapes the upstream API family produces.

use crate::constants::PROVIDER_RATE_LIMIT_PER_MINUTE;
use crate::error::{Error, Result};
use crate::services::provider::{PricePoint, PriceProvider, ProviderResponse};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use isahc::{config::Configurable, prelude::*, HttpClient};
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration as StdDuration, Instant};
use tokio::sync::Mutex as TokioMutex;
use tokio::time::sleep;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36";

/// Sliding-window request limiter shared across all fetches of one client.
struct SharedRateLimiter {
    request_timestamps: TokioMutex<Vec<Instant>>,
    rate_limit_per_minute: u32,
}

impl SharedRateLimiter {
    fn new(rate_limit_per_minute: u32) -> Self {
        Self {
            request_timestamps: TokioMutex::new(Vec::new()),
            rate_limit_per_minute,
        }
    }

    async fn enforce(&self) {
        let window = StdDuration::from_secs(60);
        let mut timestamps = self.request_timestamps.lock().await;
        let now = Instant::now();
        timestamps.retain(|t| now.duration_since(*t) < window);

        if timestamps.len() >= self.rate_limit_per_minute as usize {
            if let Some(oldest) = timestamps.first().copied() {
                let wait = window.saturating_sub(now.duration_since(oldest));
                if !wait.is_zero() {
                    // Drop the lock while sleeping so other tasks can re-check.
                    drop(timestamps);
                    sleep(wait + StdDuration::from_millis(100)).await;
                    timestamps = self.request_timestamps.lock().await;
                }
            }
        }

        timestamps.push(Instant::now());
    }
}

pub struct YahooClient {
    client: HttpClient,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl YahooClient {
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(PROVIDER_RATE_LIMIT_PER_MINUTE)
    }

    pub fn with_rate_limit(rate_limit_per_minute: u32) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(StdDuration::from_secs(30))
            .default_header("User-Agent", USER_AGENT)
            .default_header("Accept", "application/json, text/plain, */*")
            .build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            rate_limiter: SharedRateLimiter::new(rate_limit_per_minute),
        })
    }

    /// Daily adjusted closes for one symbol from `start` through today.
    async fn fetch_series(&self, symbol: &str, start: NaiveDate) -> Result<Vec<PricePoint>> {
        self.rate_limiter.enforce().await;

        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = Utc::now().timestamp();
        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=div%2Csplit",
            self.base_url,
            symbol.replace('^', "%5E"),
            period1,
            period2
        );

        debug!(symbol = symbol, start = %start, "Requesting chart data");

        let mut response = self.client.get_async(&url).await?;
        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "Chart request for {} returned {}",
                symbol,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read chart body: {}", e)))?;

        parse_chart(&body, symbol)
    }
}

/// Decode one chart payload into price points.
///
/// A payload with no result or no timestamps is an empty series, not an
/// error. Missing `adjclose` falls back to the raw quote close before the
/// shape is declared unknown.
fn parse_chart(body: &str, symbol: &str) -> Result<Vec<PricePoint>> {
    let value: Value = serde_json::from_str(body)?;
    let chart = &value["chart"];

    if let Some(error) = chart["error"].as_object() {
        let description = error
            .get("description")
            .and_then(|d| d.as_str())
            .unwrap_or("unknown provider error");
        return Err(Error::Network(format!("{}: {}", symbol, description)));
    }

    let result = match chart["result"].get(0) {
        Some(result) if !result.is_null() => result,
        _ => return Ok(Vec::new()),
    };

    let timestamps = match result["timestamp"].as_array() {
        Some(timestamps) => timestamps,
        None => return Ok(Vec::new()),
    };

    let closes = result["indicators"]["adjclose"][0]["adjclose"]
        .as_array()
        .or_else(|| result["indicators"]["quote"][0]["close"].as_array())
        .ok_or_else(|| {
            Error::Schema(format!("No adjclose or close series for {}", symbol))
        })?;

    let mut points = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let timestamp = ts.as_i64().ok_or_else(|| {
            Error::Parse(format!("Non-numeric timestamp at index {} for {}", i, symbol))
        })?;
        let time = DateTime::<Utc>::from_timestamp(timestamp, 0).ok_or_else(|| {
            Error::Parse(format!("Out-of-range timestamp {} for {}", timestamp, symbol))
        })?;

        let adj_close = closes.get(i).and_then(|v| v.as_f64());
        points.push(PricePoint::new(time.date_naive(), adj_close));
    }

    Ok(points)
}

#[async_trait]
impl PriceProvider for YahooClient {
    async fn fetch(&self, tickers: &[String], start: NaiveDate) -> Result<ProviderResponse> {
        if tickers.len() == 1 {
            let points = self.fetch_series(&tickers[0], start).await?;
            return Ok(ProviderResponse::SingleSeries(points));
        }

        let mut table = HashMap::new();
        for ticker in tickers {
            match self.fetch_series(ticker, start).await {
                Ok(points) => {
                    table.insert(ticker.clone(), points);
                }
                Err(e) => {
                    // A failed lookup is a gap in the table, like the
                    // upstream batch API behaves; the batch itself survives.
                    warn!(ticker = ticker.as_str(), error = %e, "Symbol fetch failed, leaving a gap");
                }
            }
        }
        Ok(ProviderResponse::MultiSeries(table))
    }
}
