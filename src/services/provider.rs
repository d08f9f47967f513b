use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

/// One observation in a provider series. A missing close is a gap (non-trading
/// ticker or failed lookup), never a zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub adj_close: Option<f64>,
}

impl PricePoint {
    pub fn new(date: NaiveDate, adj_close: Option<f64>) -> Self {
        Self { date, adj_close }
    }
}

/// Raw provider payload. A one-symbol request comes back as a bare series, a
/// multi-symbol request as a table keyed by ticker. The shape is resolved once
/// here, at the boundary, so downstream code never branches on container type.
#[derive(Debug, Clone)]
pub enum ProviderResponse {
    SingleSeries(Vec<PricePoint>),
    MultiSeries(HashMap<String, Vec<PricePoint>>),
}

impl ProviderResponse {
    pub fn is_empty(&self) -> bool {
        match self {
            ProviderResponse::SingleSeries(points) => points.is_empty(),
            ProviderResponse::MultiSeries(table) => table.values().all(|p| p.is_empty()),
        }
    }
}

/// Market-data provider seam. Implementations own transport, auth, and rate
/// limiting; an empty response for a fully covered window is a valid result.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn fetch(&self, tickers: &[String], start: NaiveDate) -> Result<ProviderResponse>;
}
