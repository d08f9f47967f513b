//! Constituent list sources.
//!
//! A constituent table is whatever a publisher serves: header names drift
//! between `Symbol`, `symbol`, `Ticker`, and `ticker`, so the symbol column
//! is probed rather than assumed. The curated Milan list is resolved here as
//! one more source, just with fixed candidates instead of a URL.

use crate::constants::{CONSTITUENT_SOURCES, ITALY_MI, ITALY_SOURCE_KEY, SYMBOL_COLUMNS};
use crate::error::{Error, Result};
use isahc::{config::Configurable, prelude::*, HttpClient};
use std::collections::HashMap;
use std::time::Duration as StdDuration;
use tracing::debug;

/// A downloaded table: header row plus string cells.
#[derive(Debug, Clone)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Pull the symbol column out, probing the known header candidates.
    pub fn symbol_column(&self) -> Result<Vec<String>> {
        for candidate in SYMBOL_COLUMNS {
            if let Some(idx) = self.headers.iter().position(|h| h == candidate) {
                return Ok(self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| cell.trim().to_string())
                    .collect());
            }
        }
        Err(Error::Schema(format!(
            "No symbol column among headers {:?}",
            self.headers
        )))
    }
}

/// Tabular-source seam: fetch a symbol-bearing table from a URL.
pub trait TabularSource {
    fn fetch_table(&self, url: &str) -> Result<Table>;
}

/// HTTP implementation downloading CSV tables.
pub struct HttpTabularSource {
    client: HttpClient,
}

impl HttpTabularSource {
    pub fn new() -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(StdDuration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }
}

impl TabularSource for HttpTabularSource {
    fn fetch_table(&self, url: &str) -> Result<Table> {
        debug!(url = url, "Downloading constituent table");

        let mut response = self.client.get(url)?;
        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "Constituent request {} returned {}",
                url,
                response.status()
            )));
        }

        let body = response
            .text()
            .map_err(|e| Error::Network(format!("Failed to read table body: {}", e)))?;

        let mut reader = csv::Reader::from_reader(body.as_bytes());
        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Table { headers, rows })
    }
}

/// Resolves a source key to its candidate symbols: curated lists come from
/// the repo, everything else from a fetched table.
pub struct ConstituentCatalog<S> {
    source: S,
    endpoints: HashMap<&'static str, &'static str>,
    curated: HashMap<&'static str, Vec<String>>,
}

impl<S: TabularSource> ConstituentCatalog<S> {
    /// Catalog over the reference endpoints and curated lists.
    pub fn new(source: S) -> Self {
        let mut curated = HashMap::new();
        curated.insert(
            ITALY_SOURCE_KEY,
            ITALY_MI.iter().map(|s| s.to_string()).collect(),
        );

        Self {
            source,
            endpoints: CONSTITUENT_SOURCES.iter().copied().collect(),
            curated,
        }
    }

    /// Catalog with explicit endpoints, for callers that bring their own.
    pub fn with_endpoints(
        source: S,
        endpoints: HashMap<&'static str, &'static str>,
        curated: HashMap<&'static str, Vec<String>>,
    ) -> Self {
        Self {
            source,
            endpoints,
            curated,
        }
    }

    /// Candidate symbols for one source key, in publication order.
    pub fn candidates(&self, key: &str) -> Result<Vec<String>> {
        if let Some(list) = self.curated.get(key) {
            return Ok(list.clone());
        }

        let url = self
            .endpoints
            .get(key)
            .ok_or_else(|| Error::Config(format!("Unknown constituent source: {}", key)))?;

        self.source.fetch_table(url)?.symbol_column()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_symbol_column_probes_alternate_headers() {
        let t = table(&["Name", "ticker"], &[&["Apple", "AAPL"], &["Microsoft", "MSFT"]]);
        assert_eq!(t.symbol_column().unwrap(), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn test_preferred_header_wins_over_later_candidates() {
        let t = table(&["Ticker", "Symbol"], &[&["WRONG", "AAPL"]]);
        assert_eq!(t.symbol_column().unwrap(), vec!["AAPL"]);
    }

    #[test]
    fn test_missing_symbol_column_is_schema_error() {
        let t = table(&["Name", "Sector"], &[&["Apple", "Tech"]]);
        assert!(matches!(t.symbol_column(), Err(Error::Schema(_))));
    }

    struct NoSource;

    impl TabularSource for NoSource {
        fn fetch_table(&self, url: &str) -> Result<Table> {
            Err(Error::Network(format!("offline: {}", url)))
        }
    }

    #[test]
    fn test_curated_source_needs_no_fetch() {
        let catalog = ConstituentCatalog::new(NoSource);
        let candidates = catalog.candidates(ITALY_SOURCE_KEY).unwrap();
        assert_eq!(candidates.len(), ITALY_MI.len());
        assert_eq!(candidates[0], "ENEL.MI");
    }

    #[test]
    fn test_unknown_key_is_config_error() {
        let catalog = ConstituentCatalog::new(NoSource);
        assert!(matches!(
            catalog.candidates("nope"),
            Err(Error::Config(_))
        ));
    }
}
