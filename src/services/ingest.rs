//! Ingestion scheduling.
//!
//! One run: derive the fetch start from the archive's high-water mark, fetch
//! the index list plus the equity universe in bounded batches, shape every
//! response into canonical rows, and merge each archive once. A failing batch
//! is contained and skipped; the run always completes with a summary.

use crate::error::{Error, Result};
use crate::models::{ArchiveKind, IngestConfig, IngestSummary, PriceRecord};
use crate::services::high_water;
use crate::services::partition_store::{MergeOutcome, PartitionStore};
use crate::services::provider::PriceProvider;
use crate::services::shaping::shape_records;
use chrono::{Duration, NaiveDate, Utc};
use tracing::{info, warn};

pub struct IngestRunner<P> {
    config: IngestConfig,
    store: PartitionStore,
    provider: P,
}

impl<P: PriceProvider> IngestRunner<P> {
    pub fn new(config: IngestConfig, provider: P) -> Self {
        let store = PartitionStore::new(config.data_dir.clone());
        Self {
            config,
            store,
            provider,
        }
    }

    /// Fetch start for this run: explicit override, else the day after the
    /// high-water mark, else the configured lookback from today.
    pub fn effective_start_date(&self) -> NaiveDate {
        if let Some(start) = self.config.start_override {
            return start;
        }

        let roots = [
            self.store.kind_root(ArchiveKind::Prices),
            self.store.kind_root(ArchiveKind::Indices),
        ];

        match high_water::scan(&roots) {
            Some(last) => last + Duration::days(1),
            None => Utc::now().date_naive() - Duration::days(self.config.lookback_days),
        }
    }

    /// Run one ingestion cycle over `universe`.
    pub async fn run(&self, universe: &[String]) -> Result<IngestSummary> {
        let start = self.effective_start_date();
        let mut summary = IngestSummary {
            start_date: Some(start),
            ..Default::default()
        };

        info!(
            start_date = %start,
            universe_size = universe.len(),
            batch_size = self.config.batch_size,
            "Starting ingestion run"
        );

        // Index list is short; one request covers it.
        let mut index_records = Vec::new();
        if !self.config.index_tickers.is_empty() {
            summary.batches_total += 1;
            match self.fetch_batch(&self.config.index_tickers, start).await {
                Ok(records) => index_records = records,
                Err(e) => {
                    warn!(error = %e, "Index fetch failed, continuing without index data");
                    summary.batches_failed += 1;
                    summary.warnings.push(format!("index batch: {}", e));
                }
            }
        }

        let mut equity_records = Vec::new();
        for (batch_idx, batch) in universe.chunks(self.config.batch_size.max(1)).enumerate() {
            summary.batches_total += 1;
            match self.fetch_batch(batch, start).await {
                Ok(records) => {
                    info!(
                        batch = batch_idx + 1,
                        tickers = batch.len(),
                        records = records.len(),
                        "Batch shaped"
                    );
                    equity_records.extend(records);
                }
                Err(e) => {
                    warn!(
                        batch = batch_idx + 1,
                        tickers = batch.len(),
                        error = %e,
                        "Batch failed, skipping"
                    );
                    summary.batches_failed += 1;
                    summary
                        .warnings
                        .push(format!("equity batch {}: {}", batch_idx + 1, e));
                }
            }
        }

        summary.equity_records = equity_records.len();
        summary.index_records = index_records.len();

        let prices_outcome = self.store.merge(ArchiveKind::Prices, equity_records)?;
        let indices_outcome = self.store.merge(ArchiveKind::Indices, index_records)?;
        self.record_merge(&mut summary, ArchiveKind::Prices, prices_outcome);
        self.record_merge(&mut summary, ArchiveKind::Indices, indices_outcome);

        if summary.no_new_data() {
            info!(start_date = %start, "No new data for the requested window");
        }

        Ok(summary)
    }

    fn record_merge(&self, summary: &mut IngestSummary, kind: ArchiveKind, outcome: MergeOutcome) {
        summary.partitions_rewritten += outcome.partitions;
        if outcome.skipped_partitions > 0 {
            summary.warnings.push(format!(
                "{}: {} unreadable partition(s) left untouched",
                kind.dir_name(),
                outcome.skipped_partitions
            ));
        }
    }

    /// One bounded provider call, shaped to canonical rows.
    async fn fetch_batch(&self, tickers: &[String], start: NaiveDate) -> Result<Vec<PriceRecord>> {
        let response = tokio::time::timeout(
            self.config.batch_timeout,
            self.provider.fetch(tickers, start),
        )
        .await
        .map_err(|_| {
            Error::Network(format!(
                "Provider request timed out after {}s",
                self.config.batch_timeout.as_secs()
            ))
        })??;

        Ok(shape_records(response, tickers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::provider::{PricePoint, ProviderResponse};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    /// Provider returning one fixed-price row per requested ticker, erroring
    /// on any batch containing a ticker named "BOOM".
    struct FixtureProvider {
        date: NaiveDate,
    }

    #[async_trait]
    impl PriceProvider for FixtureProvider {
        async fn fetch(&self, tickers: &[String], _start: NaiveDate) -> Result<ProviderResponse> {
            if tickers.iter().any(|t| t == "BOOM") {
                return Err(Error::Network("connection reset".to_string()));
            }
            let mut table = HashMap::new();
            for ticker in tickers {
                table.insert(ticker.clone(), vec![PricePoint::new(self.date, Some(1.0))]);
            }
            Ok(ProviderResponse::MultiSeries(table))
        }
    }

    /// Provider that always comes back empty (window already covered).
    struct EmptyProvider;

    #[async_trait]
    impl PriceProvider for EmptyProvider {
        async fn fetch(&self, _tickers: &[String], _start: NaiveDate) -> Result<ProviderResponse> {
            Ok(ProviderResponse::MultiSeries(HashMap::new()))
        }
    }

    fn config(dir: &TempDir) -> IngestConfig {
        IngestConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        }
    }

    fn seed_partition(dir: &TempDir, rel: &str, body: &str) {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn test_start_is_day_after_high_water_mark() {
        let dir = TempDir::new().unwrap();
        seed_partition(
            &dir,
            "prices/2024/01.csv",
            "date,ticker,adj_close\n2024-01-05,AAPL,191.0\n",
        );

        let runner = IngestRunner::new(
            config(&dir),
            EmptyProvider,
        );
        assert_eq!(
            runner.effective_start_date(),
            NaiveDate::from_ymd_opt(2024, 1, 6).unwrap()
        );
    }

    #[test]
    fn test_empty_archive_falls_back_to_lookback() {
        let dir = TempDir::new().unwrap();
        let runner = IngestRunner::new(config(&dir), EmptyProvider);

        let expected = Utc::now().date_naive() - Duration::days(3650);
        assert_eq!(runner.effective_start_date(), expected);
    }

    #[test]
    fn test_start_override_wins_over_archive() {
        let dir = TempDir::new().unwrap();
        seed_partition(
            &dir,
            "indices/2024/01.csv",
            "date,ticker,adj_close\n2024-01-05,^GSPC,4700.0\n",
        );

        let override_date = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
        let mut cfg = config(&dir);
        cfg.start_override = Some(override_date);

        let runner = IngestRunner::new(cfg, EmptyProvider);
        assert_eq!(runner.effective_start_date(), override_date);
    }

    #[tokio::test]
    async fn test_failing_batch_does_not_abort_run() {
        let dir = TempDir::new().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();

        let mut cfg = config(&dir);
        cfg.batch_size = 1;
        let runner = IngestRunner::new(cfg, FixtureProvider { date });

        let universe = vec!["AAPL".to_string(), "BOOM".to_string(), "MSFT".to_string()];
        let summary = runner.run(&universe).await.unwrap();

        // 1 index batch + 3 equity batches, one of which failed.
        assert_eq!(summary.batches_total, 4);
        assert_eq!(summary.batches_failed, 1);
        assert_eq!(summary.equity_records, 2);
        assert_eq!(summary.index_records, 1);
        assert_eq!(summary.warnings.len(), 1);

        let body =
            fs::read_to_string(dir.path().join("prices/2024/01.csv")).unwrap();
        assert!(body.contains("AAPL"));
        assert!(body.contains("MSFT"));
        assert!(!body.contains("BOOM"));
    }

    #[tokio::test]
    async fn test_empty_fetch_reports_no_new_data_and_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let runner = IngestRunner::new(config(&dir), EmptyProvider);

        let summary = runner.run(&["AAPL".to_string()]).await.unwrap();
        assert!(summary.no_new_data());
        assert_eq!(summary.partitions_rewritten, 0);
        assert!(!dir.path().join("prices").exists());
        assert!(!dir.path().join("indices").exists());
    }

    #[tokio::test]
    async fn test_index_records_routed_to_indices_archive() {
        let dir = TempDir::new().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let runner = IngestRunner::new(config(&dir), FixtureProvider { date });

        runner.run(&["AAPL".to_string()]).await.unwrap();

        let indices =
            fs::read_to_string(dir.path().join("indices/2024/01.csv")).unwrap();
        assert!(indices.contains("^GSPC"));

        let prices =
            fs::read_to_string(dir.path().join("prices/2024/01.csv")).unwrap();
        assert!(!prices.contains("^GSPC"));
    }
}
