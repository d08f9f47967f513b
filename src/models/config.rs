use crate::constants::{
    BATCH_TIMEOUT_SECS, DEFAULT_BATCH_SIZE, EMPTY_ARCHIVE_LOOKBACK_DAYS, INDEX_TICKERS,
};
use crate::utils::get_data_dir;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Archive root holding the prices/ and indices/ trees.
    pub data_dir: PathBuf,

    /// Index series fetched in one request alongside the equity batches.
    pub index_tickers: Vec<String>,

    /// Tickers per provider request.
    pub batch_size: usize,

    /// Explicit fetch start; overrides the high-water mark when set.
    pub start_override: Option<NaiveDate>,

    /// How far back to reach when the archive is empty.
    pub lookback_days: i64,

    /// Per-batch bound on the provider call; a timeout skips the batch.
    pub batch_timeout: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_dir: get_data_dir(),
            index_tickers: INDEX_TICKERS.iter().map(|t| t.to_string()).collect(),
            batch_size: DEFAULT_BATCH_SIZE,
            start_override: None,
            lookback_days: EMPTY_ARCHIVE_LOOKBACK_DAYS,
            batch_timeout: Duration::from_secs(BATCH_TIMEOUT_SECS),
        }
    }
}

/// Outcome of one ingestion run; the user-visible report.
#[derive(Debug, Default)]
pub struct IngestSummary {
    /// Effective fetch start date for the run.
    pub start_date: Option<NaiveDate>,

    /// Canonical equity records produced by shaping across all batches.
    pub equity_records: usize,

    /// Canonical index records produced by shaping.
    pub index_records: usize,

    /// Provider requests issued (index request included).
    pub batches_total: usize,

    /// Requests skipped after an error or timeout.
    pub batches_failed: usize,

    /// Partitions rewritten across both archives.
    pub partitions_rewritten: usize,

    /// Warnings accumulated over the run, one per contained failure.
    pub warnings: Vec<String>,
}

impl IngestSummary {
    /// True when the fetch window was already covered (e.g. run before
    /// today's close): a valid terminal state, not a failure.
    pub fn no_new_data(&self) -> bool {
        self.equity_records == 0 && self.index_records == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = IngestConfig::default();
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.lookback_days, 3650);
        assert_eq!(config.index_tickers, vec!["^GSPC".to_string()]);
        assert!(config.start_override.is_none());
    }

    #[test]
    fn test_summary_no_new_data() {
        let mut summary = IngestSummary::default();
        assert!(summary.no_new_data());

        summary.index_records = 1;
        assert!(!summary.no_new_data());
    }
}
