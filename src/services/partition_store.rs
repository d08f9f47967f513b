//! Month-partitioned archive storage.
//!
//! A partition owns every record whose date falls in its calendar month.
//! Merges are read-modify-write over the whole file: dedup keeps the incoming
//! side, rows are sorted by `(date, ticker)`, and the rewrite goes through a
//! temp file plus rename so a crash never exposes a half-written partition.

use crate::error::{Error, Result};
use crate::models::{ArchiveKind, PartitionKey, PriceRecord};
use crate::utils::dedup::dedup_keep_last;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Archive store rooted at the data directory.
pub struct PartitionStore {
    root: PathBuf,
}

/// What one merge call touched.
#[derive(Debug, Default)]
pub struct MergeOutcome {
    /// Partitions rewritten.
    pub partitions: usize,

    /// Rows persisted across the rewritten partitions (old and new).
    pub rows_persisted: usize,

    /// Partitions whose existing contents could not be loaded and were
    /// left untouched.
    pub skipped_partitions: usize,
}

impl PartitionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of one archive kind.
    pub fn kind_root(&self, kind: ArchiveKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Merge `records` into the `kind` archive.
    ///
    /// Records are grouped by calendar month; per partition the existing rows
    /// are loaded, incoming rows appended, duplicates on `(date, ticker)`
    /// dropped keeping the last occurrence (incoming wins), and the result is
    /// sorted and rewritten in full. Re-merging the same records is a no-op
    /// on the persisted bytes. An empty input touches nothing.
    pub fn merge(&self, kind: ArchiveKind, records: Vec<PriceRecord>) -> Result<MergeOutcome> {
        let mut outcome = MergeOutcome::default();
        if records.is_empty() {
            return Ok(outcome);
        }

        let mut by_month: BTreeMap<PartitionKey, Vec<PriceRecord>> = BTreeMap::new();
        for record in records {
            by_month
                .entry(PartitionKey::from_date(record.date))
                .or_default()
                .push(record);
        }

        for (key, incoming) in by_month {
            let path = self.kind_root(kind).join(key.relative_path());

            let existing = match load_partition(&path) {
                Ok(rows) => rows,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Existing partition unreadable, skipping merge for this month"
                    );
                    outcome.skipped_partitions += 1;
                    continue;
                }
            };

            let mut combined = existing;
            combined.extend(incoming);

            let mut merged = dedup_keep_last(combined);
            merged.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.ticker.cmp(&b.ticker)));

            write_partition(&path, &merged)?;

            debug!(
                path = %path.display(),
                rows = merged.len(),
                "Partition rewritten"
            );
            outcome.partitions += 1;
            outcome.rows_persisted += merged.len();
        }

        Ok(outcome)
    }
}

/// Load a partition's rows; a partition that does not exist yet is empty.
fn load_partition(path: &Path) -> Result<Vec<PriceRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let record: PriceRecord = result?;
        rows.push(record);
    }
    Ok(rows)
}

/// Whole-file replacement through a sibling temp file and atomic rename.
fn write_partition(path: &Path, records: &[PriceRecord]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::Io(format!("Partition path has no parent: {}", path.display())))?;
    fs::create_dir_all(parent)?;

    let tmp = path.with_extension("csv.tmp");
    let mut writer = csv::Writer::from_path(&tmp)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    drop(writer);

    fs::rename(&tmp, path)?;
    Ok(())
}
