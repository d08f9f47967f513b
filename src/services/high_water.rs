//! High-water mark discovery.
//!
//! The resumption point is derived state: the maximum date across every
//! readable partition of the tracked archive roots, recomputed on each run.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Latest date present across all partitions of `roots`, or `None` when no
/// root exists or no readable record is found.
///
/// Multiple roots collapse to one mark because the scheduler issues a single
/// shared start date for all fetches in a run. Unreadable files are skipped
/// with a warning so one corrupt partition cannot block future ingestion.
pub fn scan(roots: &[PathBuf]) -> Option<NaiveDate> {
    let mut latest = None;

    for root in roots {
        if !root.exists() {
            continue;
        }
        visit(root, &mut latest);
    }

    latest
}

fn visit(dir: &Path, latest: &mut Option<NaiveDate>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Skipping unreadable archive directory");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            visit(&path, latest);
        } else if path.extension().is_some_and(|ext| ext == "csv") {
            match max_date_in_file(&path) {
                Ok(Some(date)) => {
                    *latest = Some(latest.map_or(date, |current: NaiveDate| current.max(date)));
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable partition");
                }
            }
        }
    }
}

/// Max date in one partition file, reading only the date column.
fn max_date_in_file(path: &Path) -> Result<Option<NaiveDate>> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?;
    let date_idx = headers
        .iter()
        .position(|h| h == "date")
        .ok_or_else(|| Error::Schema(format!("No date column in {}", path.display())))?;

    let mut latest = None;
    for result in reader.records() {
        let record = result?;
        let field = record
            .get(date_idx)
            .ok_or_else(|| Error::Parse(format!("Missing date field in {}", path.display())))?;
        let date = NaiveDate::parse_from_str(field, "%Y-%m-%d")?;
        latest = Some(latest.map_or(date, |current: NaiveDate| current.max(date)));
    }

    Ok(latest)
}
