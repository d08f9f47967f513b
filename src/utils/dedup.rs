//! Canonical-row deduplication.
//!
//! The archive key is `(date, ticker)`; when the same key arrives more than
//! once, the later occurrence carries the corrected price and must win.

use crate::models::PriceRecord;
use chrono::NaiveDate;
use std::collections::HashSet;

/// Drop duplicate `(date, ticker)` rows, keeping the last occurrence.
///
/// Scans in reverse so the survivor is the most recently appended record;
/// the relative order of survivors is restored before returning. Callers
/// that need sorted output sort afterwards.
pub fn dedup_keep_last(records: Vec<PriceRecord>) -> Vec<PriceRecord> {
    let mut seen: HashSet<(NaiveDate, String)> = HashSet::with_capacity(records.len());
    let mut kept = Vec::with_capacity(records.len());

    for record in records.into_iter().rev() {
        if seen.insert((record.date, record.ticker.clone())) {
            kept.push(record);
        }
    }

    kept.reverse();
    kept
}
