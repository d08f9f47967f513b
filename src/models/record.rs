use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One canonical price row: a daily adjusted close for one ticker.
///
/// The archive persists nothing else. Within a partition, `(date, ticker)`
/// is unique and rows are sorted ascending by that pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub ticker: String,
    pub adj_close: f64,
}

impl PriceRecord {
    pub fn new(date: NaiveDate, ticker: impl Into<String>, adj_close: f64) -> Self {
        Self {
            date,
            ticker: ticker.into(),
            adj_close,
        }
    }
}

/// Which archive a record set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    /// Equity universe closes -> data/prices
    Prices,
    /// Reference index closes -> data/indices
    Indices,
}

impl ArchiveKind {
    /// Subdirectory under the archive root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ArchiveKind::Prices => "prices",
            ArchiveKind::Indices => "indices",
        }
    }

    pub fn all() -> [ArchiveKind; 2] {
        [ArchiveKind::Prices, ArchiveKind::Indices]
    }
}

/// Calendar month a record's date falls in; the atomic unit of storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionKey {
    pub year: i32,
    pub month: u32,
}

impl PartitionKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Partition file path relative to the kind root (`YYYY/MM.csv`).
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(format!("{:04}", self.year)).join(format!("{:02}.csv", self.month))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_key_from_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        let key = PartitionKey::from_date(date);
        assert_eq!(key.year, 2024);
        assert_eq!(key.month, 3);
    }

    #[test]
    fn test_partition_relative_path_is_zero_padded() {
        let key = PartitionKey {
            year: 2024,
            month: 3,
        };
        assert_eq!(key.relative_path(), PathBuf::from("2024").join("03.csv"));
    }

    #[test]
    fn test_archive_dir_names() {
        assert_eq!(ArchiveKind::Prices.dir_name(), "prices");
        assert_eq!(ArchiveKind::Indices.dir_name(), "indices");
    }
}
