use std::path::PathBuf;

pub mod dedup;

/// Get archive data directory from environment variable or use default
pub fn get_data_dir() -> PathBuf {
    std::env::var("ARCHIVE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

/// Get the equity universe file path from environment variable or use default
pub fn get_universe_path() -> PathBuf {
    std::env::var("EQUITY_UNIVERSE_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config/equity_universe.txt"))
}
