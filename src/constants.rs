//! Archive and universe policy constants.
//!
//! Quotas, source endpoints, and the curated Milan list are policy data:
//! editing them changes what gets archived, not how.

/// Index series fetched alongside the equity universe (S&P 500).
pub const INDEX_TICKERS: &[&str] = &["^GSPC"];

/// Tickers per provider request.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Lookback when the archive is empty (ten years).
pub const EMPTY_ARCHIVE_LOOKBACK_DAYS: i64 = 3650;

/// Upper bound on one provider batch call, in seconds.
pub const BATCH_TIMEOUT_SECS: u64 = 120;

/// Provider requests allowed per minute.
pub const PROVIDER_RATE_LIMIT_PER_MINUTE: u32 = 60;

/// Overall universe size target.
pub const UNIVERSE_TARGET: usize = 1000;

/// Header names probed for the symbol column of a constituent table.
pub const SYMBOL_COLUMNS: &[&str] = &["Symbol", "symbol", "Ticker", "ticker"];

/// Constituent CSV endpoints, keyed by source name.
pub const CONSTITUENT_SOURCES: &[(&str, &str)] = &[
    (
        "sp500",
        "https://yfiua.github.io/index-constituents/constituents-sp500.csv",
    ),
    (
        "nasdaq100",
        "https://yfiua.github.io/index-constituents/constituents-nasdaq100.csv",
    ),
    (
        "dowjones",
        "https://yfiua.github.io/index-constituents/constituents-dowjones.csv",
    ),
    (
        "ftse100",
        "https://yfiua.github.io/index-constituents/constituents-ftse100.csv",
    ),
    (
        "dax",
        "https://yfiua.github.io/index-constituents/constituents-dax.csv",
    ),
    (
        "hsi",
        "https://yfiua.github.io/index-constituents/constituents-hsi.csv",
    ),
    (
        "csi300",
        "https://yfiua.github.io/index-constituents/constituents-csi300.csv",
    ),
    (
        "csi500",
        "https://yfiua.github.io/index-constituents/constituents-csi500.csv",
    ),
    (
        "csi1000",
        "https://yfiua.github.io/index-constituents/constituents-csi1000.csv",
    ),
];

/// Key of the curated in-repo source for Milan listings.
pub const ITALY_SOURCE_KEY: &str = "italy_mi";

/// Curated Milan candidates, maintained by hand instead of scraped.
pub const ITALY_MI: &[&str] = &[
    "ENEL.MI", "ENI.MI", "ISP.MI", "UCG.MI", "STM.MI", "G.MI", "PRY.MI", "SRG.MI", "TEN.MI",
    "TRN.MI", "HER.MI", "BAMI.MI", "LDO.MI", "AMP.MI", "BPE.MI", "CPR.MI", "MONC.MI", "ERG.MI",
    "DIA.MI", "A2A.MI", "INW.MI", "IG.MI", "MB.MI", "SPM.MI", "BZU.MI", "PST.MI", "NEXI.MI",
    "TIT.MI", "UNI.MI", "REC.MI", "AZM.MI", "BMED.MI", "BMPS.MI", "BPSO.MI", "SFER.MI", "LUX.MI",
    "RACE.MI", "IP.MI", "CVAL.MI", "BFF.MI",
];

/// Exchange suffixes whose trailing dot is valid provider convention and must
/// not be rewritten (`ENEL.MI`, `1299.HK`, `AZN.L`).
pub const VENUE_SUFFIXES: &[&str] = &["MI", "HK", "L", "DE", "PA", "AS", "SW", "SS", "SZ", "T"];
