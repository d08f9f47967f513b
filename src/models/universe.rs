use crate::constants::{ITALY_SOURCE_KEY, UNIVERSE_TARGET};
use crate::error::{Error, Result};
use std::fmt;
use std::fs;
use std::path::Path;

/// Origin region a universe symbol was selected under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Usa,
    Europe,
    Italy,
    Hk,
    China,
    /// Overflow top-up when the regional quotas come up short.
    Fill,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Usa => "USA",
            Region::Europe => "EUROPE",
            Region::Italy => "ITALY",
            Region::Hk => "HK",
            Region::China => "CHINA",
            Region::Fill => "FILL",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One quota-bounded slice of the universe and where its candidates come from.
#[derive(Debug, Clone)]
pub struct GroupSpec {
    pub region: Region,
    /// Source keys scanned in order until the quota is filled.
    pub sources: Vec<&'static str>,
    /// Maximum symbols this group contributes.
    pub quota: usize,
}

/// The full selection policy: regional groups plus overflow sources.
#[derive(Debug, Clone)]
pub struct UniversePolicy {
    pub target: usize,
    pub groups: Vec<GroupSpec>,
    /// Scanned in order to top up a shortfall, tagged [`Region::Fill`].
    pub overflow_sources: Vec<&'static str>,
}

impl UniversePolicy {
    /// Reference policy: 1000 names balanced across regions. The curated
    /// Milan list fills first so its fixed membership is never crowded out
    /// by cross-group deduplication.
    pub fn reference() -> Self {
        Self {
            target: UNIVERSE_TARGET,
            groups: vec![
                GroupSpec {
                    region: Region::Italy,
                    sources: vec![ITALY_SOURCE_KEY],
                    quota: 40,
                },
                GroupSpec {
                    region: Region::Usa,
                    sources: vec!["sp500", "nasdaq100", "dowjones"],
                    quota: 550,
                },
                GroupSpec {
                    region: Region::Europe,
                    sources: vec!["ftse100", "dax"],
                    quota: 200,
                },
                GroupSpec {
                    region: Region::Hk,
                    sources: vec!["hsi"],
                    quota: 50,
                },
                GroupSpec {
                    region: Region::China,
                    sources: vec!["csi300", "csi500", "csi1000"],
                    quota: 160,
                },
            ],
            overflow_sources: vec!["csi1000", "csi500", "csi300", "sp500"],
        }
    }
}

/// An ordered, deduplicated ticker list with region tags.
#[derive(Debug, Default)]
pub struct Universe {
    pub entries: Vec<(Region, String)>,
}

impl Universe {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn symbols(&self) -> Vec<String> {
        self.entries.iter().map(|(_, t)| t.clone()).collect()
    }

    /// Write the universe file: one symbol per line with a comment banner
    /// per region block.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut lines = vec![
            format!(
                "# Global equity universe ({} tickers) - generated automatically",
                self.entries.len()
            ),
            "# One ticker per line. Lines starting with # are comments.".to_string(),
        ];

        let mut current: Option<Region> = None;
        for (region, ticker) in &self.entries {
            if current != Some(*region) {
                lines.push(String::new());
                lines.push("# =========================".to_string());
                lines.push(format!("# {}", region));
                lines.push("# =========================".to_string());
                current = Some(*region);
            }
            lines.push(ticker.clone());
        }

        fs::write(path, lines.join("\n") + "\n")?;
        Ok(())
    }

    /// Load the plain symbol list a scheduler run consumes. Blank lines and
    /// `#` comment/section lines are ignored; the list is capped at `limit`.
    pub fn load_symbols(path: &Path, limit: usize) -> Result<Vec<String>> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Cannot read universe file {}: {}",
                path.display(),
                e
            ))
        })?;

        let symbols: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .take(limit)
            .collect();

        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reference_policy_quotas_sum_to_target() {
        let policy = UniversePolicy::reference();
        let total: usize = policy.groups.iter().map(|g| g.quota).sum();
        assert_eq!(total, policy.target);
    }

    #[test]
    fn test_universe_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("universe.txt");

        let universe = Universe {
            entries: vec![
                (Region::Italy, "ENEL.MI".to_string()),
                (Region::Usa, "AAPL".to_string()),
                (Region::Usa, "MSFT".to_string()),
            ],
        };
        universe.write_to(&path).unwrap();

        let symbols = Universe::load_symbols(&path, 1000).unwrap();
        assert_eq!(symbols, vec!["ENEL.MI", "AAPL", "MSFT"]);
    }

    #[test]
    fn test_load_symbols_skips_comments_and_caps() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("universe.txt");
        fs::write(&path, "# header\n\nAAPL\n# section\nMSFT\nGOOG\n").unwrap();

        let symbols = Universe::load_symbols(&path, 2).unwrap();
        assert_eq!(symbols, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn test_load_symbols_missing_file_is_config_error() {
        let err = Universe::load_symbols(Path::new("no/such/file.txt"), 10).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
