//! Universe construction.
//!
//! Fills each regional group to its quota from its sources in order, with one
//! `used` set carried across groups so no symbol is selected twice, then tops
//! up any shortfall from the overflow sources. A source that cannot be
//! fetched or has no recognizable symbol column is skipped; the build always
//! produces a universe from whatever sources answered.

use crate::constants::VENUE_SUFFIXES;
use crate::models::{Region, Universe, UniversePolicy};
use crate::services::constituents::{ConstituentCatalog, TabularSource};
use std::collections::HashSet;
use tracing::{info, warn};

pub struct UniverseBuilder {
    policy: UniversePolicy,
}

/// Build result: the universe plus warnings for skipped sources.
#[derive(Debug)]
pub struct BuildOutcome {
    pub universe: Universe,
    pub warnings: Vec<String>,
}

impl UniverseBuilder {
    pub fn new(policy: UniversePolicy) -> Self {
        Self { policy }
    }

    pub fn build<S: TabularSource>(&self, catalog: &ConstituentCatalog<S>) -> BuildOutcome {
        let mut used: HashSet<String> = HashSet::new();
        let mut universe = Universe::default();
        let mut warnings = Vec::new();

        for group in &self.policy.groups {
            let pool = collect_pool(catalog, &group.sources, &mut warnings);
            let picked = take_unique(pool, group.quota, &mut used);

            info!(
                region = group.region.as_str(),
                quota = group.quota,
                selected = picked.len(),
                "Group filled"
            );
            universe
                .entries
                .extend(picked.into_iter().map(|t| (group.region, t)));
        }

        if universe.len() < self.policy.target {
            let shortfall = self.policy.target - universe.len();
            let pool = collect_pool(catalog, &self.policy.overflow_sources, &mut warnings);
            let picked = take_unique(pool, shortfall, &mut used);

            info!(shortfall, topped_up = picked.len(), "Overflow fill");
            universe
                .entries
                .extend(picked.into_iter().map(|t| (Region::Fill, t)));
        }

        universe.entries.truncate(self.policy.target);

        BuildOutcome { universe, warnings }
    }
}

/// Concatenate the normalized candidates of `sources` in order, skipping
/// sources that fail.
fn collect_pool<S: TabularSource>(
    catalog: &ConstituentCatalog<S>,
    sources: &[&'static str],
    warnings: &mut Vec<String>,
) -> Vec<String> {
    let mut pool = Vec::new();
    for key in sources {
        match catalog.candidates(key) {
            Ok(candidates) => {
                pool.extend(candidates.iter().filter_map(|c| normalize_symbol(c)));
            }
            Err(e) => {
                warn!(source = *key, error = %e, "Constituent source skipped");
                warnings.push(format!("source {}: {}", key, e));
            }
        }
    }
    pool
}

/// Rewrite a raw candidate into the provider's ticker convention, or drop it.
///
/// Index-like symbols (`^GSPC`) and blanks are excluded. A class-share dot is
/// rewritten to a dash (`BRK.B` -> `BRK-B`); a dot introducing a known
/// exchange suffix (`ENEL.MI`, `1299.HK`) is already valid and kept.
fn normalize_symbol(raw: &str) -> Option<String> {
    let symbol = raw.trim();
    if symbol.is_empty() || symbol.starts_with('^') {
        return None;
    }

    if let Some((_, suffix)) = symbol.rsplit_once('.') {
        if VENUE_SUFFIXES.contains(&suffix) {
            return Some(symbol.to_string());
        }
    }

    Some(symbol.replace('.', "-"))
}

/// Scan `pool` in order, selecting symbols not yet `used` until `quota` is
/// reached. Selected symbols are added to `used`.
fn take_unique(pool: Vec<String>, quota: usize, used: &mut HashSet<String>) -> Vec<String> {
    let mut picked = Vec::new();
    for symbol in pool {
        if picked.len() >= quota {
            break;
        }
        if used.insert(symbol.clone()) {
            picked.push(symbol);
        }
    }
    picked
}
