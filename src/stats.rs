//! Fallback statistics for one session.
//!
//! Every fallback transition records the level the element was at *before*
//! the transition, keyed by `category/name`. Entries are one per distinct
//! image (not per failure), so the map is left to grow without eviction.

use crate::types::{Category, FallbackLevel, ImageKey};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackStat {
    pub occurrence_count: u32,
    pub levels_observed: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct StatsRecorder {
    entries: BTreeMap<String, FallbackStat>,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, category: Category, name: &str, level: FallbackLevel) {
        let key = ImageKey::new(category, name).to_string();
        let stat = self.entries.entry(key).or_default();
        stat.occurrence_count += 1;
        stat.levels_observed.push(level.as_u8());
    }

    pub fn snapshot(&self) -> BTreeMap<String, FallbackStat> {
        self.entries.clone()
    }

    pub fn get(&self, category: Category, name: &str) -> Option<&FallbackStat> {
        self.entries.get(&ImageKey::new(category, name).to_string())
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total transitions across all images.
    pub fn total(&self) -> u32 {
        self.entries.values().map(|s| s.occurrence_count).sum()
    }
}

impl fmt::Display for StatsRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            write!(f, "no fallbacks")
        } else {
            write!(
                f,
                "{} fallbacks across {} images",
                self.total(),
                self.entries.len()
            )
        }
    }
}
