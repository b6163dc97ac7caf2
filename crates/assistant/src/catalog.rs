use serde::{Deserialize, Serialize};

use crate::similarity::partial_ratio;

/// A topic keyword and the canned response returned when the fallback picks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub keyword: String,
    pub response: String,
}

impl CatalogEntry {
    pub fn new(keyword: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            response: response.into(),
        }
    }
}

/// Best-scoring catalog entry for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackMatch<'c> {
    pub index: usize,
    pub entry: &'c CatalogEntry,
    pub score: u8,
}

/// Ordered fallback catalog. Order is priority: on equal scores the earlier entry wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentCatalog {
    entries: Vec<CatalogEntry>,
}

impl IntentCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Catalog shipped with the assistant: one entry per application route.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![
            CatalogEntry::new(
                "add",
                "To add a new expense, <a href=\"/add_expense\" class=\"text-blue-600 hover:underline\">click here</a>.",
            ),
            CatalogEntry::new(
                "view",
                "View all your expenses on <a href=\"/dashboard\" class=\"text-blue-600 hover:underline\">Dashboard</a>.",
            ),
            CatalogEntry::new(
                "analytics",
                "Check analytics at <a href=\"/analytics\" class=\"text-blue-600 hover:underline\">Analytics</a>.",
            ),
            CatalogEntry::new(
                "csv",
                "Download your data <a href=\"/download_csv\" class=\"text-blue-600 hover:underline\">here</a>.",
            ),
            CatalogEntry::new(
                "profile",
                "Manage your profile <a href=\"/profile\" class=\"text-blue-600 hover:underline\">here</a>.",
            ),
        ])
    }

    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Score of every entry against a normalized message, in catalog order.
    pub fn scores<'c>(&'c self, normalized: &'c str) -> impl Iterator<Item = (usize, u8)> + 'c {
        self.entries
            .iter()
            .enumerate()
            .map(move |(idx, entry)| (idx, partial_ratio(&entry.keyword, normalized)))
    }

    /// Highest-scoring entry, first one on ties. `None` when nothing scores above zero.
    #[must_use]
    pub fn best_match(&self, normalized: &str) -> Option<FallbackMatch<'_>> {
        let mut best: Option<(usize, u8)> = None;
        for (idx, score) in self.scores(normalized) {
            let current = best.map_or(0, |(_, s)| s);
            if score > current {
                best = Some((idx, score));
            }
        }

        best.map(|(index, score)| FallbackMatch {
            index,
            entry: &self.entries[index],
            score,
        })
    }
}

impl Default for IntentCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
