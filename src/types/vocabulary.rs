//! Bounded vocabulary snapshots produced by the top-K selector.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One ranked vocabulary entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TermFrequency {
    pub term: String,
    pub frequency: u64,
}

/// Up to K terms of one field, ordered by descending frequency and then by
/// ascending term.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    field: String,
    entries: Vec<TermFrequency>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// `entries` must already be ranked.
    pub(crate) fn from_ranked(field: &str, entries: Vec<TermFrequency>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(rank, entry)| (entry.term.clone(), rank))
            .collect();
        Self {
            field: field.to_string(),
            entries,
            index,
        }
    }

    #[must_use]
    pub fn empty(field: &str) -> Self {
        Self::from_ranked(field, Vec::new())
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub fn contains(&self, term: &str) -> bool {
        self.index.contains_key(term)
    }

    #[must_use]
    pub fn frequency(&self, term: &str) -> Option<u64> {
        self.index.get(term).map(|&rank| self.entries[rank].frequency)
    }

    /// Zero-based rank of `term`.
    #[must_use]
    pub fn rank(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[TermFrequency] {
        &self.entries
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.term.as_str())
    }
}

impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field && self.entries == other.entries
    }
}

impl Eq for Vocabulary {}
