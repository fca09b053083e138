//! Named numeric features emitted per instance.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::{Deserialize, Serialize};

use crate::constants::NGRAM_GLUE;

/// A single `(name, value)` feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Feature {
    pub name: String,
    pub value: u64,
}

impl Feature {
    pub fn new<S: Into<String>>(name: S, value: u64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Builds `prefix_term`.
    #[must_use]
    pub fn named(prefix: &str, term: &str, value: u64) -> Self {
        let mut name = String::with_capacity(prefix.len() + NGRAM_GLUE.len() + term.len());
        name.push_str(prefix);
        name.push_str(NGRAM_GLUE);
        name.push_str(term);
        Self { name, value }
    }

    /// The term after `prefix_`, if the name carries that prefix.
    #[must_use]
    pub fn term_for_prefix(&self, prefix: &str) -> Option<&str> {
        self.name
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix(NGRAM_GLUE))
    }
}

/// Features of one instance keyed by name. Names are unique; the first value
/// inserted for a name wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureSet {
    features: BTreeMap<String, u64>,
}

impl FeatureSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when a feature with the same name was already present.
    pub fn insert(&mut self, feature: Feature) -> bool {
        match self.features.entry(feature.name) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(feature.value);
                true
            }
        }
    }

    /// Adds the value onto a feature of the same name, inserting it when the
    /// name is new. Returns `true` for a new name.
    pub fn accumulate(&mut self, feature: Feature) -> bool {
        match self.features.entry(feature.name) {
            Entry::Occupied(mut slot) => {
                let value = slot.get_mut();
                *value = value.saturating_add(feature.value);
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(feature.value);
                true
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<u64> {
        self.features.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.features.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.features.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Features whose name starts with `prefix_`.
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, u64)> + 'a {
        self.iter().filter(move |(name, _)| {
            name.strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with(NGRAM_GLUE))
        })
    }

    /// Adds every feature of `other` whose name is not present yet.
    pub fn merge(&mut self, other: FeatureSet) {
        for (name, value) in other.features {
            self.features.entry(name).or_insert(value);
        }
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Feature> {
        self.features
            .into_iter()
            .map(|(name, value)| Feature { name, value })
            .collect()
    }
}

impl Extend<Feature> for FeatureSet {
    fn extend<T: IntoIterator<Item = Feature>>(&mut self, iter: T) {
        for feature in iter {
            self.insert(feature);
        }
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<T: IntoIterator<Item = Feature>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}
