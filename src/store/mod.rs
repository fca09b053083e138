//! Field-keyed term statistics written by the statistics pass and read by the
//! extractors once sealed.

pub(crate) mod topk;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ngram::NgramBag;
use crate::types::Vocabulary;
use crate::{GramstatError, Result};

/// Corpus statistics of one term.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TermStats {
    /// Total occurrence count; the ranking key.
    pub frequency: u64,
    /// Number of observed instances containing the term.
    pub document_frequency: u64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FieldStats {
    pub(crate) signature: Option<String>,
    pub(crate) terms: HashMap<String, TermStats>,
}

/// Term statistics per field. Writable until [`seal`](Self::seal), readable after.
#[derive(Debug, Default)]
pub struct VocabularyStore {
    fields: BTreeMap<String, FieldStats>,
    sealed: bool,
}

impl VocabularyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_fields(fields: BTreeMap<String, FieldStats>) -> Self {
        Self {
            fields,
            sealed: true,
        }
    }

    pub(crate) fn field_stats(&self) -> &BTreeMap<String, FieldStats> {
        &self.fields
    }

    /// Declares a field and records the fingerprint of the options that feed it.
    pub fn register_field(&mut self, field: &str, signature: Option<String>) -> Result<()> {
        self.ensure_writable()?;
        if self.fields.contains_key(field) {
            return Err(GramstatError::DuplicateField {
                field: field.to_string(),
            });
        }
        self.fields.insert(
            field.to_string(),
            FieldStats {
                signature,
                terms: HashMap::new(),
            },
        );
        Ok(())
    }

    /// Adds `delta` to the frequency of `term`.
    pub fn put(&mut self, field: &str, term: &str, delta: u64) -> Result<()> {
        self.ensure_writable()?;
        let stats = self.field_mut(field);
        match stats.terms.get_mut(term) {
            Some(entry) => entry.frequency = entry.frequency.saturating_add(delta),
            None => {
                stats.terms.insert(
                    term.to_string(),
                    TermStats {
                        frequency: delta,
                        document_frequency: 0,
                    },
                );
            }
        }
        Ok(())
    }

    /// Adds every term of one instance and bumps each term's document frequency once.
    pub fn put_bag(&mut self, field: &str, bag: &NgramBag) -> Result<()> {
        self.ensure_writable()?;
        let stats = self.field_mut(field);
        for (term, entry) in bag.iter() {
            if let Some(slot) = stats.terms.get_mut(term) {
                slot.frequency = slot.frequency.saturating_add(entry.count);
                slot.document_frequency = slot.document_frequency.saturating_add(1);
                continue;
            }
            stats.terms.insert(
                term.to_string(),
                TermStats {
                    frequency: entry.count,
                    document_frequency: 1,
                },
            );
        }
        Ok(())
    }

    #[must_use]
    pub fn contains_term(&self, field: &str, term: &str) -> bool {
        self.fields
            .get(field)
            .is_some_and(|stats| stats.terms.contains_key(term))
    }

    /// Whether `field` was registered or written during the statistics pass.
    #[must_use]
    pub fn exists(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Frequency of `term`, zero when unseen.
    #[must_use]
    pub fn frequency(&self, field: &str, term: &str) -> u64 {
        self.stats(field, term).map_or(0, |stats| stats.frequency)
    }

    #[must_use]
    pub fn stats(&self, field: &str, term: &str) -> Option<TermStats> {
        self.fields.get(field)?.terms.get(term).copied()
    }

    /// Registered field names, sorted.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    #[must_use]
    pub fn term_count(&self, field: &str) -> usize {
        self.fields.get(field).map_or(0, |stats| stats.terms.len())
    }

    /// Options fingerprint recorded when the field was registered.
    #[must_use]
    pub fn signature(&self, field: &str) -> Option<&str> {
        self.fields.get(field)?.signature.as_deref()
    }

    /// Ends the statistics pass. Idempotent.
    pub fn seal(&mut self) {
        if self.sealed {
            return;
        }
        self.sealed = true;
        info!(
            store.fields = self.fields.len(),
            store.terms = self.fields.values().map(|s| s.terms.len()).sum::<usize>(),
            "vocabulary store sealed"
        );
    }

    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// The `k` most frequent terms of `field`.
    pub fn top_k(&self, field: &str, k: usize) -> Result<Vocabulary> {
        self.top_k_filtered(field, k, 0, |_| true)
    }

    /// Like [`top_k`](Self::top_k), ignoring terms seen fewer than `min_frequency` times.
    pub fn top_k_with_min(&self, field: &str, k: usize, min_frequency: u64) -> Result<Vocabulary> {
        self.top_k_filtered(field, k, min_frequency, |_| true)
    }

    /// Top-K restricted to terms accepted by `keep`. The predicate runs during
    /// selection, so rejected terms never displace accepted ones.
    pub fn top_k_filtered<F>(
        &self,
        field: &str,
        k: usize,
        min_frequency: u64,
        keep: F,
    ) -> Result<Vocabulary>
    where
        F: Fn(&str) -> bool,
    {
        if !self.sealed {
            return Err(GramstatError::StoreNotSealed);
        }
        if k == 0 {
            return Err(GramstatError::config(format!(
                "top-k size for field `{field}` must be positive"
            )));
        }
        let Some(stats) = self.fields.get(field) else {
            warn!(field, "vocabulary requested for unknown field");
            return Ok(Vocabulary::empty(field));
        };

        let candidates = stats
            .terms
            .iter()
            .filter(|(term, entry)| entry.frequency >= min_frequency && keep(term))
            .map(|(term, entry)| (term.as_str(), entry.frequency));
        let ranked = topk::select(candidates, k);
        tracing::debug!(
            field,
            vocabulary.size = ranked.len(),
            vocabulary.k = k,
            "selected vocabulary"
        );
        Ok(Vocabulary::from_ranked(field, ranked))
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.sealed {
            Err(GramstatError::StoreSealed)
        } else {
            Ok(())
        }
    }

    fn field_mut(&mut self, field: &str) -> &mut FieldStats {
        self.fields.entry(field.to_string()).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sealed_store() -> VocabularyStore {
        let mut store = VocabularyStore::new();
        store.put("f", "cat", 3).unwrap();
        store.put("f", "dog", 5).unwrap();
        store.put("f", "ant", 3).unwrap();
        store.put("f", "eel", 1).unwrap();
        store.seal();
        store
    }

    #[test]
    fn put_accumulates() {
        let mut store = VocabularyStore::new();
        store.put("f", "cat", 2).unwrap();
        store.put("f", "cat", 3).unwrap();
        assert_eq!(store.frequency("f", "cat"), 5);
        assert_eq!(store.frequency("f", "dog"), 0);
        assert!(store.contains_term("f", "cat"));
        assert!(!store.contains_term("g", "cat"));
    }

    #[test]
    fn frequencies_saturate_instead_of_overflowing() {
        let mut store = VocabularyStore::new();
        store.put("f", "cat", u64::MAX - 1).unwrap();
        store.put("f", "cat", 5).unwrap();
        let mut bag = NgramBag::new();
        bag.add("cat".to_string(), 1, 7);
        store.put_bag("f", &bag).unwrap();
        assert_eq!(store.frequency("f", "cat"), u64::MAX);
    }

    #[test]
    fn put_bag_tracks_document_frequency() {
        let mut bag = NgramBag::new();
        bag.add("cat".to_string(), 1, 2);
        let mut store = VocabularyStore::new();
        store.put_bag("f", &bag).unwrap();
        store.put_bag("f", &bag).unwrap();
        let stats = store.stats("f", "cat").unwrap();
        assert_eq!(stats.frequency, 4);
        assert_eq!(stats.document_frequency, 2);
    }

    #[test]
    fn sealed_store_rejects_writes() {
        let mut store = sealed_store();
        assert!(matches!(
            store.put("f", "x", 1),
            Err(GramstatError::StoreSealed)
        ));
        assert!(matches!(
            store.register_field("g", None),
            Err(GramstatError::StoreSealed)
        ));
    }

    #[test]
    fn unsealed_store_rejects_reads() {
        let mut store = VocabularyStore::new();
        store.put("f", "cat", 1).unwrap();
        assert!(matches!(
            store.top_k("f", 10),
            Err(GramstatError::StoreNotSealed)
        ));
    }

    #[test]
    fn top_k_ranks_by_frequency_then_term() {
        let store = sealed_store();
        let vocab = store.top_k("f", 3).unwrap();
        let terms: Vec<&str> = vocab.terms().collect();
        assert_eq!(terms, vec!["dog", "ant", "cat"]);
        assert_eq!(vocab.frequency("ant"), Some(3));
        assert!(!vocab.contains("eel"));
    }

    #[test]
    fn min_frequency_and_filter_apply_before_selection() {
        let store = sealed_store();
        let vocab = store.top_k_with_min("f", 10, 3).unwrap();
        assert_eq!(vocab.len(), 3);

        let vocab = store.top_k_filtered("f", 2, 0, |term| term != "dog").unwrap();
        let terms: Vec<&str> = vocab.terms().collect();
        assert_eq!(terms, vec!["ant", "cat"]);
    }

    #[test]
    fn unknown_field_yields_empty_vocabulary() {
        let store = sealed_store();
        let vocab = store.top_k("missing", 10).unwrap();
        assert!(vocab.is_empty());
        assert_eq!(vocab.field(), "missing");
    }

    #[test]
    fn zero_k_is_a_configuration_error() {
        let store = sealed_store();
        assert!(matches!(
            store.top_k("f", 0),
            Err(GramstatError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut store = VocabularyStore::new();
        store.register_field("f", Some("abc".into())).unwrap();
        assert_eq!(store.signature("f"), Some("abc"));
        assert!(matches!(
            store.register_field("f", None),
            Err(GramstatError::DuplicateField { .. })
        ));
    }
}
