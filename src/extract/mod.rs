//! Feature extractors: generate an instance's n-grams, then keep those in the
//! bounded vocabularies of a sealed store.

mod combo;
mod document;
mod pair;
mod screen;

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::store::VocabularyStore;
use crate::types::{FeatureSet, Vocabulary};
use crate::{GramstatError, Result};

pub use combo::ComboNgramExtractor;
pub use document::DocumentNgramExtractor;
pub use pair::PairNgramExtractor;
pub use screen::screen;

/// Turns one instance into features.
pub trait FeatureExtractor: Send + Sync {
    type Input: Sync;

    fn extract(&self, input: &Self::Input) -> Result<FeatureSet>;
}

/// A vocabulary selected from the store on first use.
#[derive(Debug)]
pub(crate) struct VocabularySlot {
    field: String,
    top_k: usize,
    min_frequency: u64,
    cell: OnceCell<Vocabulary>,
}

impl VocabularySlot {
    pub(crate) fn new(field: &str, top_k: usize, min_frequency: u64) -> Self {
        Self {
            field: field.to_string(),
            top_k,
            min_frequency,
            cell: OnceCell::new(),
        }
    }

    pub(crate) fn field(&self) -> &str {
        &self.field
    }

    pub(crate) fn get(&self, store: &VocabularyStore) -> Result<&Vocabulary> {
        self.cell
            .get_or_try_init(|| store.top_k_with_min(&self.field, self.top_k, self.min_frequency))
    }
}

/// Extractors need a finished statistics pass.
pub(crate) fn require_sealed(store: &Arc<VocabularyStore>) -> Result<()> {
    if store.is_sealed() {
        Ok(())
    } else {
        Err(GramstatError::StoreNotSealed)
    }
}

/// Rejects an extractor whose generation options differ from the ones the
/// field was collected with. Unknown fields and fields without a recorded
/// fingerprint pass.
pub(crate) fn check_signature(store: &VocabularyStore, field: &str, expected: &str) -> Result<()> {
    match store.signature(field) {
        Some(recorded) if recorded != expected => Err(GramstatError::config(format!(
            "field `{field}` was collected with different n-gram options"
        ))),
        _ => Ok(()),
    }
}
