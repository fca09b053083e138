use std::sync::Arc;

use super::{FeatureExtractor, VocabularySlot, check_signature, require_sealed, screen};
use crate::config::DocumentNgramConfig;
use crate::ngram::{self, NgramOptions};
use crate::store::VocabularyStore;
use crate::types::{Document, FeatureSet, Vocabulary};
use crate::Result;

/// N-gram features of standalone documents.
#[derive(Debug)]
pub struct DocumentNgramExtractor {
    store: Arc<VocabularyStore>,
    options: NgramOptions,
    vocabulary: VocabularySlot,
    prefix: String,
    binary: bool,
}

impl DocumentNgramExtractor {
    pub fn new(config: &DocumentNgramConfig, store: Arc<VocabularyStore>) -> Result<Self> {
        require_sealed(&store)?;
        let options = config.resolve()?;
        check_signature(&store, &config.field, &options.fingerprint())?;
        Ok(Self {
            store,
            options,
            vocabulary: VocabularySlot::new(
                &config.field,
                config.settings.top_k,
                config.settings.min_frequency,
            ),
            prefix: config.prefix.clone(),
            binary: config.binary,
        })
    }

    pub fn vocabulary(&self) -> Result<&Vocabulary> {
        self.vocabulary.get(&self.store)
    }

    #[must_use]
    pub fn options(&self) -> &NgramOptions {
        &self.options
    }

    pub fn extract(&self, document: &Document) -> Result<FeatureSet> {
        let vocabulary = self.vocabulary()?;
        let bag = ngram::generate(document, &self.options)?;
        let mut features = FeatureSet::new();
        screen(&bag, vocabulary, &self.prefix, self.binary, &mut features);
        tracing::trace!(
            field = self.vocabulary.field(),
            features = features.len(),
            "extracted document features"
        );
        Ok(features)
    }
}

impl FeatureExtractor for DocumentNgramExtractor {
    type Input = Document;

    fn extract(&self, input: &Document) -> Result<FeatureSet> {
        DocumentNgramExtractor::extract(self, input)
    }
}
