use std::sync::Arc;

use super::{
    ComboNgramExtractor, FeatureExtractor, VocabularySlot, check_signature, require_sealed, screen,
};
use crate::collector::BagCache;
use crate::config::{PairNgramConfig, PairOptions, PooledMode};
use crate::store::VocabularyStore;
use crate::types::{DocumentPair, FeatureSet, Vocabulary};
use crate::Result;

/// Per-view, pooled and (optionally) combination features of a document pair.
#[derive(Debug)]
pub struct PairNgramExtractor {
    store: Arc<VocabularyStore>,
    options: PairOptions,
    view1: VocabularySlot,
    view2: VocabularySlot,
    pooled: VocabularySlot,
    use_view1: bool,
    use_view2: bool,
    pooled_mode: PooledMode,
    binary: bool,
    view1_prefix: String,
    view2_prefix: String,
    pooled_prefix: String,
    pooled_view1_prefix: String,
    pooled_view2_prefix: String,
    combo: Option<ComboNgramExtractor>,
}

impl PairNgramExtractor {
    pub fn new(config: &PairNgramConfig, store: Arc<VocabularyStore>) -> Result<Self> {
        require_sealed(&store)?;
        let options = config.resolve()?;
        if config.use_view1 {
            check_signature(&store, &config.view1.field, &options.view1.fingerprint())?;
        }
        if config.use_view2 {
            check_signature(&store, &config.view2.field, &options.view2.fingerprint())?;
        }
        if config.pooled_mode != PooledMode::Off {
            check_signature(&store, &config.pooled.field, &options.pooled.fingerprint())?;
        }
        let combo = match &config.combo {
            Some(_) => Some(ComboNgramExtractor::with_options(
                config,
                &options,
                Arc::clone(&store),
            )?),
            None => None,
        };

        Ok(Self {
            view1: VocabularySlot::new(
                &config.view1.field,
                config.view1.settings.top_k,
                config.view1.settings.min_frequency,
            ),
            view2: VocabularySlot::new(
                &config.view2.field,
                config.view2.settings.top_k,
                config.view2.settings.min_frequency,
            ),
            pooled: VocabularySlot::new(
                &config.pooled.field,
                config.pooled.settings.top_k,
                config.pooled.settings.min_frequency,
            ),
            store,
            options,
            use_view1: config.use_view1,
            use_view2: config.use_view2,
            pooled_mode: config.pooled_mode,
            binary: config.binary,
            view1_prefix: config.view1.prefix.clone(),
            view2_prefix: config.view2.prefix.clone(),
            pooled_prefix: config.pooled.prefix.clone(),
            pooled_view1_prefix: config.pooled.view1_prefix.clone(),
            pooled_view2_prefix: config.pooled.view2_prefix.clone(),
            combo,
        })
    }

    pub fn view1_vocabulary(&self) -> Result<&Vocabulary> {
        self.view1.get(&self.store)
    }

    pub fn view2_vocabulary(&self) -> Result<&Vocabulary> {
        self.view2.get(&self.store)
    }

    pub fn pooled_vocabulary(&self) -> Result<&Vocabulary> {
        self.pooled.get(&self.store)
    }

    #[must_use]
    pub fn combo(&self) -> Option<&ComboNgramExtractor> {
        self.combo.as_ref()
    }

    pub fn extract(&self, pair: &DocumentPair) -> Result<FeatureSet> {
        let mut view1 = BagCache::default();
        let mut view2 = BagCache::default();
        let mut features = FeatureSet::new();

        if self.use_view1 {
            let bag = view1.get(&pair.view1, &self.options.view1)?;
            screen(bag, self.view1_vocabulary()?, &self.view1_prefix, self.binary, &mut features);
        }
        if self.use_view2 {
            let bag = view2.get(&pair.view2, &self.options.view2)?;
            screen(bag, self.view2_vocabulary()?, &self.view2_prefix, self.binary, &mut features);
        }

        match self.pooled_mode {
            PooledMode::Off => {}
            PooledMode::ViewBlind => {
                let mut merged = view1.get(&pair.view1, &self.options.pooled)?.clone();
                merged.merge(view2.get(&pair.view2, &self.options.pooled)?);
                screen(
                    &merged,
                    self.pooled_vocabulary()?,
                    &self.pooled_prefix,
                    self.binary,
                    &mut features,
                );
            }
            PooledMode::LocalView => {
                let vocabulary = self.pooled_vocabulary()?;
                let bag = view1.get(&pair.view1, &self.options.pooled)?;
                screen(bag, vocabulary, &self.pooled_view1_prefix, self.binary, &mut features);
                let bag = view2.get(&pair.view2, &self.options.pooled)?;
                screen(bag, vocabulary, &self.pooled_view2_prefix, self.binary, &mut features);
            }
        }

        if let Some(combo) = &self.combo {
            let left = view1.get(&pair.view1, &self.options.view1)?;
            let right = view2.get(&pair.view2, &self.options.view2)?;
            combo.extract_from_bags(left, right, &mut features)?;
        }
        Ok(features)
    }
}

impl FeatureExtractor for PairNgramExtractor {
    type Input = DocumentPair;

    fn extract(&self, input: &DocumentPair) -> Result<FeatureSet> {
        PairNgramExtractor::extract(self, input)
    }
}
