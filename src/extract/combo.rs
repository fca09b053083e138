use std::sync::Arc;

use super::{FeatureExtractor, VocabularySlot, check_signature, require_sealed};
use crate::collector::{BagCache, combo_signature};
use crate::combo::{ComboCandidate, combinations};
use crate::config::{ComboConfig, PairNgramConfig, PairOptions, ViewFieldConfig};
use crate::ngram::{NgramBag, NgramOptions};
use crate::store::VocabularyStore;
use crate::types::{ComboSettings, DocumentPair, Feature, FeatureSet, Vocabulary};
use crate::{GramstatError, Result};

/// The four vocabularies combination screening reads.
struct Screens<'a> {
    view1: &'a Vocabulary,
    view2: &'a Vocabulary,
    pooled: &'a Vocabulary,
    combo: &'a Vocabulary,
}

impl Screens<'_> {
    fn operand_in(&self, term: &str, from_view1: bool) -> bool {
        let view = if from_view1 { self.view1 } else { self.view2 };
        view.contains(term) && self.pooled.contains(term)
    }

    fn accepts(&self, candidate: &ComboCandidate<'_>) -> bool {
        self.operand_in(candidate.first, !candidate.reversed)
            && self.operand_in(candidate.second, candidate.reversed)
    }
}

/// Features pairing an n-gram of view1 with an n-gram of view2.
#[derive(Debug)]
pub struct ComboNgramExtractor {
    store: Arc<VocabularyStore>,
    view1_options: NgramOptions,
    view2_options: NgramOptions,
    view1: VocabularySlot,
    view2: VocabularySlot,
    pooled: VocabularySlot,
    combo: VocabularySlot,
    settings: ComboSettings,
    prefix: String,
}

impl ComboNgramExtractor {
    pub fn new(config: &PairNgramConfig, store: Arc<VocabularyStore>) -> Result<Self> {
        let options = config.resolve()?;
        Self::with_options(config, &options, store)
    }

    pub(crate) fn with_options(
        config: &PairNgramConfig,
        options: &PairOptions,
        store: Arc<VocabularyStore>,
    ) -> Result<Self> {
        require_sealed(&store)?;
        let combo: &ComboConfig = config
            .combo
            .as_ref()
            .ok_or_else(|| GramstatError::config("combination features are not configured"))?;
        check_signature(&store, &config.view1.field, &options.view1.fingerprint())?;
        check_signature(&store, &config.view2.field, &options.view2.fingerprint())?;
        check_signature(&store, &config.pooled.field, &options.pooled.fingerprint())?;
        check_signature(
            &store,
            &combo.field,
            &combo_signature(&options.view1, &options.view2, &combo.settings),
        )?;

        let slot = |field: &ViewFieldConfig| {
            VocabularySlot::new(&field.field, field.settings.top_k, field.settings.min_frequency)
        };
        Ok(Self {
            view1: slot(&config.view1),
            view2: slot(&config.view2),
            pooled: VocabularySlot::new(
                &config.pooled.field,
                config.pooled.settings.top_k,
                config.pooled.settings.min_frequency,
            ),
            combo: VocabularySlot::new(
                &combo.field,
                combo.settings.top_k,
                combo.settings.min_frequency,
            ),
            store,
            view1_options: options.view1.clone(),
            view2_options: options.view2.clone(),
            settings: combo.settings.clone(),
            prefix: combo.prefix.clone(),
        })
    }

    fn screens(&self) -> Result<Screens<'_>> {
        Ok(Screens {
            view1: self.view1.get(&self.store)?,
            view2: self.view2.get(&self.store)?,
            pooled: self.pooled.get(&self.store)?,
            combo: self.combo.get(&self.store)?,
        })
    }

    /// Top-K of the combo field over every combined length. Operands are
    /// screened per candidate during extraction, so each vocabulary only
    /// grows with its own K.
    pub fn vocabulary(&self) -> Result<&Vocabulary> {
        self.combo.get(&self.store)
    }

    pub fn extract(&self, pair: &DocumentPair) -> Result<FeatureSet> {
        let mut view1 = BagCache::default();
        let mut view2 = BagCache::default();
        let left = view1.get(&pair.view1, &self.view1_options)?;
        let right = view2.get(&pair.view2, &self.view2_options)?;
        let mut features = FeatureSet::new();
        self.extract_from_bags(left, right, &mut features)?;
        Ok(features)
    }

    /// Screens the combinations of already generated view bags. Under symmetry
    /// a term can arise from both orderings; non-binary values then sum the
    /// accepted products, matching what the statistics pass recorded.
    pub(crate) fn extract_from_bags(
        &self,
        left: &NgramBag,
        right: &NgramBag,
        out: &mut FeatureSet,
    ) -> Result<usize> {
        if left.is_empty() || right.is_empty() {
            return Ok(0);
        }
        let screens = self.screens()?;
        if screens.combo.is_empty() {
            return Ok(0);
        }
        let mut added = 0;
        for candidate in combinations(
            left,
            right,
            self.settings.min_n,
            self.settings.max_n,
            self.settings.symmetric,
        ) {
            if !screens.accepts(&candidate) {
                continue;
            }
            let term = candidate.term();
            if !screens.combo.contains(&term) {
                continue;
            }
            let inserted = if self.settings.binary {
                out.insert(Feature::named(&self.prefix, &term, 1))
            } else {
                out.accumulate(Feature::named(&self.prefix, &term, candidate.product()))
            };
            if inserted {
                added += 1;
            }
        }
        Ok(added)
    }
}

impl FeatureExtractor for ComboNgramExtractor {
    type Input = DocumentPair;

    fn extract(&self, input: &DocumentPair) -> Result<FeatureSet> {
        ComboNgramExtractor::extract(self, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::StatisticsCollector;
    use crate::types::{Document, NgramSettings};

    fn config(symmetric: bool, binary: bool) -> PairNgramConfig {
        let mut config = PairNgramConfig::default();
        for settings in [
            &mut config.view1.settings,
            &mut config.view2.settings,
            &mut config.pooled.settings,
        ] {
            settings.ngram = NgramSettings::builder().range(1, 1).build();
        }
        config.with_combo(ComboConfig {
            settings: ComboSettings {
                min_n: 2,
                max_n: 2,
                symmetric,
                binary,
                ..ComboSettings::default()
            },
            ..ComboConfig::default()
        })
    }

    fn pair() -> DocumentPair {
        DocumentPair::new(
            Document::from_words(["cats", "eat", "mice"]),
            Document::from_words(["birds", "chase", "cats"]),
        )
    }

    fn extractor(config: &PairNgramConfig, corpus: &[DocumentPair]) -> ComboNgramExtractor {
        let mut collector = StatisticsCollector::new(VocabularyStore::new()).unwrap();
        config.register_fields(&mut collector).unwrap();
        for pair in corpus {
            collector.observe_pair(pair).unwrap();
        }
        ComboNgramExtractor::new(config, Arc::new(collector.finalize())).unwrap()
    }

    #[test]
    fn one_direction_yields_the_full_cross_product() {
        let config = config(false, true);
        let features = extractor(&config, &[pair()]).extract(&pair()).unwrap();
        assert_eq!(features.len(), 9);
        assert_eq!(features.get("comboNG_cats|birds"), Some(1));
        assert!(!features.contains("comboNG_birds|cats"));
    }

    #[test]
    fn symmetric_counts_self_pair_once() {
        let config = config(true, true);
        let features = extractor(&config, &[pair()]).extract(&pair()).unwrap();
        assert_eq!(features.len(), 17);
        assert!(features.contains("comboNG_birds|cats"));
        assert!(features.contains("comboNG_cats|cats"));
    }

    #[test]
    fn operands_outside_view_vocabulary_are_screened_out() {
        let config = config(false, true);
        let extractor = extractor(&config, &[pair()]);
        let unseen = DocumentPair::new(
            Document::from_words(["cats", "purr"]),
            Document::from_words(["birds"]),
        );
        let features = extractor.extract(&unseen).unwrap();
        assert_eq!(features.len(), 1);
        assert!(features.contains("comboNG_cats|birds"));
    }

    #[test]
    fn non_binary_value_is_the_count_product() {
        let config = config(false, false);
        let extractor = extractor(&config, &[pair()]);
        let repeated = DocumentPair::new(
            Document::from_words(["cats", "cats"]),
            Document::from_words(["birds", "birds", "birds"]),
        );
        let features = extractor.extract(&repeated).unwrap();
        assert_eq!(features.get("comboNG_cats|birds"), Some(6));
    }

    #[test]
    fn empty_view_yields_no_features() {
        let config = config(true, true);
        let extractor = extractor(&config, &[pair()]);
        let empty = DocumentPair::new(
            Document::from_words(["cats"]),
            Document::from_words(Vec::<String>::new()),
        );
        assert!(extractor.extract(&empty).unwrap().is_empty());
    }

    #[test]
    fn combo_vocabulary_is_bounded() {
        let mut config = config(false, true);
        if let Some(combo) = config.combo.as_mut() {
            combo.settings.top_k = 4;
        }
        let extractor = extractor(&config, &[pair()]);
        let vocab = extractor.vocabulary().unwrap();
        assert_eq!(vocab.len(), 4);
        // all nine terms tie at frequency 1, so the smallest terms win
        let terms: Vec<&str> = vocab.terms().collect();
        assert_eq!(terms, vec!["cats|birds", "cats|cats", "cats|chase", "eat|birds"]);
    }

    fn views(view1: &[&str], view2: &[&str]) -> DocumentPair {
        DocumentPair::new(
            Document::from_words(view1.iter().copied()),
            Document::from_words(view2.iter().copied()),
        )
    }

    fn sealed(config: &PairNgramConfig, corpus: &[DocumentPair]) -> Arc<VocabularyStore> {
        let mut collector = StatisticsCollector::new(VocabularyStore::new()).unwrap();
        config.register_fields(&mut collector).unwrap();
        for pair in corpus {
            collector.observe_pair(pair).unwrap();
        }
        Arc::new(collector.finalize())
    }

    #[test]
    fn symmetric_non_binary_sums_both_orderings() {
        let config = config(true, false);
        let instance = views(&["x", "y", "y"], &["y", "x", "x", "x"]);
        let store = sealed(&config, &[instance.clone()]);
        let field = config.combo.as_ref().unwrap().field.clone();
        let extractor = ComboNgramExtractor::new(&config, Arc::clone(&store)).unwrap();
        let features = extractor.extract(&instance).unwrap();

        // x|y: 1 x 1 from (x, y) plus 3 x 2 from the reversed (y, x)
        assert_eq!(store.frequency(&field, "x|y"), 7);
        assert_eq!(features.get("comboNG_x|y"), Some(7));
        assert_eq!(features.get("comboNG_y|x"), Some(store.frequency(&field, "y|x")));
        assert_eq!(features.get("comboNG_x|x"), Some(3));
    }

    #[test]
    fn growing_a_view_k_never_drops_combos() {
        let corpus = [
            views(&["a"], &["x"]),
            views(&["a"], &["y"]),
            views(&["a"], &["z"]),
            views(&["b", "b"], &["x", "x"]),
        ];
        let instance = views(&["a", "b"], &["x"]);
        let mut counts = Vec::new();
        for view1_k in [1, 2] {
            let mut config = config(false, true);
            config.view1.settings.top_k = view1_k;
            if let Some(combo) = config.combo.as_mut() {
                combo.settings.top_k = 1;
            }
            let extractor = extractor(&config, &corpus);
            let terms: Vec<String> = extractor
                .vocabulary()
                .unwrap()
                .terms()
                .map(str::to_string)
                .collect();
            assert_eq!(terms, vec!["b|x"]);
            counts.push(extractor.extract(&instance).unwrap().len());
        }
        assert_eq!(counts, vec![0, 1]);
    }

    #[test]
    fn narrower_length_window_reuses_the_collected_field() {
        let mut wide = config(false, true);
        for settings in [
            &mut wide.view1.settings,
            &mut wide.view2.settings,
            &mut wide.pooled.settings,
        ] {
            settings.ngram = NgramSettings::builder().range(1, 2).build();
        }
        if let Some(combo) = wide.combo.as_mut() {
            combo.settings.max_n = 3;
            combo.settings.top_k = 1;
        }
        let mut narrow = wide.clone();
        if let Some(combo) = narrow.combo.as_mut() {
            combo.settings.max_n = 2;
        }

        let store = sealed(&wide, &[views(&["a", "b"], &["x"])]);
        let instance = views(&["a", "b"], &["x"]);
        let wide_extractor = ComboNgramExtractor::new(&wide, Arc::clone(&store)).unwrap();
        let narrow_extractor = ComboNgramExtractor::new(&narrow, store).unwrap();

        // all three combos tie, so the byte-smallest one takes the single slot
        let vocabulary = wide_extractor.vocabulary().unwrap();
        assert_eq!(vocabulary.entries(), narrow_extractor.vocabulary().unwrap().entries());
        assert_eq!(vocabulary.terms().collect::<Vec<_>>(), vec!["a_b|x"]);
        assert_eq!(wide_extractor.extract(&instance).unwrap().len(), 1);
        assert!(narrow_extractor.extract(&instance).unwrap().is_empty());
    }

    #[test]
    fn missing_combo_config_is_rejected() {
        let store = Arc::new({
            let mut store = VocabularyStore::new();
            store.seal();
            store
        });
        let err = ComboNgramExtractor::new(&PairNgramConfig::default(), store).unwrap_err();
        assert!(matches!(err, GramstatError::InvalidConfig { .. }));
    }
}
