//! The statistics pass: one sweep over the corpus filling a [`VocabularyStore`].

use serde::Serialize;
use tracing::debug;

use crate::combo::combinations;
use crate::ngram::{self, NgramBag, NgramOptions};
use crate::store::VocabularyStore;
use crate::types::{ComboSettings, Document, DocumentPair};
use crate::{GramstatError, Result};

/// Which part of an instance feeds a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRole {
    /// A standalone document, fed by [`StatisticsCollector::observe`].
    Document,
    View1,
    View2,
    /// Both views of a pair merged.
    Pooled,
    /// Cross-view combinations. The field's own options generate the view1
    /// operands; `view2` generates the view2 operands. Every combined length
    /// is counted, so one field serves any extraction length window.
    Combo {
        view2: NgramOptions,
        settings: ComboSettings,
    },
}

/// A named field and the options its n-grams are generated with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub role: FieldRole,
    pub options: NgramOptions,
}

impl FieldSpec {
    pub fn new<S: Into<String>>(name: S, role: FieldRole, options: NgramOptions) -> Self {
        Self {
            name: name.into(),
            role,
            options,
        }
    }

    pub fn document<S: Into<String>>(name: S, options: NgramOptions) -> Self {
        Self::new(name, FieldRole::Document, options)
    }

    pub fn combo<S: Into<String>>(
        name: S,
        view1: NgramOptions,
        view2: NgramOptions,
        settings: ComboSettings,
    ) -> Self {
        Self::new(
            name,
            FieldRole::Combo {
                view2,
                settings,
            },
            view1,
        )
    }

    /// Fingerprint recorded in the store for this field.
    #[must_use]
    pub fn signature(&self) -> String {
        match &self.role {
            FieldRole::Combo { view2, settings } => {
                combo_signature(&self.options, view2, settings)
            }
            _ => self.options.fingerprint(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(GramstatError::config("field name must not be empty"));
        }
        self.options.validate()?;
        if let FieldRole::Combo { view2, settings } = &self.role {
            view2.validate()?;
            validate_combo(settings)?;
        }
        Ok(())
    }

    fn is_pair_role(&self) -> bool {
        !matches!(self.role, FieldRole::Document)
    }
}

pub(crate) fn validate_combo(settings: &ComboSettings) -> Result<()> {
    if settings.min_n == 0 || settings.min_n > settings.max_n {
        return Err(GramstatError::config(format!(
            "combo length range {}..={} is invalid",
            settings.min_n, settings.max_n
        )));
    }
    if settings.top_k == 0 {
        return Err(GramstatError::config("combo top_k must be positive"));
    }
    Ok(())
}

pub(crate) fn combo_signature(
    view1: &NgramOptions,
    view2: &NgramOptions,
    settings: &ComboSettings,
) -> String {
    // the length window is applied at extraction and stays out of the digest
    #[derive(Serialize)]
    struct ComboFingerprint {
        view1: String,
        view2: String,
        symmetric: bool,
    }
    let fingerprint = ComboFingerprint {
        view1: view1.fingerprint(),
        view2: view2.fingerprint(),
        symmetric: settings.symmetric,
    };
    let bytes = serde_json::to_vec(&fingerprint).unwrap_or_default();
    blake3::hash(&bytes).to_hex().to_string()
}

/// Memoizes generated bags per distinct option set for one instance.
#[derive(Default)]
pub(crate) struct BagCache<'o> {
    entries: Vec<(&'o NgramOptions, NgramBag)>,
}

impl<'o> BagCache<'o> {
    pub(crate) fn get(&mut self, document: &Document, options: &'o NgramOptions) -> Result<&NgramBag> {
        let position = match self.entries.iter().position(|(known, _)| *known == options) {
            Some(position) => position,
            None => {
                let bag = ngram::generate(document, options)?;
                self.entries.push((options, bag));
                self.entries.len() - 1
            }
        };
        Ok(&self.entries[position].1)
    }
}

/// Single writer of the statistics pass. [`finalize`](Self::finalize) hands
/// back the sealed store.
#[derive(Debug)]
pub struct StatisticsCollector {
    store: VocabularyStore,
    fields: Vec<FieldSpec>,
    observed: u64,
}

impl StatisticsCollector {
    /// Starts a pass over `store`. A sealed store belongs to a finished pass and
    /// is rejected.
    pub fn new(store: VocabularyStore) -> Result<Self> {
        if store.is_sealed() {
            return Err(GramstatError::StoreSealed);
        }
        Ok(Self {
            store,
            fields: Vec::new(),
            observed: 0,
        })
    }

    pub fn register(&mut self, spec: FieldSpec) -> Result<()> {
        spec.validate()?;
        if self.fields.iter().any(|known| known.name == spec.name) {
            return Err(GramstatError::DuplicateField { field: spec.name });
        }
        self.store.register_field(&spec.name, Some(spec.signature()))?;
        debug!(field = %spec.name, role = role_label(&spec.role), "registered field");
        self.fields.push(spec);
        Ok(())
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.fields.iter().any(|spec| spec.name == name)
    }

    /// Number of instances observed so far.
    #[must_use]
    pub fn observed(&self) -> u64 {
        self.observed
    }

    #[must_use]
    pub fn store(&self) -> &VocabularyStore {
        &self.store
    }

    /// Counts the n-grams of every `Document` field. Nothing is written when the
    /// document turns out to be malformed.
    pub fn observe(&mut self, document: &Document) -> Result<()> {
        let mut bags = Vec::new();
        for spec in self.fields.iter().filter(|spec| !spec.is_pair_role()) {
            bags.push((spec.name.as_str(), ngram::generate(document, &spec.options)?));
        }
        for (field, bag) in &bags {
            self.store.put_bag(field, bag)?;
        }
        self.observed += 1;
        Ok(())
    }

    /// Counts the n-grams of every pair field.
    pub fn observe_pair(&mut self, pair: &DocumentPair) -> Result<()> {
        let mut view1 = BagCache::default();
        let mut view2 = BagCache::default();
        let mut updates: Vec<(&str, NgramBag)> = Vec::new();

        for spec in self.fields.iter().filter(|spec| spec.is_pair_role()) {
            let bag = match &spec.role {
                FieldRole::Document => continue,
                FieldRole::View1 => view1.get(&pair.view1, &spec.options)?.clone(),
                FieldRole::View2 => view2.get(&pair.view2, &spec.options)?.clone(),
                FieldRole::Pooled => {
                    let mut merged = view1.get(&pair.view1, &spec.options)?.clone();
                    merged.merge(view2.get(&pair.view2, &spec.options)?);
                    merged
                }
                FieldRole::Combo {
                    view2: view2_options,
                    settings,
                } => {
                    let left = view1.get(&pair.view1, &spec.options)?.clone();
                    let right = view2.get(&pair.view2, view2_options)?;
                    let mut combos = NgramBag::new();
                    let all_lengths = combinations(&left, right, 1, usize::MAX, settings.symmetric);
                    for candidate in all_lengths {
                        combos.add(candidate.term(), candidate.length, candidate.product());
                    }
                    combos
                }
            };
            updates.push((spec.name.as_str(), bag));
        }

        for (field, bag) in &updates {
            self.store.put_bag(field, bag)?;
        }
        self.observed += 1;
        Ok(())
    }

    /// Seals the store and returns it.
    #[must_use]
    pub fn finalize(mut self) -> VocabularyStore {
        debug!(
            collector.fields = self.fields.len(),
            collector.observed = self.observed,
            "statistics pass finished"
        );
        self.store.seal();
        self.store
    }
}

fn role_label(role: &FieldRole) -> &'static str {
    match role {
        FieldRole::Document => "document",
        FieldRole::View1 => "view1",
        FieldRole::View2 => "view2",
        FieldRole::Pooled => "pooled",
        FieldRole::Combo { .. } => "combo",
    }
}
