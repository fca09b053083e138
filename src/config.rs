//! Extractor configurations. The same value registers the statistics fields and
//! builds the extractor, so both phases generate n-grams identically.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::collector::{FieldRole, FieldSpec, StatisticsCollector, validate_combo};
use crate::constants::{
    FIELD_COMBO, FIELD_DOCUMENT, FIELD_POOLED, FIELD_VIEW1, FIELD_VIEW2, PREFIX_COMBO,
    PREFIX_DOCUMENT, PREFIX_POOLED, PREFIX_POOLED_VIEW1, PREFIX_POOLED_VIEW2, PREFIX_VIEW1,
    PREFIX_VIEW2,
};
use crate::ngram::NgramOptions;
use crate::types::{ComboSettings, FieldSettings};
use crate::{GramstatError, Result};

fn default_true() -> bool {
    true
}

fn default_document_field() -> String {
    FIELD_DOCUMENT.to_string()
}

fn default_document_prefix() -> String {
    PREFIX_DOCUMENT.to_string()
}

fn default_view1() -> ViewFieldConfig {
    ViewFieldConfig::new(FIELD_VIEW1, PREFIX_VIEW1)
}

fn default_view2() -> ViewFieldConfig {
    ViewFieldConfig::new(FIELD_VIEW2, PREFIX_VIEW2)
}

fn default_combo_field() -> String {
    FIELD_COMBO.to_string()
}

fn default_combo_prefix() -> String {
    PREFIX_COMBO.to_string()
}

/// Reads a JSON configuration file.
fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let contents = fs_err::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&contents)?)
}

fn check_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        return Err(GramstatError::config("feature prefix must not be empty"));
    }
    Ok(())
}

fn check_field(settings: &FieldSettings, field: &str) -> Result<()> {
    if field.is_empty() {
        return Err(GramstatError::config("field name must not be empty"));
    }
    if settings.top_k == 0 {
        return Err(GramstatError::config(format!(
            "top_k of field `{field}` must be positive"
        )));
    }
    Ok(())
}

/// Single-document n-gram features.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentNgramConfig {
    #[serde(default = "default_document_field")]
    pub field: String,
    #[serde(default = "default_document_prefix")]
    pub prefix: String,
    /// Presence flags instead of occurrence counts.
    #[serde(default = "default_true")]
    pub binary: bool,
    #[serde(flatten)]
    pub settings: FieldSettings,
}

impl Default for DocumentNgramConfig {
    fn default() -> Self {
        Self {
            field: default_document_field(),
            prefix: default_document_prefix(),
            binary: true,
            settings: FieldSettings::default(),
        }
    }
}

impl DocumentNgramConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = read_json(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_field(&self.settings, &self.field)?;
        check_prefix(&self.prefix)
    }

    /// Loads word lists and checks the n-gram range.
    pub fn resolve(&self) -> Result<NgramOptions> {
        self.validate()?;
        NgramOptions::resolve(&self.settings.ngram)
    }

    pub fn register_fields(&self, collector: &mut StatisticsCollector) -> Result<()> {
        collector.register(FieldSpec::document(&self.field, self.resolve()?))
    }
}

/// One per-view (or pooled) vocabulary field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewFieldConfig {
    pub field: String,
    pub prefix: String,
    #[serde(flatten)]
    pub settings: FieldSettings,
}

impl ViewFieldConfig {
    pub fn new<F: Into<String>, P: Into<String>>(field: F, prefix: P) -> Self {
        Self {
            field: field.into(),
            prefix: prefix.into(),
            settings: FieldSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: FieldSettings) -> Self {
        self.settings = settings;
        self
    }

    fn validate(&self) -> Result<()> {
        check_field(&self.settings, &self.field)?;
        check_prefix(&self.prefix)
    }
}

/// The pooled vocabulary built from both views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PooledFieldConfig {
    pub field: String,
    /// Prefix of view-blind pooled features.
    pub prefix: String,
    /// Prefixes of pooled features that record the contributing view.
    pub view1_prefix: String,
    pub view2_prefix: String,
    #[serde(flatten)]
    pub settings: FieldSettings,
}

impl Default for PooledFieldConfig {
    fn default() -> Self {
        Self {
            field: FIELD_POOLED.to_string(),
            prefix: PREFIX_POOLED.to_string(),
            view1_prefix: PREFIX_POOLED_VIEW1.to_string(),
            view2_prefix: PREFIX_POOLED_VIEW2.to_string(),
            settings: FieldSettings::default(),
        }
    }
}

impl PooledFieldConfig {
    fn validate(&self) -> Result<()> {
        check_field(&self.settings, &self.field)?;
        check_prefix(&self.prefix)?;
        check_prefix(&self.view1_prefix)?;
        check_prefix(&self.view2_prefix)
    }
}

/// How pooled-vocabulary features are emitted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PooledMode {
    #[default]
    Off,
    /// Both views merged under one prefix.
    ViewBlind,
    /// Each view screened separately under its own pooled prefix.
    LocalView,
}

/// Cross-view combination features.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComboConfig {
    #[serde(default = "default_combo_field")]
    pub field: String,
    #[serde(default = "default_combo_prefix")]
    pub prefix: String,
    #[serde(flatten)]
    pub settings: ComboSettings,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            field: default_combo_field(),
            prefix: default_combo_prefix(),
            settings: ComboSettings::default(),
        }
    }
}

impl ComboConfig {
    fn validate(&self) -> Result<()> {
        if self.field.is_empty() {
            return Err(GramstatError::config("combo field name must not be empty"));
        }
        check_prefix(&self.prefix)?;
        validate_combo(&self.settings)
    }
}

/// Per-view, pooled and combination features of document pairs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PairNgramConfig {
    #[serde(default = "default_view1")]
    pub view1: ViewFieldConfig,
    #[serde(default = "default_view2")]
    pub view2: ViewFieldConfig,
    #[serde(default)]
    pub pooled: PooledFieldConfig,
    #[serde(default = "default_true")]
    pub use_view1: bool,
    #[serde(default = "default_true")]
    pub use_view2: bool,
    #[serde(default)]
    pub pooled_mode: PooledMode,
    #[serde(default = "default_true")]
    pub binary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combo: Option<ComboConfig>,
}

impl Default for PairNgramConfig {
    fn default() -> Self {
        Self {
            view1: default_view1(),
            view2: default_view2(),
            pooled: PooledFieldConfig::default(),
            use_view1: true,
            use_view2: true,
            pooled_mode: PooledMode::default(),
            binary: true,
            combo: None,
        }
    }
}

/// Resolved options of every field a pair configuration touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairOptions {
    pub view1: NgramOptions,
    pub view2: NgramOptions,
    pub pooled: NgramOptions,
}

impl PairNgramConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = read_json(path)?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_combo(mut self, combo: ComboConfig) -> Self {
        self.combo = Some(combo);
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.view1.validate()?;
        self.view2.validate()?;
        self.pooled.validate()?;
        if let Some(combo) = &self.combo {
            combo.validate()?;
        }
        let mut names = vec![&self.view1.field, &self.view2.field, &self.pooled.field];
        if let Some(combo) = &self.combo {
            names.push(&combo.field);
        }
        for (index, name) in names.iter().enumerate() {
            if names[..index].contains(name) {
                return Err(GramstatError::DuplicateField {
                    field: (*name).clone(),
                });
            }
        }
        Ok(())
    }

    pub fn resolve(&self) -> Result<PairOptions> {
        self.validate()?;
        Ok(PairOptions {
            view1: NgramOptions::resolve(&self.view1.settings.ngram)?,
            view2: NgramOptions::resolve(&self.view2.settings.ngram)?,
            pooled: NgramOptions::resolve(&self.pooled.settings.ngram)?,
        })
    }

    pub(crate) fn needs_view1(&self) -> bool {
        self.use_view1 || self.combo.is_some()
    }

    pub(crate) fn needs_view2(&self) -> bool {
        self.use_view2 || self.combo.is_some()
    }

    pub(crate) fn needs_pooled(&self) -> bool {
        self.pooled_mode != PooledMode::Off || self.combo.is_some()
    }

    /// Registers every field this configuration reads. Combination screening
    /// needs the per-view and pooled vocabularies even when their features
    /// are disabled.
    pub fn register_fields(&self, collector: &mut StatisticsCollector) -> Result<()> {
        let options = self.resolve()?;
        if self.needs_view1() {
            collector.register(FieldSpec::new(
                &self.view1.field,
                FieldRole::View1,
                options.view1.clone(),
            ))?;
        }
        if self.needs_view2() {
            collector.register(FieldSpec::new(
                &self.view2.field,
                FieldRole::View2,
                options.view2.clone(),
            ))?;
        }
        if self.needs_pooled() {
            collector.register(FieldSpec::new(
                &self.pooled.field,
                FieldRole::Pooled,
                options.pooled.clone(),
            ))?;
        }
        if let Some(combo) = &self.combo {
            collector.register(FieldSpec::combo(
                &combo.field,
                options.view1,
                options.view2,
                combo.settings.clone(),
            ))?;
        }
        Ok(())
    }
}
