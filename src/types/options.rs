//! Builder-style settings for n-gram fields, as read from configuration files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_COMBO_MAX_N, DEFAULT_COMBO_MIN_N, DEFAULT_COMBO_TOP_K, DEFAULT_MAX_N, DEFAULT_MIN_N,
    DEFAULT_TOP_K,
};

fn default_true() -> bool {
    true
}

fn default_min_n() -> usize {
    DEFAULT_MIN_N
}

fn default_max_n() -> usize {
    DEFAULT_MAX_N
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_combo_min_n() -> usize {
    DEFAULT_COMBO_MIN_N
}

fn default_combo_max_n() -> usize {
    DEFAULT_COMBO_MAX_N
}

fn default_combo_top_k() -> usize {
    DEFAULT_COMBO_TOP_K
}

/// How stopwords remove candidate n-grams.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum StopwordMode {
    /// Drop any n-gram that contains a stopword.
    PartialMatch,
    /// Drop only single-token n-grams that are a stopword.
    #[default]
    ExactToken,
}

/// Which token form feeds the n-grams.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenForm {
    #[default]
    Surface,
    /// The token's normalized form, falling back to the surface text.
    Normalized,
}

/// Generation settings of one n-gram field. Word lists are referenced by path
/// and loaded when the settings are resolved into `NgramOptions`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NgramSettings {
    #[serde(default = "default_min_n")]
    pub min_n: usize,
    #[serde(default = "default_max_n")]
    pub max_n: usize,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    /// Newline-delimited stopword list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopwords: Option<PathBuf>,
    #[serde(default)]
    pub stopword_mode: StopwordMode,
    #[serde(default)]
    pub mark_sentence_boundary: bool,
    /// Encode the sentence position (begin, middle, end) in the boundary marker.
    #[serde(default)]
    pub mark_sentence_location: bool,
    #[serde(default)]
    pub include_commas: bool,
    #[serde(default)]
    pub token_form: TokenForm,
    /// Newline-delimited keyword list; restricts the token sequence to keyword occurrences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<PathBuf>,
    /// Apply NFKC normalization to token forms.
    #[serde(default)]
    pub unicode_normalize: bool,
}

impl Default for NgramSettings {
    fn default() -> Self {
        Self {
            min_n: DEFAULT_MIN_N,
            max_n: DEFAULT_MAX_N,
            lowercase: true,
            stopwords: None,
            stopword_mode: StopwordMode::default(),
            mark_sentence_boundary: false,
            mark_sentence_location: false,
            include_commas: false,
            token_form: TokenForm::default(),
            keywords: None,
            unicode_normalize: false,
        }
    }
}

impl NgramSettings {
    /// Start a fluent builder for `NgramSettings`.
    #[must_use]
    pub fn builder() -> NgramSettingsBuilder {
        NgramSettingsBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct NgramSettingsBuilder {
    inner: NgramSettings,
}

impl NgramSettingsBuilder {
    #[must_use]
    pub fn range(mut self, min_n: usize, max_n: usize) -> Self {
        self.inner.min_n = min_n;
        self.inner.max_n = max_n;
        self
    }

    #[must_use]
    pub fn lowercase(mut self, enabled: bool) -> Self {
        self.inner.lowercase = enabled;
        self
    }

    #[must_use]
    pub fn stopwords<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.inner.stopwords = Some(path.into());
        self
    }

    #[must_use]
    pub fn stopword_mode(mut self, mode: StopwordMode) -> Self {
        self.inner.stopword_mode = mode;
        self
    }

    #[must_use]
    pub fn mark_sentence_boundary(mut self, enabled: bool) -> Self {
        self.inner.mark_sentence_boundary = enabled;
        self
    }

    #[must_use]
    pub fn mark_sentence_location(mut self, enabled: bool) -> Self {
        self.inner.mark_sentence_location = enabled;
        self
    }

    #[must_use]
    pub fn include_commas(mut self, enabled: bool) -> Self {
        self.inner.include_commas = enabled;
        self
    }

    #[must_use]
    pub fn token_form(mut self, form: TokenForm) -> Self {
        self.inner.token_form = form;
        self
    }

    #[must_use]
    pub fn keywords<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.inner.keywords = Some(path.into());
        self
    }

    #[must_use]
    pub fn unicode_normalize(mut self, enabled: bool) -> Self {
        self.inner.unicode_normalize = enabled;
        self
    }

    #[must_use]
    pub fn build(self) -> NgramSettings {
        self.inner
    }
}

/// Settings of one vocabulary field: how to generate its n-grams and how many to keep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldSettings {
    #[serde(flatten)]
    pub ngram: NgramSettings,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Terms observed fewer times than this never enter the vocabulary.
    #[serde(default)]
    pub min_frequency: u64,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            ngram: NgramSettings::default(),
            top_k: DEFAULT_TOP_K,
            min_frequency: 0,
        }
    }
}

impl FieldSettings {
    #[must_use]
    pub fn new(ngram: NgramSettings, top_k: usize) -> Self {
        Self {
            ngram,
            top_k,
            min_frequency: 0,
        }
    }
}

/// Cross-document combination settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComboSettings {
    /// Minimum combined token length of both operands.
    #[serde(default = "default_combo_min_n")]
    pub min_n: usize,
    #[serde(default = "default_combo_max_n")]
    pub max_n: usize,
    #[serde(default = "default_combo_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub min_frequency: u64,
    /// Also emit the reversed ordering `(view2 term, view1 term)`.
    #[serde(default)]
    pub symmetric: bool,
    /// Presence flags instead of co-occurrence counts.
    #[serde(default = "default_true")]
    pub binary: bool,
}

impl Default for ComboSettings {
    fn default() -> Self {
        Self {
            min_n: DEFAULT_COMBO_MIN_N,
            max_n: DEFAULT_COMBO_MAX_N,
            top_k: DEFAULT_COMBO_TOP_K,
            min_frequency: 0,
            symmetric: false,
            binary: true,
        }
    }
}
