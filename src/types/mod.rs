//! Public types exposed by the `gramstat-core` crate.

pub mod document;
pub mod feature;
pub mod options;
pub mod vocabulary;

pub use document::{Document, DocumentPair, Span, Token};
pub use feature::{Feature, FeatureSet};
pub use options::{
    ComboSettings, FieldSettings, NgramSettings, NgramSettingsBuilder, StopwordMode, TokenForm,
};
pub use vocabulary::{TermFrequency, Vocabulary};
