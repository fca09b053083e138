#![deny(clippy::all, clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![cfg_attr(
    test,
    allow(
        clippy::useless_vec,
        clippy::uninlined_format_args,
        clippy::cast_possible_truncation,
        clippy::float_cmp,
        clippy::cast_precision_loss
    )
)]
#![allow(clippy::module_name_repetitions)]
//
// Documentation lints: internal helpers are self-describing; public APIs carry docs.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
//
// Casts are bounded by corpus sizes (token counts, sentence indices).
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
//
// Style
#![allow(clippy::too_many_lines)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::similar_names)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::struct_excessive_bools)] // n-gram settings are mostly flags
#![allow(clippy::needless_continue)]
#![allow(clippy::default_trait_access)]
#![allow(clippy::field_reassign_with_default)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::unnecessary_wraps)]

/// The gramstat-core crate version (matches `Cargo.toml`).
pub const GRAMSTAT_CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod batch;
pub mod collector;
pub mod combo;
pub mod config;
pub mod constants;
pub mod error;
pub mod extract;
pub mod io;
pub mod ngram;
pub mod store;
pub mod types;
pub mod wordlist;

pub use batch::{
    BatchReport, ExtractedBatch, Instance, InstanceFailure, collect, collect_pairs, extract_batch,
};
pub use collector::{FieldRole, FieldSpec, StatisticsCollector};
pub use combo::{ComboCandidate, combinations, join_combo, split_combo};
pub use config::{
    ComboConfig, DocumentNgramConfig, PairNgramConfig, PairOptions, PooledFieldConfig, PooledMode,
    ViewFieldConfig,
};
pub use error::{GramstatError, Result};
pub use extract::{
    ComboNgramExtractor, DocumentNgramExtractor, FeatureExtractor, PairNgramExtractor, screen,
};
pub use ngram::{NgramBag, NgramEntry, NgramOptions, generate, generate_merged};
pub use store::{TermStats, VocabularyStore};
pub use types::{
    ComboSettings, Document, DocumentPair, Feature, FeatureSet, FieldSettings, NgramSettings,
    NgramSettingsBuilder, Span, StopwordMode, TermFrequency, Token, TokenForm, Vocabulary,
};
pub use wordlist::WordList;
