//! Separators, marker tokens and defaults shared by collection and extraction.

/// Joins the token forms of one n-gram and a feature prefix to its term.
pub const NGRAM_GLUE: &str = "_";
/// Joins the two operands of a combo term. Stripped from every token form, so a
/// combo term always splits back into exactly two operands.
pub const COMBO_JOINT: char = '|';
/// Joins the parts of a multi-token keyword into one unit.
pub const KEYWORD_GLUE: &str = "-";

/// Marker appended after each sentence when boundary marking is on.
pub const SENTENCE_BOUNDARY: &str = "SB";
pub const SENTENCE_LOCATION_BEGIN: &str = "BEG";
pub const SENTENCE_LOCATION_MIDDLE: &str = "MID";
pub const SENTENCE_LOCATION_END: &str = "END";
/// Marker emitted in place of a comma token when commas are included.
pub const COMMA_MARKER: &str = "CA";
pub const COMMA_TOKEN: &str = ",";

pub const DEFAULT_MIN_N: usize = 1;
pub const DEFAULT_MAX_N: usize = 3;
pub const DEFAULT_TOP_K: usize = 500;
pub const DEFAULT_COMBO_MIN_N: usize = 2;
pub const DEFAULT_COMBO_MAX_N: usize = 4;
pub const DEFAULT_COMBO_TOP_K: usize = 500;

// Field names registered by the stock configurations.
pub const FIELD_DOCUMENT: &str = "ngram";
pub const FIELD_VIEW1: &str = "ngram1";
pub const FIELD_VIEW2: &str = "ngram2";
pub const FIELD_POOLED: &str = "ngram_all";
pub const FIELD_COMBO: &str = "ngram_combo";

// Default feature prefixes.
pub const PREFIX_DOCUMENT: &str = "ngram";
pub const PREFIX_VIEW1: &str = "view1NG";
pub const PREFIX_VIEW2: &str = "view2NG";
pub const PREFIX_POOLED: &str = "allNG";
pub const PREFIX_POOLED_VIEW1: &str = "view1allNG";
pub const PREFIX_POOLED_VIEW2: &str = "view2allNG";
pub const PREFIX_COMBO: &str = "comboNG";

/// Store file magic and format version.
pub const STORE_MAGIC: [u8; 8] = *b"GRAMSTAT";
pub const STORE_FORMAT_VERSION: u16 = 1;
/// magic + version + body length + blake3 checksum
pub const STORE_HEADER_SIZE: usize = 8 + 2 + 8 + 32;
pub const MAX_STORE_BODY_BYTES: u64 = 2 * 1024 * 1024 * 1024;
