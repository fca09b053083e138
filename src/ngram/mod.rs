//! N-gram generation shared by the statistics pass and every extractor.
//!
//! Collection and extraction must produce identical terms for identical input,
//! otherwise screening silently finds no overlap. Both sides therefore call
//! [`generate`] with the same [`NgramOptions`], and the options fingerprint is
//! recorded next to each store field so a mismatch is caught when an extractor
//! is built.

mod keyword;

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::constants::{
    COMBO_JOINT, COMMA_MARKER, COMMA_TOKEN, NGRAM_GLUE, SENTENCE_BOUNDARY,
    SENTENCE_LOCATION_BEGIN, SENTENCE_LOCATION_END, SENTENCE_LOCATION_MIDDLE,
};
use crate::types::{Document, NgramSettings, Span, StopwordMode, TokenForm};
use crate::wordlist::WordList;
use crate::{GramstatError, Result};

/// Resolved generation options of one field: word lists are loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NgramOptions {
    pub min_n: usize,
    pub max_n: usize,
    pub lowercase: bool,
    pub stopwords: Arc<WordList>,
    pub stopword_mode: StopwordMode,
    pub mark_sentence_boundary: bool,
    pub mark_sentence_location: bool,
    pub include_commas: bool,
    pub token_form: TokenForm,
    pub keywords: Option<Arc<WordList>>,
    pub unicode_normalize: bool,
}

impl NgramOptions {
    /// Lowercased n-grams of size `min_n..=max_n`, no stopwords, no markers.
    pub fn new(min_n: usize, max_n: usize) -> Result<Self> {
        let options = Self {
            min_n,
            max_n,
            lowercase: true,
            stopwords: Arc::new(WordList::new()),
            stopword_mode: StopwordMode::default(),
            mark_sentence_boundary: false,
            mark_sentence_location: false,
            include_commas: false,
            token_form: TokenForm::default(),
            keywords: None,
            unicode_normalize: false,
        };
        options.validate()?;
        Ok(options)
    }

    /// Loads the referenced word lists. Unreadable lists are fatal here, before
    /// any corpus pass starts.
    pub fn resolve(settings: &NgramSettings) -> Result<Self> {
        let stopwords = match &settings.stopwords {
            Some(path) => WordList::load(path, settings.lowercase)?,
            None => WordList::new(),
        };
        // keyword matching is case-insensitive
        let keywords = match &settings.keywords {
            Some(path) => Some(Arc::new(WordList::load(path, true)?)),
            None => None,
        };
        let options = Self {
            min_n: settings.min_n,
            max_n: settings.max_n,
            lowercase: settings.lowercase,
            stopwords: Arc::new(stopwords),
            stopword_mode: settings.stopword_mode,
            mark_sentence_boundary: settings.mark_sentence_boundary,
            mark_sentence_location: settings.mark_sentence_location,
            include_commas: settings.include_commas,
            token_form: settings.token_form,
            keywords,
            unicode_normalize: settings.unicode_normalize,
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_n == 0 {
            return Err(GramstatError::config("min_n must be at least 1"));
        }
        if self.min_n > self.max_n {
            return Err(GramstatError::config(format!(
                "min_n ({}) must not exceed max_n ({})",
                self.min_n, self.max_n
            )));
        }
        if self.mark_sentence_location && !self.mark_sentence_boundary {
            return Err(GramstatError::config(
                "mark_sentence_location requires mark_sentence_boundary",
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_lowercase(mut self, enabled: bool) -> Self {
        self.lowercase = enabled;
        self
    }

    #[must_use]
    pub fn with_stopwords(mut self, stopwords: WordList, mode: StopwordMode) -> Self {
        self.stopwords = Arc::new(stopwords);
        self.stopword_mode = mode;
        self
    }

    #[must_use]
    pub fn with_sentence_marking(mut self, boundary: bool, location: bool) -> Self {
        self.mark_sentence_boundary = boundary;
        self.mark_sentence_location = location;
        self
    }

    #[must_use]
    pub fn with_commas(mut self, enabled: bool) -> Self {
        self.include_commas = enabled;
        self
    }

    #[must_use]
    pub fn with_token_form(mut self, form: TokenForm) -> Self {
        self.token_form = form;
        self
    }

    #[must_use]
    pub fn with_keywords(mut self, keywords: WordList) -> Self {
        self.keywords = Some(Arc::new(keywords));
        self
    }

    #[must_use]
    pub fn with_unicode_normalize(mut self, enabled: bool) -> Self {
        self.unicode_normalize = enabled;
        self
    }

    /// Stable digest of everything that influences the generated terms.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        #[derive(Serialize)]
        struct Fingerprint<'a> {
            min_n: usize,
            max_n: usize,
            lowercase: bool,
            stopwords: Vec<&'a str>,
            stopword_mode: StopwordMode,
            mark_sentence_boundary: bool,
            mark_sentence_location: bool,
            include_commas: bool,
            token_form: TokenForm,
            keywords: Option<Vec<&'a str>>,
            unicode_normalize: bool,
        }

        let fingerprint = Fingerprint {
            min_n: self.min_n,
            max_n: self.max_n,
            lowercase: self.lowercase,
            stopwords: self.stopwords.sorted_entries(),
            stopword_mode: self.stopword_mode,
            mark_sentence_boundary: self.mark_sentence_boundary,
            mark_sentence_location: self.mark_sentence_location,
            include_commas: self.include_commas,
            token_form: self.token_form,
            keywords: self.keywords.as_deref().map(WordList::sorted_entries),
            unicode_normalize: self.unicode_normalize,
        };
        // serializing plain data into a Vec cannot fail
        let bytes = serde_json::to_vec(&fingerprint).unwrap_or_default();
        blake3::hash(&bytes).to_hex().to_string()
    }

    fn normalize_form(&self, raw: &str) -> String {
        let mut form = if self.unicode_normalize {
            raw.nfkc().collect()
        } else {
            raw.to_string()
        };
        if self.lowercase {
            form = form.to_lowercase();
        }
        // NFKC can fold compatibility forms into the joint, so strip it last
        form.retain(|ch| ch != COMBO_JOINT);
        form
    }
}

/// Occurrence count and token length of one generated term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NgramEntry {
    pub count: u64,
    pub length: usize,
}

/// The n-grams of one instance: term -> (count, length).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NgramBag {
    entries: BTreeMap<String, NgramEntry>,
}

impl NgramBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, term: String, length: usize, count: u64) {
        match self.entries.entry(term) {
            Entry::Occupied(mut slot) => {
                let entry = slot.get_mut();
                entry.count = entry.count.saturating_add(count);
            }
            Entry::Vacant(slot) => {
                slot.insert(NgramEntry { count, length });
            }
        }
    }

    /// Adds every term of `other`.
    pub fn merge(&mut self, other: &NgramBag) {
        for (term, entry) in &other.entries {
            self.add(term.clone(), entry.length, entry.count);
        }
    }

    #[must_use]
    pub fn get(&self, term: &str) -> Option<NgramEntry> {
        self.entries.get(term).copied()
    }

    #[must_use]
    pub fn count(&self, term: &str) -> u64 {
        self.entries.get(term).map_or(0, |entry| entry.count)
    }

    #[must_use]
    pub fn contains(&self, term: &str) -> bool {
        self.entries.contains_key(term)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NgramEntry)> {
        self.entries.iter().map(|(term, entry)| (term.as_str(), *entry))
    }

    /// Total number of occurrences.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.entries.values().map(|entry| entry.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Unit {
    Word(String),
    Marker(String),
}

impl Unit {
    fn text(&self) -> &str {
        match self {
            Self::Word(text) | Self::Marker(text) => text,
        }
    }
}

/// Generates the n-grams of the document's target span.
pub fn generate(document: &Document, options: &NgramOptions) -> Result<NgramBag> {
    let target = document.checked_target()?;
    let mut sentences = document.sentences_in(&target)?;
    if sentences.is_empty() && !target.is_empty() {
        sentences.push(target);
    }

    let mut sequences: Vec<Vec<Unit>> = sentences
        .iter()
        .map(|sentence| sentence_units(document, sentence, options))
        .collect();

    if options.mark_sentence_boundary {
        let total = sequences.len();
        let mut joined = Vec::with_capacity(sequences.iter().map(|s| s.len() + 1).sum());
        for (index, sequence) in sequences.drain(..).enumerate() {
            joined.extend(sequence);
            joined.push(Unit::Marker(boundary_marker(
                index,
                total,
                options.mark_sentence_location,
            )));
        }
        sequences.push(joined);
    }

    let mut bag = NgramBag::new();
    for sequence in &sequences {
        add_windows(sequence, options, &mut bag);
    }
    Ok(bag)
}

/// Generates and merges the n-grams of several documents.
pub fn generate_merged<'a, I>(documents: I, options: &NgramOptions) -> Result<NgramBag>
where
    I: IntoIterator<Item = &'a Document>,
{
    let mut merged = NgramBag::new();
    for document in documents {
        merged.merge(&generate(document, options)?);
    }
    Ok(merged)
}

fn sentence_units(document: &Document, sentence: &Span, options: &NgramOptions) -> Vec<Unit> {
    let tokens = &document.tokens[sentence.start..sentence.end];
    let mut units = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.text == COMMA_TOKEN {
            if options.include_commas {
                units.push(Unit::Marker(COMMA_MARKER.to_string()));
            }
            continue;
        }
        let raw = match options.token_form {
            TokenForm::Surface => token.text.as_str(),
            TokenForm::Normalized => token.normalized.as_deref().unwrap_or(&token.text),
        };
        let form = options.normalize_form(raw);
        if !form.is_empty() {
            units.push(Unit::Word(form));
        }
    }
    match &options.keywords {
        Some(keywords) => keyword::restrict_to_keywords(units, keywords),
        None => units,
    }
}

fn boundary_marker(index: usize, total: usize, with_location: bool) -> String {
    if !with_location {
        return SENTENCE_BOUNDARY.to_string();
    }
    let position = index as f64 / total as f64;
    let location = if position < 0.25 {
        SENTENCE_LOCATION_BEGIN
    } else if position > 0.75 {
        SENTENCE_LOCATION_END
    } else {
        SENTENCE_LOCATION_MIDDLE
    };
    format!("{SENTENCE_BOUNDARY}{location}")
}

fn add_windows(units: &[Unit], options: &NgramOptions, bag: &mut NgramBag) {
    for n in options.min_n.max(1)..=options.max_n {
        if units.len() < n {
            break;
        }
        for window in units.windows(n) {
            if !passes_stopword_filter(window, options) {
                continue;
            }
            bag.add(join_units(window), n, 1);
        }
    }
}

fn passes_stopword_filter(window: &[Unit], options: &NgramOptions) -> bool {
    if options.stopwords.is_empty() {
        return true;
    }
    let is_stopword = |unit: &Unit| match unit {
        Unit::Word(word) => options.stopwords.contains(word),
        Unit::Marker(_) => false,
    };
    match options.stopword_mode {
        StopwordMode::PartialMatch => !window.iter().any(is_stopword),
        StopwordMode::ExactToken => !(window.len() == 1 && is_stopword(&window[0])),
    }
}

fn join_units(window: &[Unit]) -> String {
    let capacity = window.iter().map(|unit| unit.text().len() + 1).sum();
    let mut term = String::with_capacity(capacity);
    for (index, unit) in window.iter().enumerate() {
        if index > 0 {
            term.push_str(NGRAM_GLUE);
        }
        term.push_str(unit.text());
    }
    term
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Token;

    fn terms(bag: &NgramBag) -> Vec<&str> {
        bag.iter().map(|(term, _)| term).collect()
    }

    #[test]
    fn windows_are_contiguous_and_bounded_by_range() {
        let doc = Document::from_words(["The", "black", "cat"]);
        let bag = generate(&doc, &NgramOptions::new(1, 2).unwrap()).unwrap();
        assert_eq!(
            terms(&bag),
            vec!["black", "black_cat", "cat", "the", "the_black"]
        );
        assert_eq!(bag.get("the_black").unwrap().length, 2);
    }

    #[test]
    fn windows_stay_inside_sentences() {
        let doc = Document::from_sentences([vec!["a", "b"], vec!["c", "d"]]);
        let bag = generate(&doc, &NgramOptions::new(2, 2).unwrap()).unwrap();
        assert_eq!(terms(&bag), vec!["a_b", "c_d"]);
    }

    #[test]
    fn boundary_marking_lets_windows_span_sentences() {
        let doc = Document::from_sentences([vec!["a", "b"], vec!["c"]]);
        let options = NgramOptions::new(2, 2)
            .unwrap()
            .with_sentence_marking(true, false);
        let bag = generate(&doc, &options).unwrap();
        assert_eq!(terms(&bag), vec!["SB_c", "a_b", "b_SB", "c_SB"]);
    }

    #[test]
    fn location_markers_follow_sentence_position() {
        let doc = Document::from_sentences([vec!["a"], vec!["b"], vec!["c"], vec!["d"], vec!["e"]]);
        let options = NgramOptions::new(1, 1)
            .unwrap()
            .with_sentence_marking(true, true);
        let bag = generate(&doc, &options).unwrap();
        // positions 0, .2 -> BEG; .4, .6 -> MID; .8 -> END
        assert_eq!(bag.count("SBBEG"), 2);
        assert_eq!(bag.count("SBMID"), 2);
        assert_eq!(bag.count("SBEND"), 1);
    }

    #[test]
    fn commas_are_dropped_unless_included() {
        let doc = Document::from_words(["red", ",", "green"]);
        let dropped = generate(&doc, &NgramOptions::new(2, 2).unwrap()).unwrap();
        assert_eq!(terms(&dropped), vec!["red_green"]);

        let options = NgramOptions::new(2, 2).unwrap().with_commas(true);
        let kept = generate(&doc, &options).unwrap();
        assert_eq!(terms(&kept), vec!["CA_green", "red_CA"]);
    }

    #[test]
    fn partial_match_drops_any_ngram_with_a_stopword() {
        let doc = Document::from_words(["united", "states", "of", "america"]);
        let stop: WordList = ["of"].into_iter().collect();
        let options = NgramOptions::new(1, 2)
            .unwrap()
            .with_stopwords(stop, StopwordMode::PartialMatch);
        let bag = generate(&doc, &options).unwrap();
        assert!(!bag.contains("of"));
        assert!(!bag.contains("states_of"));
        assert!(!bag.contains("of_america"));
        assert!(bag.contains("united_states"));
    }

    #[test]
    fn exact_token_drops_only_single_stopwords() {
        let doc = Document::from_words(["united", "states", "of", "america"]);
        let stop: WordList = ["of"].into_iter().collect();
        let options = NgramOptions::new(1, 2)
            .unwrap()
            .with_stopwords(stop, StopwordMode::ExactToken);
        let bag = generate(&doc, &options).unwrap();
        assert!(!bag.contains("of"));
        assert!(bag.contains("states_of"));
        assert!(bag.contains("of_america"));
    }

    #[test]
    fn lowercasing_merges_case_variants() {
        let doc = Document::from_words(["Cat", "cat", "CAT"]);
        let bag = generate(&doc, &NgramOptions::new(1, 1).unwrap()).unwrap();
        assert_eq!(bag.count("cat"), 3);

        let cased = NgramOptions::new(1, 1).unwrap().with_lowercase(false);
        let bag = generate(&doc, &cased).unwrap();
        assert_eq!(bag.len(), 3);
    }

    #[test]
    fn short_documents_yield_nothing() {
        let doc = Document::from_words(["lonely"]);
        let bag = generate(&doc, &NgramOptions::new(2, 3).unwrap()).unwrap();
        assert!(bag.is_empty());
    }

    #[test]
    fn target_restricts_tokens() {
        let doc = Document::from_sentences([vec!["skip", "me"], vec!["keep", "this"]])
            .with_target(Some(Span::new(2, 4)));
        let bag = generate(&doc, &NgramOptions::new(1, 1).unwrap()).unwrap();
        assert_eq!(terms(&bag), vec!["keep", "this"]);
    }

    #[test]
    fn target_without_covered_sentences_is_one_sentence() {
        let doc = Document::from_sentences([vec!["a", "b", "c"]]).with_target(Some(Span::new(1, 3)));
        let bag = generate(&doc, &NgramOptions::new(2, 2).unwrap()).unwrap();
        assert_eq!(terms(&bag), vec!["b_c"]);
    }

    #[test]
    fn normalized_form_falls_back_to_surface() {
        let mut doc = Document::from_words(["cats", "ran"]);
        doc.tokens[0] = Token::new("cats").with_normalized("cat");
        let options = NgramOptions::new(1, 1)
            .unwrap()
            .with_token_form(TokenForm::Normalized);
        let bag = generate(&doc, &options).unwrap();
        assert_eq!(terms(&bag), vec!["cat", "ran"]);
    }

    #[test]
    fn combo_joint_is_stripped_from_tokens() {
        let doc = Document::from_words(["a|b", "|"]);
        let bag = generate(&doc, &NgramOptions::new(1, 2).unwrap()).unwrap();
        assert_eq!(terms(&bag), vec!["ab"]);

        // U+FF5C folds into the joint under NFKC
        let doc = Document::from_words(["a\u{FF5C}b"]);
        let options = NgramOptions::new(1, 1).unwrap().with_unicode_normalize(true);
        let bag = generate(&doc, &options).unwrap();
        assert_eq!(terms(&bag), vec!["ab"]);
    }

    #[test]
    fn nfkc_normalization_folds_compatibility_forms() {
        let doc = Document::from_words(["ﬁne"]);
        let options = NgramOptions::new(1, 1).unwrap().with_unicode_normalize(true);
        let bag = generate(&doc, &options).unwrap();
        assert!(bag.contains("fine"));
    }

    #[test]
    fn keyword_restriction_joins_phrases() {
        let doc = Document::from_words(["Fresh", "Brussels", "sprouts", "today"]);
        let keywords: WordList = ["brussels sprouts", "today"].into_iter().collect();
        let options = NgramOptions::new(1, 2).unwrap().with_keywords(keywords);
        let bag = generate(&doc, &options).unwrap();
        assert_eq!(
            terms(&bag),
            vec!["brussels-sprouts", "brussels-sprouts_today", "today"]
        );
        assert_eq!(bag.get("brussels-sprouts_today").unwrap().length, 2);
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        assert!(NgramOptions::new(0, 2).is_err());
        assert!(NgramOptions::new(3, 2).is_err());
        let options = NgramOptions::new(1, 2).unwrap().with_sentence_marking(false, true);
        assert!(options.validate().is_err());
    }

    #[test]
    fn fingerprint_tracks_generation_settings() {
        let base = NgramOptions::new(1, 3).unwrap();
        assert_eq!(base.fingerprint(), NgramOptions::new(1, 3).unwrap().fingerprint());
        assert_ne!(base.fingerprint(), base.clone().with_lowercase(false).fingerprint());
        let stop: WordList = ["the"].into_iter().collect();
        assert_ne!(
            base.fingerprint(),
            base.clone()
                .with_stopwords(stop, StopwordMode::ExactToken)
                .fingerprint()
        );
    }

    #[test]
    fn generate_merged_sums_counts() {
        let a = Document::from_words(["cat"]);
        let b = Document::from_words(["cat", "dog"]);
        let bag = generate_merged([&a, &b], &NgramOptions::new(1, 1).unwrap()).unwrap();
        assert_eq!(bag.count("cat"), 2);
        assert_eq!(bag.count("dog"), 1);
        assert_eq!(bag.total(), 3);
    }
}
