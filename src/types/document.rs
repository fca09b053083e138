//! Tokenized input documents produced by an external segmentation pipeline.

use serde::{Deserialize, Serialize};

use crate::{GramstatError, Result};

/// Half-open range of token indices `[start, end)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    #[must_use]
    pub fn covers(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A single token with its surface text and an optional normalized form (lemma, stem).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized: Option<String>,
}

impl Token {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            normalized: None,
        }
    }

    #[must_use]
    pub fn with_normalized<S: Into<String>>(mut self, normalized: S) -> Self {
        self.normalized = Some(normalized.into());
        self
    }
}

/// Tokenized text with sentence spans and the target span the features describe.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub sentences: Vec<Span>,
    #[serde(default)]
    pub target: Option<Span>,
}

impl Document {
    /// One sentence made of `words`, targeting the whole text.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_sentences([words])
    }

    /// Several sentences, targeting the whole text.
    pub fn from_sentences<I, W, S>(sentences: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens = Vec::new();
        let mut spans = Vec::new();
        for sentence in sentences {
            let start = tokens.len();
            tokens.extend(sentence.into_iter().map(Token::new));
            spans.push(Span::new(start, tokens.len()));
        }
        let target = Some(Span::new(0, tokens.len()));
        Self {
            id: None,
            tokens,
            sentences: spans,
            target,
        }
    }

    #[must_use]
    pub fn with_id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: Option<Span>) -> Self {
        self.target = target;
        self
    }

    /// The target span, checked against the token list.
    pub fn checked_target(&self) -> Result<Span> {
        let target = self.target.ok_or(GramstatError::MissingTarget)?;
        self.check_span(&target, "target")?;
        Ok(target)
    }

    /// Sentence spans fully covered by `target`, in document order.
    pub fn sentences_in(&self, target: &Span) -> Result<Vec<Span>> {
        let mut covered = Vec::new();
        let mut last_end = 0usize;
        for sentence in &self.sentences {
            self.check_span(sentence, "sentence")?;
            if sentence.start < last_end {
                return Err(GramstatError::malformed(
                    "sentence spans overlap or are out of order",
                ));
            }
            last_end = sentence.end;
            if target.covers(sentence) {
                covered.push(*sentence);
            }
        }
        Ok(covered)
    }

    fn check_span(&self, span: &Span, what: &'static str) -> Result<()> {
        if span.start > span.end {
            return Err(GramstatError::malformed(format!(
                "{what} span {}..{} is inverted",
                span.start, span.end
            )));
        }
        if span.end > self.tokens.len() {
            return Err(GramstatError::malformed(format!(
                "{what} span {}..{} exceeds {} tokens",
                span.start,
                span.end,
                self.tokens.len()
            )));
        }
        Ok(())
    }
}

/// Two aligned documents forming one pair-classification instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentPair {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub view1: Document,
    pub view2: Document,
}

impl DocumentPair {
    #[must_use]
    pub fn new(view1: Document, view2: Document) -> Self {
        Self {
            id: None,
            view1,
            view2,
        }
    }

    #[must_use]
    pub fn with_id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }
}
