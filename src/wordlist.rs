//! Newline-delimited stopword and keyword lists.

use std::collections::HashSet;
use std::path::Path;

use crate::{GramstatError, Result};

/// A set of words or multi-word phrases. Phrases keep their inner single spaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordList {
    entries: HashSet<String>,
    longest_phrase: usize,
}

impl WordList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads one entry per line; blank lines and `#` comments are skipped.
    pub fn load<P: AsRef<Path>>(path: P, lowercase: bool) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs_err::read_to_string(path).map_err(|err| GramstatError::WordList {
            path: path.to_path_buf(),
            reason: err.to_string().into(),
        })?;
        let list = Self::parse(&contents, lowercase);
        log::debug!("loaded {} entries from {}", list.len(), path.display());
        Ok(list)
    }

    #[must_use]
    pub fn parse(contents: &str, lowercase: bool) -> Self {
        contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| {
                if lowercase {
                    line.to_lowercase()
                } else {
                    line.to_string()
                }
            })
            .collect()
    }

    pub fn insert<S: AsRef<str>>(&mut self, entry: S) {
        let normalized = entry
            .as_ref()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if normalized.is_empty() {
            return;
        }
        let words = normalized.split(' ').count();
        self.longest_phrase = self.longest_phrase.max(words);
        self.entries.insert(normalized);
    }

    #[must_use]
    pub fn contains(&self, entry: &str) -> bool {
        self.entries.contains(entry)
    }

    /// Number of words in the longest entry.
    #[must_use]
    pub fn longest_phrase(&self) -> usize {
        self.longest_phrase
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn sorted_entries(&self) -> Vec<&str> {
        let mut entries: Vec<&str> = self.entries.iter().map(String::as_str).collect();
        entries.sort_unstable();
        entries
    }
}

impl<S: AsRef<str>> FromIterator<S> for WordList {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut list = Self::new();
        for entry in iter {
            list.insert(entry);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parse_skips_comments_and_blank_lines() {
        let list = WordList::parse("# english\nThe\n\n  of \nBrussels   Sprouts\n", true);
        assert_eq!(list.len(), 3);
        assert!(list.contains("the"));
        assert!(list.contains("of"));
        assert!(list.contains("brussels sprouts"));
        assert_eq!(list.longest_phrase(), 2);
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "a\nan\nthe").expect("write");
        let list = WordList::load(file.path(), false).expect("load");
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tmp");
        let err = WordList::load(dir.path().join("missing.txt"), true).expect_err("missing");
        assert!(matches!(err, GramstatError::WordList { .. }));
    }
}
