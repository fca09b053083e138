//! Cross-view n-gram combinations.

use smallvec::SmallVec;

use crate::constants::COMBO_JOINT;
use crate::ngram::NgramBag;

/// One candidate pairing of a view1 n-gram with a view2 n-gram.
///
/// `first` and `second` are in combo-term order; when `reversed` is set,
/// `first` came from view2 and `second` from view1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboCandidate<'a> {
    pub first: &'a str,
    pub second: &'a str,
    pub first_count: u64,
    pub second_count: u64,
    pub length: usize,
    pub reversed: bool,
}

impl ComboCandidate<'_> {
    #[must_use]
    pub fn term(&self) -> String {
        join_combo(self.first, self.second)
    }

    /// Co-occurrence weight: count(first) x count(second).
    #[must_use]
    pub fn product(&self) -> u64 {
        self.first_count.saturating_mul(self.second_count)
    }
}

#[must_use]
pub fn join_combo(first: &str, second: &str) -> String {
    let mut term = String::with_capacity(first.len() + second.len() + 1);
    term.push_str(first);
    term.push(COMBO_JOINT);
    term.push_str(second);
    term
}

/// Splits a combo term back into its operands.
#[must_use]
pub fn split_combo(term: &str) -> Option<(&str, &str)> {
    term.split_once(COMBO_JOINT)
}

/// Lazily enumerates `view1 x view2`, keeping pairs whose combined token
/// length lies in `min_len..=max_len`. With `symmetric`, each pair is followed
/// by its reversal unless both operands are the same term.
pub fn combinations<'a>(
    view1: &'a NgramBag,
    view2: &'a NgramBag,
    min_len: usize,
    max_len: usize,
    symmetric: bool,
) -> impl Iterator<Item = ComboCandidate<'a>> + 'a {
    view1.iter().flat_map(move |(a, left)| {
        view2.iter().flat_map(move |(b, right)| {
            let length = left.length + right.length;
            let mut out: SmallVec<[ComboCandidate<'a>; 2]> = SmallVec::new();
            if length < min_len || length > max_len {
                return out;
            }
            out.push(ComboCandidate {
                first: a,
                second: b,
                first_count: left.count,
                second_count: right.count,
                length,
                reversed: false,
            });
            if symmetric && a != b {
                out.push(ComboCandidate {
                    first: b,
                    second: a,
                    first_count: right.count,
                    second_count: left.count,
                    length,
                    reversed: true,
                });
            }
            out
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(terms: &[(&str, usize, u64)]) -> NgramBag {
        let mut bag = NgramBag::new();
        for (term, length, count) in terms {
            bag.add((*term).to_string(), *length, *count);
        }
        bag
    }

    #[test]
    fn cross_product_respects_length_window() {
        let v1 = bag(&[("a", 1, 1), ("a_b", 2, 1)]);
        let v2 = bag(&[("c", 1, 1), ("c_d_e", 3, 1)]);
        let terms: Vec<String> = combinations(&v1, &v2, 2, 3, false)
            .map(|c| c.term())
            .collect();
        assert_eq!(terms, vec!["a|c", "a_b|c"]);
    }

    #[test]
    fn symmetric_adds_reversals_except_self_pairs() {
        let v1 = bag(&[("x", 1, 2), ("y", 1, 1)]);
        let v2 = bag(&[("x", 1, 3)]);
        let candidates: Vec<ComboCandidate<'_>> = combinations(&v1, &v2, 2, 2, true).collect();
        let terms: Vec<String> = candidates.iter().map(ComboCandidate::term).collect();
        assert_eq!(terms, vec!["x|x", "y|x", "x|y"]);
        assert!(candidates[2].reversed);
        assert_eq!(candidates[0].product(), 6);
        assert_eq!(candidates[2].product(), 3);
    }

    #[test]
    fn empty_side_yields_nothing() {
        let v1 = bag(&[("a", 1, 1)]);
        let empty = NgramBag::new();
        assert_eq!(combinations(&v1, &empty, 1, 10, true).count(), 0);
        assert_eq!(combinations(&empty, &v1, 1, 10, true).count(), 0);
    }

    #[test]
    fn split_recovers_operands() {
        let term = join_combo("new_york", "paris");
        assert_eq!(split_combo(&term), Some(("new_york", "paris")));
        assert_eq!(split_combo("plain"), None);
    }
}
