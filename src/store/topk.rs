//! Bounded top-K selection over term frequencies.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::types::TermFrequency;

/// Orders candidates so that "greater" means "ranks earlier": higher frequency
/// first, then the byte-wise smaller term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ranked<'a> {
    frequency: u64,
    term: &'a str,
}

impl Ord for Ranked<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.frequency
            .cmp(&other.frequency)
            .then_with(|| other.term.as_bytes().cmp(self.term.as_bytes()))
    }
}

impl PartialOrd for Ranked<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Keeps the `k` best candidates in a min-heap whose root is the current
/// worst entry, so memory stays at O(k) regardless of the number of terms.
pub(crate) fn select<'a, I>(candidates: I, k: usize) -> Vec<TermFrequency>
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    if k == 0 {
        return Vec::new();
    }
    let mut heap: BinaryHeap<Reverse<Ranked<'a>>> = BinaryHeap::with_capacity(k + 1);
    for (term, frequency) in candidates {
        let candidate = Ranked { frequency, term };
        if heap.len() < k {
            heap.push(Reverse(candidate));
            continue;
        }
        if let Some(Reverse(worst)) = heap.peek() {
            if candidate > *worst {
                heap.pop();
                heap.push(Reverse(candidate));
            }
        }
    }

    // ascending by Reverse == descending by rank
    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(ranked)| TermFrequency {
            term: ranked.term.to_string(),
            frequency: ranked.frequency,
        })
        .collect()
}
