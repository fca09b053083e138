use crate::ngram::NgramBag;
use crate::types::{Feature, FeatureSet, Vocabulary};

/// Emits `prefix_term` for every n-gram of `bag` that is in `vocabulary`.
/// The value is 1 when `binary`, otherwise the in-instance count. Returns the
/// number of features added.
pub fn screen(
    bag: &NgramBag,
    vocabulary: &Vocabulary,
    prefix: &str,
    binary: bool,
    out: &mut FeatureSet,
) -> usize {
    if vocabulary.is_empty() {
        return 0;
    }
    let mut added = 0;
    for (term, entry) in bag.iter() {
        if !vocabulary.contains(term) {
            continue;
        }
        let value = if binary { 1 } else { entry.count };
        if out.insert(Feature::named(prefix, term, value)) {
            added += 1;
        }
    }
    added
}
