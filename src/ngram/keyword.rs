use smallvec::SmallVec;

use super::Unit;
use crate::constants::KEYWORD_GLUE;
use crate::wordlist::WordList;

/// Keeps only keyword occurrences. Scanning left to right, the longest keyword
/// phrase starting at each position wins and its words are joined into a
/// single unit. Matching ignores case; emitted units keep the casing the
/// field's lowercase policy left them in. Markers pass through and break
/// phrases.
pub(crate) fn restrict_to_keywords(units: Vec<Unit>, keywords: &WordList) -> Vec<Unit> {
    let longest = keywords.longest_phrase();
    if longest == 0 {
        return Vec::new();
    }

    let mut kept = Vec::new();
    let mut index = 0;
    while index < units.len() {
        let word = match &units[index] {
            Unit::Marker(_) => {
                kept.push(units[index].clone());
                index += 1;
                continue;
            }
            Unit::Word(word) => word,
        };

        let mut phrase: SmallVec<[String; 4]> = SmallVec::new();
        phrase.push(word.to_lowercase());
        let mut best: Option<usize> = keywords.contains(&phrase[0]).then_some(1);
        for offset in 1..longest {
            let Some(Unit::Word(next)) = units.get(index + offset) else {
                break;
            };
            phrase.push(next.to_lowercase());
            if keywords.contains(&phrase.join(" ")) {
                best = Some(phrase.len());
            }
        }

        match best {
            Some(width) => {
                let words: SmallVec<[&str; 4]> = units[index..index + width]
                    .iter()
                    .filter_map(|unit| match unit {
                        Unit::Word(word) => Some(word.as_str()),
                        Unit::Marker(_) => None,
                    })
                    .collect();
                kept.push(Unit::Word(words.join(KEYWORD_GLUE)));
                index += width;
            }
            None => index += 1,
        }
    }
    kept
}
