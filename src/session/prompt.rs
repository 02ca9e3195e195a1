//! Cosmetic prompt transforms. These shape how a challenge is shown, not what
//! the answer is, so the only contract is fairness (and, for scramble, "not
//! the original ordering").

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

const MASK_RATIO: f64 = 0.4;

/// Uppercased letters of `word` in shuffled order. If the shuffle lands on the
/// original ordering the reversal is used instead, so the player always gets
/// something to unscramble.
pub fn scramble_word<R: Rng>(rng: &mut R, word: &str) -> String {
    let original: String = word.to_uppercase();
    let mut chars: Vec<char> = original.chars().collect();
    if chars.len() < 2 {
        return original;
    }
    chars.shuffle(rng);
    let shuffled: String = chars.iter().collect();
    if shuffled == original {
        original.chars().rev().collect()
    } else {
        shuffled
    }
}

/// Replace ~40% of the letters (at least one) with underscores, preserving
/// case and position of the rest.
pub fn mask_word<R: Rng>(rng: &mut R, word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    let num_to_hide = ((chars.len() as f64 * MASK_RATIO) as usize).max(1);
    let mut hidden: HashSet<usize> = HashSet::new();
    while hidden.len() < num_to_hide.min(chars.len()) {
        hidden.insert(rng.gen_range(0..chars.len()));
    }
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if hidden.contains(&i) { '_' } else { *c })
        .collect()
}

/// Blank out every case-insensitive occurrence of `word` in `sentence`,
/// keeping the original length visible as underscores. Used when a sentence
/// would otherwise spell the answer out. Matching is per-char so case folds
/// that change byte length (e.g. `İ`) cannot misalign the output.
pub fn blank_word(sentence: &str, word: &str) -> String {
    let needle: Vec<char> = word.chars().collect();
    if needle.is_empty() {
        return sentence.to_string();
    }
    let chars: Vec<char> = sentence.chars().collect();
    let mut result = String::with_capacity(sentence.len());
    let mut i = 0;
    while i < chars.len() {
        let hit = i + needle.len() <= chars.len()
            && chars[i..i + needle.len()]
                .iter()
                .zip(&needle)
                .all(|(a, b)| a.to_lowercase().eq(b.to_lowercase()));
        if hit {
            result.push_str(&"_".repeat(needle.len()));
            i += needle.len();
        } else {
            result.push(chars[i]);
            i += 1;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn scramble_never_returns_the_original_ordering() {
        let mut rng = SmallRng::seed_from_u64(0);
        for _ in 0..200 {
            let scrambled = scramble_word(&mut rng, "castle");
            assert_ne!(scrambled, "CASTLE");
            let mut sorted: Vec<char> = scrambled.chars().collect();
            sorted.sort_unstable();
            assert_eq!(sorted, vec!['A', 'C', 'E', 'L', 'S', 'T']);
        }
    }

    #[test]
    fn mask_hides_at_least_one_letter() {
        let mut rng = SmallRng::seed_from_u64(1);
        let masked = mask_word(&mut rng, "cat");
        assert_eq!(masked.chars().count(), 3);
        assert!(masked.contains('_'));
    }

    #[test]
    fn mask_hides_about_forty_percent() {
        let mut rng = SmallRng::seed_from_u64(2);
        let masked = mask_word(&mut rng, "temperature");
        let hidden = masked.chars().filter(|c| *c == '_').count();
        assert_eq!(hidden, 4); // 11 letters * 0.4, truncated
    }

    #[test]
    fn blank_word_is_case_insensitive() {
        let blanked = blank_word("The Knight rode out. A knight!", "knight");
        assert_eq!(blanked, "The ______ rode out. A ______!");
    }

    #[test]
    fn blank_word_leaves_other_text_alone() {
        assert_eq!(blank_word("No match here.", "zebra"), "No match here.");
    }

    #[test]
    fn blank_word_survives_multibyte_case_folds() {
        // 'İ' lowercases to two chars (three bytes); byte-offset matching
        // against the lowercased sentence would slice mid-char here
        assert_eq!(blank_word("İstanbul is lovely", "is"), "İstanbul __ lovely");
        assert_eq!(blank_word("STRASSE und Straße", "straße"), "STRASSE und ______");
    }
}
