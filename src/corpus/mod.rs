use std::collections::HashMap;

use serde::Deserialize;

use crate::challenge::{ALL_DIFFICULTIES, Difficulty, WordChallenge};

const WORDS_JSON: &str = include_str!("../../assets/corpus.json");
const HOMOPHONES_JSON: &str = include_str!("../../assets/homophones.json");

/// One dictionary entry. Entries are read-only at runtime; categories tag
/// thematic subsets such as "silent-letter".
#[derive(Clone, Debug, Deserialize)]
pub struct CorpusEntry {
    pub word: String,
    pub definition: String,
    pub example: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl CorpusEntry {
    pub fn challenge(&self) -> WordChallenge {
        WordChallenge {
            word: self.word.clone(),
            definition: self.definition.clone(),
            example_sentence: self.example.clone(),
        }
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c.eq_ignore_ascii_case(category))
    }
}

/// One homophone set. `correct_word` is the answer; `distractors` become the
/// remaining options when a challenge is built.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomophoneEntry {
    pub sentence: String,
    pub definition: String,
    pub correct_word: String,
    pub distractors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BucketFile<T> {
    #[serde(default = "Vec::new")]
    easy: Vec<T>,
    #[serde(default = "Vec::new")]
    medium: Vec<T>,
    #[serde(default = "Vec::new")]
    hard: Vec<T>,
    #[serde(default = "Vec::new")]
    extreme: Vec<T>,
}

impl<T> Default for BucketFile<T> {
    fn default() -> Self {
        Self {
            easy: Vec::new(),
            medium: Vec::new(),
            hard: Vec::new(),
            extreme: Vec::new(),
        }
    }
}

impl<T> BucketFile<T> {
    fn into_map(self) -> HashMap<Difficulty, Vec<T>> {
        HashMap::from([
            (Difficulty::Easy, self.easy),
            (Difficulty::Medium, self.medium),
            (Difficulty::Hard, self.hard),
            (Difficulty::Extreme, self.extreme),
        ])
    }
}

/// The bundled offline dictionary, bucketed by difficulty. Every bucket holds
/// enough distinct entries to satisfy the largest single request (15).
pub struct Corpus {
    words: HashMap<Difficulty, Vec<CorpusEntry>>,
    homophones: HashMap<Difficulty, Vec<HomophoneEntry>>,
}

impl Corpus {
    pub fn load() -> Self {
        let words: BucketFile<CorpusEntry> =
            serde_json::from_str(WORDS_JSON).unwrap_or_default();
        let homophones: BucketFile<HomophoneEntry> =
            serde_json::from_str(HOMOPHONES_JSON).unwrap_or_default();
        Self {
            words: words.into_map(),
            homophones: homophones.into_map(),
        }
    }

    /// Empty corpus, for exercising exhaustion paths in tests.
    pub fn empty() -> Self {
        Self {
            words: BucketFile::default().into_map(),
            homophones: BucketFile::default().into_map(),
        }
    }

    pub fn bucket(&self, difficulty: Difficulty) -> &[CorpusEntry] {
        self.words.get(&difficulty).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn homophone_bucket(&self, difficulty: Difficulty) -> &[HomophoneEntry] {
        self.homophones
            .get(&difficulty)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Candidate pool for a difficulty, optionally restricted to a category.
    pub fn pool(&self, difficulty: Difficulty, category: Option<&str>) -> Vec<&CorpusEntry> {
        self.bucket(difficulty)
            .iter()
            .filter(|e| category.is_none_or(|c| e.has_category(c)))
            .collect()
    }

    /// Case-insensitive lookup across all buckets, easiest tier first.
    pub fn find_word(&self, word: &str) -> Option<&CorpusEntry> {
        let needle = word.trim().to_lowercase();
        ALL_DIFFICULTIES
            .iter()
            .flat_map(|d| self.bucket(*d))
            .find(|e| e.word.to_lowercase() == needle)
    }
}
