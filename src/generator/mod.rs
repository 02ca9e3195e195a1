use std::collections::HashSet;

use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::challenge::{Difficulty, HomophoneChallenge, WordChallenge};
use crate::corpus::{Corpus, CorpusEntry, HomophoneEntry};
use crate::engine::mastery::{MasteryStore, normalize};
use crate::engine::selection::sample_weighted;
use crate::error::ContentError;

/// Produces challenge sets from the bundled corpus with the same shape
/// contract as the remote service. Selection is weighted by the mastery model
/// so under-practiced words surface more often. All operations are pure CPU
/// work; nothing here touches the network or disk.
pub struct OfflineGenerator {
    corpus: Corpus,
    rng: SmallRng,
}

impl OfflineGenerator {
    pub fn new(corpus: Corpus) -> Self {
        Self::with_rng(corpus, SmallRng::from_entropy())
    }

    pub fn with_rng(corpus: Corpus, rng: SmallRng) -> Self {
        Self { corpus, rng }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// `count` distinct words for a difficulty, optionally category-filtered.
    /// Recovers once before failing: drop the category filter, then widen to
    /// adjacent tiers.
    pub fn word_list(
        &mut self,
        mastery: &MasteryStore,
        difficulty: Difficulty,
        count: usize,
        category: Option<&str>,
    ) -> Result<Vec<WordChallenge>, ContentError> {
        let entries = self.widened_pool(difficulty, count, category)?;
        let pool: Vec<(WordChallenge, f64)> = entries
            .iter()
            .map(|e| (e.challenge(), mastery.selection_weight(&e.word)))
            .collect();
        Ok(sample_weighted(&mut self.rng, pool, count))
    }

    /// Re-targets previously missed words: corpus matches first, remainder
    /// filled by weighted sampling from the given tier. Never duplicates; may
    /// come up short of `count` but never returns an empty set.
    pub fn remedial_word_list(
        &mut self,
        mastery: &MasteryStore,
        missed_words: &[String],
        count: usize,
        difficulty: Difficulty,
    ) -> Result<Vec<WordChallenge>, ContentError> {
        let mut result: Vec<WordChallenge> = Vec::new();
        let mut used: HashSet<String> = HashSet::new();

        for missed in missed_words {
            if result.len() >= count {
                break;
            }
            let key = normalize(missed);
            if key.is_empty() || used.contains(&key) {
                continue;
            }
            if let Some(entry) = self.corpus.find_word(&key) {
                used.insert(key);
                result.push(entry.challenge());
            }
        }

        if result.len() < count {
            let remainder = count - result.len();
            let fill: Vec<(WordChallenge, f64)> = self
                .corpus
                .bucket(difficulty)
                .iter()
                .filter(|e| !used.contains(&normalize(&e.word)))
                .map(|e| (e.challenge(), mastery.selection_weight(&e.word)))
                .collect();
            result.extend(sample_weighted(&mut self.rng, fill, remainder));
        }

        if result.is_empty() {
            return Err(ContentError::InsufficientCorpus {
                needed: count,
                available: 0,
            });
        }
        Ok(result)
    }

    /// `count` distinct homophone challenges. Options are built once as the
    /// answer plus its distractors and shuffled exactly once here; the order
    /// is stable from then on.
    pub fn homophones(
        &mut self,
        mastery: &MasteryStore,
        difficulty: Difficulty,
        count: usize,
    ) -> Result<Vec<HomophoneChallenge>, ContentError> {
        let entries = self.widened_homophone_pool(difficulty, count)?;
        let pool: Vec<(HomophoneEntry, f64)> = entries
            .into_iter()
            .map(|e| {
                let weight = mastery.selection_weight(&e.correct_word);
                (e, weight)
            })
            .collect();
        let picked = sample_weighted(&mut self.rng, pool, count);
        Ok(picked.into_iter().map(|e| self.build_homophone(&e)).collect())
    }

    /// Homophone sets whose answers match missed words come first, remainder
    /// filled from the requested tier.
    pub fn remedial_homophones(
        &mut self,
        mastery: &MasteryStore,
        missed_words: &[String],
        count: usize,
        difficulty: Difficulty,
    ) -> Result<Vec<HomophoneChallenge>, ContentError> {
        let missed: HashSet<String> = missed_words.iter().map(|w| normalize(w)).collect();
        let entries = self.widened_homophone_pool(difficulty, count)?;

        let mut matched: Vec<HomophoneEntry> = Vec::new();
        let mut rest: Vec<(HomophoneEntry, f64)> = Vec::new();
        for entry in entries {
            if missed.contains(&normalize(&entry.correct_word)) {
                matched.push(entry);
            } else {
                let weight = mastery.selection_weight(&entry.correct_word);
                rest.push((entry, weight));
            }
        }
        matched.truncate(count);
        if matched.len() < count {
            let fill = sample_weighted(&mut self.rng, rest, count - matched.len());
            matched.extend(fill);
        }
        Ok(matched.iter().map(|e| self.build_homophone(e)).collect())
    }

    /// The word of the day: a pure function of (date, difficulty), so every
    /// device lands on the same word. Hash of the date string, not random().
    pub fn daily_word(
        &self,
        date: NaiveDate,
        difficulty: Difficulty,
    ) -> Result<WordChallenge, ContentError> {
        let bucket = self.corpus.bucket(difficulty);
        if bucket.is_empty() {
            return Err(ContentError::InsufficientCorpus {
                needed: 1,
                available: 0,
            });
        }
        let key = format!("{date}#{difficulty}");
        let idx = (fnv1a(&key) % bucket.len() as u64) as usize;
        Ok(bucket[idx].challenge())
    }

    fn build_homophone(&mut self, entry: &HomophoneEntry) -> HomophoneChallenge {
        let mut options: Vec<String> = Vec::with_capacity(entry.distractors.len() + 1);
        options.push(entry.correct_word.clone());
        options.extend(entry.distractors.iter().cloned());
        options.shuffle(&mut self.rng);
        HomophoneChallenge {
            sentence: entry.sentence.clone(),
            definition: entry.definition.clone(),
            correct_word: entry.correct_word.clone(),
            options,
        }
    }

    /// Candidate pool with one level of recovery: exact pool, then without the
    /// category filter, then with adjacent tiers appended (deduplicated).
    fn widened_pool(
        &self,
        difficulty: Difficulty,
        count: usize,
        category: Option<&str>,
    ) -> Result<Vec<CorpusEntry>, ContentError> {
        let mut pool: Vec<CorpusEntry> = self
            .corpus
            .pool(difficulty, category)
            .into_iter()
            .cloned()
            .collect();

        if pool.len() < count && category.is_some() {
            pool = self.corpus.bucket(difficulty).to_vec();
        }

        if pool.len() < count {
            let mut seen: HashSet<String> =
                pool.iter().map(|e| e.word.to_lowercase()).collect();
            for neighbor in difficulty.neighbors() {
                for entry in self.corpus.bucket(*neighbor) {
                    if seen.insert(entry.word.to_lowercase()) {
                        pool.push(entry.clone());
                    }
                }
            }
        }

        if pool.len() < count {
            return Err(ContentError::InsufficientCorpus {
                needed: count,
                available: pool.len(),
            });
        }
        Ok(pool)
    }

    fn widened_homophone_pool(
        &self,
        difficulty: Difficulty,
        count: usize,
    ) -> Result<Vec<HomophoneEntry>, ContentError> {
        let mut pool: Vec<HomophoneEntry> = self.corpus.homophone_bucket(difficulty).to_vec();
        if pool.len() < count {
            let mut seen: HashSet<String> =
                pool.iter().map(|e| e.correct_word.to_lowercase()).collect();
            for neighbor in difficulty.neighbors() {
                for entry in self.corpus.homophone_bucket(*neighbor) {
                    if seen.insert(entry.correct_word.to_lowercase()) {
                        pool.push(entry.clone());
                    }
                }
            }
        }
        if pool.len() < count {
            return Err(ContentError::InsufficientCorpus {
                needed: count,
                available: pool.len(),
            });
        }
        Ok(pool)
    }
}

/// FNV-1a. Inlined because the daily word must hash identically on every
/// device and release; std's DefaultHasher makes no such promise.
fn fnv1a(input: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET;
    for byte in input.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
