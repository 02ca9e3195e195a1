use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Selection weight floor. Fully mastered words keep a small nonzero weight so
/// the candidate pool is never starved.
pub const MIN_SELECTION_WEIGHT: f64 = 0.05;

/// Per-word performance record, keyed by the normalized word. Created on first
/// track call, updated forever after, never deleted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MasteryRecord {
    pub word: String,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub last_seen: DateTime<Utc>,
}

impl MasteryRecord {
    /// Running correct ratio in [0, 1].
    pub fn score(&self) -> f64 {
        let total = self.correct_count + self.incorrect_count;
        if total == 0 {
            0.0
        } else {
            f64::from(self.correct_count) / f64::from(total)
        }
    }
}

/// Process-wide per-word mastery model. Single writer; callers persist the
/// whole store after each update so a crash never leaves a half-written record.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MasteryStore {
    pub records: HashMap<String, MasteryRecord>,
}

pub fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

impl MasteryStore {
    /// Record one attempt. Never fails.
    pub fn track(&mut self, word: &str, was_correct: bool) {
        let key = normalize(word);
        if key.is_empty() {
            return;
        }
        let record = self.records.entry(key.clone()).or_insert(MasteryRecord {
            word: key,
            correct_count: 0,
            incorrect_count: 0,
            last_seen: Utc::now(),
        });
        if was_correct {
            record.correct_count += 1;
        } else {
            record.incorrect_count += 1;
        }
        record.last_seen = Utc::now();
    }

    /// Mastery score for a word; `None` when the word has never been seen.
    pub fn score(&self, word: &str) -> Option<f64> {
        self.records.get(&normalize(word)).map(MasteryRecord::score)
    }

    /// Sampling weight: 1 − score, with unseen words at the maximum and a
    /// positive floor for mastered words.
    pub fn selection_weight(&self, word: &str) -> f64 {
        let weight = 1.0 - self.score(word).unwrap_or(0.0);
        weight.max(MIN_SELECTION_WEIGHT)
    }

    /// Least-mastered words first; ties broken by most recently seen, so a
    /// word missed five minutes ago surfaces before one untouched for a month.
    pub fn weak_words(&self, limit: usize) -> Vec<String> {
        let mut records: Vec<&MasteryRecord> = self.records.values().collect();
        records.sort_by(|a, b| {
            a.score()
                .partial_cmp(&b.score())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.last_seen.cmp(&a.last_seen))
        });
        records.truncate(limit);
        records.into_iter().map(|r| r.word.clone()).collect()
    }
}
