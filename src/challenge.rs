use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single spell-this-word challenge. Immutable once produced; `word` is the
/// answer key and is compared case-insensitively.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordChallenge {
    pub word: String,
    pub definition: String,
    pub example_sentence: String,
}

/// A pick-the-right-homophone challenge. `options` contains `correct_word`
/// exactly once; display order is fixed at creation and never re-shuffled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomophoneChallenge {
    pub sentence: String,
    pub definition: String,
    pub correct_word: String,
    pub options: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Extreme,
}

pub const ALL_DIFFICULTIES: [Difficulty; 4] = [
    Difficulty::Easy,
    Difficulty::Medium,
    Difficulty::Hard,
    Difficulty::Extreme,
];

impl Difficulty {
    /// Adjacent tiers, used when a pool must be widened to satisfy a request.
    pub fn neighbors(self) -> &'static [Difficulty] {
        match self {
            Difficulty::Easy => &[Difficulty::Medium],
            Difficulty::Medium => &[Difficulty::Easy, Difficulty::Hard],
            Difficulty::Hard => &[Difficulty::Medium, Difficulty::Extreme],
            Difficulty::Extreme => &[Difficulty::Hard],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Extreme => "extreme",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "extreme" => Ok(Difficulty::Extreme),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// The fifteen game modes. Each maps to a content shape and a request count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameVariant {
    Classic,
    Speed,
    Homophone,
    MissingLetter,
    Scramble,
    SentenceSpell,
    Whisper,
    Adventure,
    Boss,
    Daily,
    Multiplayer,
    Wheel,
    SilentLetter,
    Reverse,
    Memory,
}

/// Content shape a variant consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentKind {
    Words,
    Homophones,
}

/// Variants the wheel can land on.
pub const WHEEL_POOL: [GameVariant; 8] = [
    GameVariant::Classic,
    GameVariant::Speed,
    GameVariant::Homophone,
    GameVariant::Scramble,
    GameVariant::MissingLetter,
    GameVariant::Reverse,
    GameVariant::Whisper,
    GameVariant::SilentLetter,
];

impl GameVariant {
    pub fn content_kind(self) -> ContentKind {
        match self {
            GameVariant::Homophone => ContentKind::Homophones,
            _ => ContentKind::Words,
        }
    }

    /// Number of challenges one round of this variant requests.
    pub fn request_count(self) -> usize {
        match self {
            GameVariant::Speed => 15,
            GameVariant::Boss => 10,
            GameVariant::Daily => 1,
            _ => 5,
        }
    }

    /// Category hint passed to the remote service, if any. Adventure rounds
    /// pass the campaign theme.
    pub fn remote_category<'a>(self, theme: Option<&'a str>) -> Option<&'a str> {
        match self {
            GameVariant::Boss => Some("boss"),
            GameVariant::SilentLetter => Some("silent-letter"),
            GameVariant::Adventure => theme,
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameVariant::Classic => "classic",
            GameVariant::Speed => "speed",
            GameVariant::Homophone => "homophone",
            GameVariant::MissingLetter => "missing-letter",
            GameVariant::Scramble => "scramble",
            GameVariant::SentenceSpell => "sentence-spell",
            GameVariant::Whisper => "whisper",
            GameVariant::Adventure => "adventure",
            GameVariant::Boss => "boss",
            GameVariant::Daily => "daily",
            GameVariant::Multiplayer => "multiplayer",
            GameVariant::Wheel => "wheel",
            GameVariant::SilentLetter => "silent-letter",
            GameVariant::Reverse => "reverse",
            GameVariant::Memory => "memory",
        }
    }
}

impl fmt::Display for GameVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "classic" => Ok(GameVariant::Classic),
            "speed" => Ok(GameVariant::Speed),
            "homophone" => Ok(GameVariant::Homophone),
            "missing-letter" => Ok(GameVariant::MissingLetter),
            "scramble" => Ok(GameVariant::Scramble),
            "sentence-spell" => Ok(GameVariant::SentenceSpell),
            "whisper" => Ok(GameVariant::Whisper),
            "adventure" => Ok(GameVariant::Adventure),
            "boss" => Ok(GameVariant::Boss),
            "daily" => Ok(GameVariant::Daily),
            "multiplayer" => Ok(GameVariant::Multiplayer),
            "wheel" => Ok(GameVariant::Wheel),
            "silent-letter" => Ok(GameVariant::SilentLetter),
            "reverse" => Ok(GameVariant::Reverse),
            "memory" => Ok(GameVariant::Memory),
            other => Err(format!("unknown game variant: {other}")),
        }
    }
}

/// One round's worth of content, shaped for the requesting variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChallengeSet {
    Words(Vec<WordChallenge>),
    Homophones(Vec<HomophoneChallenge>),
}

impl ChallengeSet {
    pub fn len(&self) -> usize {
        match self {
            ChallengeSet::Words(w) => w.len(),
            ChallengeSet::Homophones(h) => h.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            ChallengeSet::Words(_) => ContentKind::Words,
            ChallengeSet::Homophones(_) => ContentKind::Homophones,
        }
    }

    /// Answer key for the challenge at `index`.
    pub fn answer(&self, index: usize) -> Option<&str> {
        match self {
            ChallengeSet::Words(w) => w.get(index).map(|c| c.word.as_str()),
            ChallengeSet::Homophones(h) => h.get(index).map(|c| c.correct_word.as_str()),
        }
    }

    /// Shape contract every served set must satisfy: non-empty, all strings
    /// non-empty, no duplicate answer words, and for homophones the options
    /// list contains the answer exactly once with no duplicate entries.
    /// Remote responses failing this are treated as a remote failure.
    pub fn is_valid(&self) -> bool {
        if self.is_empty() {
            return false;
        }
        match self {
            ChallengeSet::Words(words) => {
                let mut seen = std::collections::HashSet::new();
                words.iter().all(|c| {
                    !c.word.trim().is_empty()
                        && !c.definition.trim().is_empty()
                        && !c.example_sentence.trim().is_empty()
                        && seen.insert(c.word.trim().to_lowercase())
                })
            }
            ChallengeSet::Homophones(homophones) => {
                let mut seen = std::collections::HashSet::new();
                homophones.iter().all(|c| {
                    let answer_count = c
                        .options
                        .iter()
                        .filter(|o| o.eq_ignore_ascii_case(&c.correct_word))
                        .count();
                    let mut opts = std::collections::HashSet::new();
                    !c.sentence.trim().is_empty()
                        && !c.correct_word.trim().is_empty()
                        && answer_count == 1
                        && c.options.iter().all(|o| opts.insert(o.to_lowercase()))
                        && seen.insert(c.correct_word.trim().to_lowercase())
                })
            }
        }
    }
}

/// Campaign level. `is_unlocked` and `is_completed` only ever flip to true.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdventureLevel {
    pub id: String,
    pub name: String,
    pub difficulty: Difficulty,
    pub theme: String,
    pub is_unlocked: bool,
    pub is_completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(w: &str) -> WordChallenge {
        WordChallenge {
            word: w.to_string(),
            definition: "a word".to_string(),
            example_sentence: format!("Example with {w}."),
        }
    }

    #[test]
    fn difficulty_is_totally_ordered() {
        assert!(Difficulty::Easy < Difficulty::Medium);
        assert!(Difficulty::Hard < Difficulty::Extreme);
    }

    #[test]
    fn variant_counts_match_policy() {
        assert_eq!(GameVariant::Speed.request_count(), 15);
        assert_eq!(GameVariant::Boss.request_count(), 10);
        assert_eq!(GameVariant::Daily.request_count(), 1);
        assert_eq!(GameVariant::Classic.request_count(), 5);
    }

    #[test]
    fn variant_round_trips_through_str() {
        for v in [
            GameVariant::Classic,
            GameVariant::MissingLetter,
            GameVariant::SilentLetter,
        ] {
            assert_eq!(v.as_str().parse::<GameVariant>().unwrap(), v);
        }
    }

    #[test]
    fn empty_set_is_invalid() {
        assert!(!ChallengeSet::Words(vec![]).is_valid());
    }

    #[test]
    fn duplicate_words_are_invalid() {
        let set = ChallengeSet::Words(vec![word("cat"), word("Cat")]);
        assert!(!set.is_valid());
        let set = ChallengeSet::Words(vec![word("cat"), word("dog")]);
        assert!(set.is_valid());
    }

    #[test]
    fn homophone_options_must_contain_answer_once() {
        let mut ch = HomophoneChallenge {
            sentence: "I can ___ you.".to_string(),
            definition: "perceive sound".to_string(),
            correct_word: "hear".to_string(),
            options: vec!["hear".to_string(), "here".to_string()],
        };
        assert!(ChallengeSet::Homophones(vec![ch.clone()]).is_valid());

        ch.options = vec!["here".to_string()];
        assert!(!ChallengeSet::Homophones(vec![ch.clone()]).is_valid());

        ch.options = vec!["hear".to_string(), "hear".to_string()];
        assert!(!ChallengeSet::Homophones(vec![ch]).is_valid());
    }
}
