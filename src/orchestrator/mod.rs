//! The single decision point for where content comes from. Tries the remote
//! service unless the app is already offline; a remote failure flips the
//! persistent offline flag (one-way, a human action turns it back off) and
//! retries locally exactly once. Beyond that there is no further fallback.

use chrono::Local;

use crate::challenge::{ChallengeSet, ContentKind, Difficulty, GameVariant};
use crate::engine::mastery::MasteryStore;
use crate::error::ContentError;
use crate::generator::OfflineGenerator;
use crate::remote::RemoteContent;
use crate::store::Storage;
use crate::store::kv::KvStore;

/// One content request, as issued by the session controller.
#[derive(Clone, Debug)]
pub enum ContentRequest {
    Fresh {
        variant: GameVariant,
        difficulty: Difficulty,
        /// Campaign theme, forwarded to the remote service for adventure rounds.
        theme: Option<String>,
    },
    Remedial {
        variant: GameVariant,
        difficulty: Difficulty,
        missed_words: Vec<String>,
    },
}

impl ContentRequest {
    pub fn variant(&self) -> GameVariant {
        match self {
            ContentRequest::Fresh { variant, .. } => *variant,
            ContentRequest::Remedial { variant, .. } => *variant,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        match self {
            ContentRequest::Fresh { difficulty, .. } => *difficulty,
            ContentRequest::Remedial { difficulty, .. } => *difficulty,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentSource {
    Remote,
    Offline,
}

/// Result of a successful request. `switched_offline` is true exactly when
/// this request auto-enabled offline mode, so the UI can notify once.
#[derive(Debug)]
pub struct ContentOutcome {
    pub set: ChallengeSet,
    pub source: ContentSource,
    pub switched_offline: bool,
}

/// Serve one content request. Stateless across calls apart from the persisted
/// offline flag; the session controller serializes requests per session.
pub fn request_content<S, R>(
    storage: &Storage<S>,
    remote: Option<&R>,
    generator: &mut OfflineGenerator,
    mastery: &MasteryStore,
    request: &ContentRequest,
) -> Result<ContentOutcome, ContentError>
where
    S: KvStore,
    R: RemoteContent,
{
    let mut settings = storage.load_settings();
    let mut switched_offline = false;

    if !settings.offline_mode {
        let attempt = remote
            .ok_or_else(|| ContentError::RemoteUnavailable("no remote configured".into()))
            .and_then(|r| fetch_remote(r, request));
        match attempt {
            Ok(set) if set.is_valid() => {
                return Ok(ContentOutcome {
                    set,
                    source: ContentSource::Remote,
                    switched_offline: false,
                });
            }
            // Invalid/empty responses and errors degrade identically: latch
            // offline mode durably, then take the single local retry. A failed
            // persist must not block serving, but it leaves the latch volatile,
            // so it is reported rather than swallowed.
            _ => {
                settings.offline_mode = true;
                if let Err(err) = storage.save_settings(&settings) {
                    eprintln!("warning: offline mode could not be persisted: {err:#}");
                }
                switched_offline = true;
            }
        }
    }

    match generate_local(generator, mastery, request) {
        Ok(set) => Ok(ContentOutcome {
            set,
            source: ContentSource::Offline,
            switched_offline,
        }),
        Err(_) => Err(ContentError::Unavailable),
    }
}

fn fetch_remote<R: RemoteContent>(
    remote: &R,
    request: &ContentRequest,
) -> Result<ChallengeSet, ContentError> {
    match request {
        ContentRequest::Fresh {
            variant,
            difficulty,
            theme,
        } => match variant {
            GameVariant::Homophone => remote
                .homophones(*difficulty, variant.request_count())
                .map(ChallengeSet::Homophones),
            GameVariant::Daily => remote
                .daily_word(*difficulty)
                .map(|w| ChallengeSet::Words(vec![w])),
            _ => remote
                .word_list(
                    *difficulty,
                    variant.request_count(),
                    variant.remote_category(theme.as_deref()),
                )
                .map(ChallengeSet::Words),
        },
        ContentRequest::Remedial {
            variant,
            missed_words,
            ..
        } => match variant.content_kind() {
            ContentKind::Homophones => remote
                .remedial_homophones(missed_words, variant.request_count())
                .map(ChallengeSet::Homophones),
            ContentKind::Words => remote
                .remedial_word_list(missed_words, variant.request_count())
                .map(ChallengeSet::Words),
        },
    }
}

fn generate_local(
    generator: &mut OfflineGenerator,
    mastery: &MasteryStore,
    request: &ContentRequest,
) -> Result<ChallengeSet, ContentError> {
    match request {
        ContentRequest::Fresh {
            variant,
            difficulty,
            ..
        } => match variant {
            GameVariant::Homophone => generator
                .homophones(mastery, *difficulty, variant.request_count())
                .map(ChallengeSet::Homophones),
            GameVariant::Daily => generator
                .daily_word(Local::now().date_naive(), *difficulty)
                .map(|w| ChallengeSet::Words(vec![w])),
            // Boss rounds always draw from the deepest tier offline
            GameVariant::Boss => generator
                .word_list(mastery, Difficulty::Extreme, variant.request_count(), None)
                .map(ChallengeSet::Words),
            GameVariant::SilentLetter => generator
                .word_list(
                    mastery,
                    *difficulty,
                    variant.request_count(),
                    Some("silent-letter"),
                )
                .map(ChallengeSet::Words),
            _ => generator
                .word_list(mastery, *difficulty, variant.request_count(), None)
                .map(ChallengeSet::Words),
        },
        ContentRequest::Remedial {
            variant,
            difficulty,
            missed_words,
        } => match variant.content_kind() {
            ContentKind::Homophones => generator
                .remedial_homophones(
                    mastery,
                    missed_words,
                    variant.request_count(),
                    *difficulty,
                )
                .map(ChallengeSet::Homophones),
            ContentKind::Words => generator
                .remedial_word_list(
                    mastery,
                    missed_words,
                    variant.request_count(),
                    *difficulty,
                )
                .map(ChallengeSet::Words),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use crate::challenge::{HomophoneChallenge, WordChallenge};
    use crate::corpus::Corpus;
    use crate::store::kv::MemoryStore;

    /// Remote stub scripted per test.
    struct StubRemote {
        fail: bool,
        empty: bool,
        calls: std::cell::Cell<u32>,
    }

    impl StubRemote {
        fn ok() -> Self {
            Self {
                fail: false,
                empty: false,
                calls: std::cell::Cell::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                empty: false,
                calls: std::cell::Cell::new(0),
            }
        }

        fn empty() -> Self {
            Self {
                fail: false,
                empty: true,
                calls: std::cell::Cell::new(0),
            }
        }

        fn respond(&self, count: usize) -> Result<Vec<WordChallenge>, ContentError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(ContentError::RemoteUnavailable("stub outage".into()));
            }
            if self.empty {
                return Ok(vec![]);
            }
            Ok((0..count)
                .map(|i| WordChallenge {
                    word: format!("remote{i}"),
                    definition: "remote definition".into(),
                    example_sentence: "Remote example.".into(),
                })
                .collect())
        }
    }

    impl RemoteContent for StubRemote {
        fn word_list(
            &self,
            _difficulty: Difficulty,
            count: usize,
            _category: Option<&str>,
        ) -> Result<Vec<WordChallenge>, ContentError> {
            self.respond(count)
        }

        fn homophones(
            &self,
            _difficulty: Difficulty,
            _count: usize,
        ) -> Result<Vec<HomophoneChallenge>, ContentError> {
            self.calls.set(self.calls.get() + 1);
            Err(ContentError::RemoteUnavailable("stub outage".into()))
        }

        fn remedial_word_list(
            &self,
            _missed_words: &[String],
            count: usize,
        ) -> Result<Vec<WordChallenge>, ContentError> {
            self.respond(count)
        }

        fn remedial_homophones(
            &self,
            _missed_words: &[String],
            _count: usize,
        ) -> Result<Vec<HomophoneChallenge>, ContentError> {
            self.calls.set(self.calls.get() + 1);
            Err(ContentError::RemoteUnavailable("stub outage".into()))
        }

        fn daily_word(&self, _difficulty: Difficulty) -> Result<WordChallenge, ContentError> {
            self.respond(1).map(|mut v| v.remove(0))
        }
    }

    fn classic_request() -> ContentRequest {
        ContentRequest::Fresh {
            variant: GameVariant::Classic,
            difficulty: Difficulty::Easy,
            theme: None,
        }
    }

    fn generator() -> OfflineGenerator {
        OfflineGenerator::with_rng(Corpus::load(), SmallRng::seed_from_u64(5))
    }

    #[test]
    fn healthy_remote_serves_online() {
        let storage = Storage::new(MemoryStore::default());
        let remote = StubRemote::ok();
        let mut g = generator();
        let mastery = MasteryStore::default();

        let outcome =
            request_content(&storage, Some(&remote), &mut g, &mastery, &classic_request())
                .unwrap();
        assert_eq!(outcome.source, ContentSource::Remote);
        assert!(!outcome.switched_offline);
        assert!(!storage.load_settings().offline_mode);
    }

    #[test]
    fn remote_failure_latches_offline_and_serves_locally() {
        let storage = Storage::new(MemoryStore::default());
        let remote = StubRemote::failing();
        let mut g = generator();
        let mastery = MasteryStore::default();

        let outcome =
            request_content(&storage, Some(&remote), &mut g, &mastery, &classic_request())
                .unwrap();
        assert_eq!(outcome.source, ContentSource::Offline);
        assert!(outcome.switched_offline);
        assert_eq!(outcome.set.len(), 5);
        assert!(storage.load_settings().offline_mode);
    }

    #[test]
    fn latched_offline_mode_skips_remote_entirely() {
        let storage = Storage::new(MemoryStore::default());
        let failing = StubRemote::failing();
        let mut g = generator();
        let mastery = MasteryStore::default();

        request_content(&storage, Some(&failing), &mut g, &mastery, &classic_request())
            .unwrap();
        assert_eq!(failing.calls.get(), 1);

        // Remote is healthy now, but the latch holds: it must not be called
        let healthy = StubRemote::ok();
        let outcome =
            request_content(&storage, Some(&healthy), &mut g, &mastery, &classic_request())
                .unwrap();
        assert_eq!(healthy.calls.get(), 0);
        assert_eq!(outcome.source, ContentSource::Offline);
        assert!(!outcome.switched_offline);
    }

    /// Store whose writes always fail, for exercising the latch-persist path.
    struct ReadOnlyStore;

    impl crate::store::kv::KvStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("store is read-only"))
        }

        fn remove(&self, _key: &str) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("store is read-only"))
        }
    }

    #[test]
    fn failed_latch_persist_still_serves_offline() {
        let storage = Storage::new(ReadOnlyStore);
        let remote = StubRemote::failing();
        let mut g = generator();
        let mastery = MasteryStore::default();

        let outcome =
            request_content(&storage, Some(&remote), &mut g, &mastery, &classic_request())
                .unwrap();
        assert_eq!(outcome.source, ContentSource::Offline);
        assert!(outcome.switched_offline);
        assert_eq!(outcome.set.len(), 5);
    }

    #[test]
    fn empty_remote_response_counts_as_failure() {
        let storage = Storage::new(MemoryStore::default());
        let remote = StubRemote::empty();
        let mut g = generator();
        let mastery = MasteryStore::default();

        let outcome =
            request_content(&storage, Some(&remote), &mut g, &mastery, &classic_request())
                .unwrap();
        assert_eq!(outcome.source, ContentSource::Offline);
        assert!(storage.load_settings().offline_mode);
    }

    #[test]
    fn total_failure_surfaces_unavailable() {
        let storage = Storage::new(MemoryStore::default());
        let remote = StubRemote::failing();
        let mut g = OfflineGenerator::with_rng(Corpus::empty(), SmallRng::seed_from_u64(1));
        let mastery = MasteryStore::default();

        let err =
            request_content(&storage, Some(&remote), &mut g, &mastery, &classic_request())
                .unwrap_err();
        assert!(matches!(err, ContentError::Unavailable));
    }

    #[test]
    fn boss_round_draws_from_the_extreme_tier_offline() {
        let storage = Storage::new(MemoryStore::default());
        let mut settings = storage.load_settings();
        settings.offline_mode = true;
        storage.save_settings(&settings).unwrap();

        let mut g = generator();
        let mastery = MasteryStore::default();
        let request = ContentRequest::Fresh {
            variant: GameVariant::Boss,
            difficulty: Difficulty::Easy,
            theme: None,
        };
        let outcome = request_content(
            &storage,
            None::<&StubRemote>,
            &mut g,
            &mastery,
            &request,
        )
        .unwrap();
        assert_eq!(outcome.set.len(), 10);

        let extreme_words: std::collections::HashSet<String> = Corpus::load()
            .bucket(Difficulty::Extreme)
            .iter()
            .map(|e| e.word.clone())
            .collect();
        if let ChallengeSet::Words(words) = &outcome.set {
            assert!(words.iter().all(|w| extreme_words.contains(&w.word)));
        } else {
            panic!("boss round must produce words");
        }
    }

    #[test]
    fn remedial_request_falls_back_like_fresh_ones() {
        let storage = Storage::new(MemoryStore::default());
        let remote = StubRemote::failing();
        let mut g = generator();
        let mastery = MasteryStore::default();

        let request = ContentRequest::Remedial {
            variant: GameVariant::Classic,
            difficulty: Difficulty::Easy,
            missed_words: vec!["knee".into()],
        };
        let outcome =
            request_content(&storage, Some(&remote), &mut g, &mastery, &request).unwrap();
        assert!(outcome.switched_offline);
        if let ChallengeSet::Words(words) = &outcome.set {
            assert!(words.iter().any(|w| w.word == "knee"));
        } else {
            panic!("expected words");
        }
    }
}
