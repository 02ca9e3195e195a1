use crate::challenge::{Difficulty, HomophoneChallenge, WordChallenge};
use crate::error::ContentError;

/// Contract of the remote generation service. The service is opaque: any
/// failure (network, rate limit, malformed response) is equivalent and
/// surfaces as `RemoteUnavailable`.
pub trait RemoteContent {
    fn word_list(
        &self,
        difficulty: Difficulty,
        count: usize,
        category: Option<&str>,
    ) -> Result<Vec<WordChallenge>, ContentError>;

    fn homophones(
        &self,
        difficulty: Difficulty,
        count: usize,
    ) -> Result<Vec<HomophoneChallenge>, ContentError>;

    fn remedial_word_list(
        &self,
        missed_words: &[String],
        count: usize,
    ) -> Result<Vec<WordChallenge>, ContentError>;

    fn remedial_homophones(
        &self,
        missed_words: &[String],
        count: usize,
    ) -> Result<Vec<HomophoneChallenge>, ContentError>;

    fn daily_word(&self, difficulty: Difficulty) -> Result<WordChallenge, ContentError>;
}

#[cfg(feature = "network")]
pub use http::HttpRemote;

#[cfg(feature = "network")]
mod http {
    use std::time::Duration;

    use serde::Serialize;
    use serde::de::DeserializeOwned;

    use super::RemoteContent;
    use crate::challenge::{Difficulty, HomophoneChallenge, WordChallenge};
    use crate::error::ContentError;

    /// Unanswered requests count as failures; the orchestrator then falls
    /// back, so the wait here must be bounded.
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct GenerateBody<'a> {
        #[serde(skip_serializing_if = "Option::is_none")]
        difficulty: Option<Difficulty>,
        #[serde(skip_serializing_if = "Option::is_none")]
        count: Option<usize>,
        #[serde(skip_serializing_if = "Option::is_none")]
        category: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        missed_words: Option<&'a [String]>,
    }

    /// HTTP client for the generation service.
    pub struct HttpRemote {
        client: reqwest::blocking::Client,
        base_url: String,
    }

    impl HttpRemote {
        pub fn new(base_url: &str) -> Result<Self, ContentError> {
            let client = reqwest::blocking::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .map_err(|e| ContentError::RemoteUnavailable(e.to_string()))?;
            Ok(Self {
                client,
                base_url: base_url.trim_end_matches('/').to_string(),
            })
        }

        fn post<T: DeserializeOwned>(
            &self,
            path: &str,
            body: &GenerateBody<'_>,
        ) -> Result<T, ContentError> {
            let url = format!("{}/{path}", self.base_url);
            let response = self
                .client
                .post(&url)
                .json(body)
                .send()
                .map_err(|e| ContentError::RemoteUnavailable(e.to_string()))?;
            if !response.status().is_success() {
                return Err(ContentError::RemoteUnavailable(format!(
                    "{url} returned {}",
                    response.status()
                )));
            }
            response
                .json()
                .map_err(|e| ContentError::RemoteUnavailable(e.to_string()))
        }
    }

    impl RemoteContent for HttpRemote {
        fn word_list(
            &self,
            difficulty: Difficulty,
            count: usize,
            category: Option<&str>,
        ) -> Result<Vec<WordChallenge>, ContentError> {
            self.post(
                "generate/words",
                &GenerateBody {
                    difficulty: Some(difficulty),
                    count: Some(count),
                    category,
                    missed_words: None,
                },
            )
        }

        fn homophones(
            &self,
            difficulty: Difficulty,
            count: usize,
        ) -> Result<Vec<HomophoneChallenge>, ContentError> {
            self.post(
                "generate/homophones",
                &GenerateBody {
                    difficulty: Some(difficulty),
                    count: Some(count),
                    category: None,
                    missed_words: None,
                },
            )
        }

        fn remedial_word_list(
            &self,
            missed_words: &[String],
            count: usize,
        ) -> Result<Vec<WordChallenge>, ContentError> {
            self.post(
                "generate/remedial-words",
                &GenerateBody {
                    difficulty: None,
                    count: Some(count),
                    category: None,
                    missed_words: Some(missed_words),
                },
            )
        }

        fn remedial_homophones(
            &self,
            missed_words: &[String],
            count: usize,
        ) -> Result<Vec<HomophoneChallenge>, ContentError> {
            self.post(
                "generate/remedial-homophones",
                &GenerateBody {
                    difficulty: None,
                    count: Some(count),
                    category: None,
                    missed_words: Some(missed_words),
                },
            )
        }

        fn daily_word(&self, difficulty: Difficulty) -> Result<WordChallenge, ContentError> {
            self.post(
                "generate/daily",
                &GenerateBody {
                    difficulty: Some(difficulty),
                    count: None,
                    category: None,
                    missed_words: None,
                },
            )
        }
    }
}
