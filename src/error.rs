use thiserror::Error;

/// Failures on the content path. Remote errors are converted into the offline
/// fallback by the orchestrator and only `Unavailable` reaches the session.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("remote generation service unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("offline corpus exhausted: needed {needed} entries, pool has {available}")]
    InsufficientCorpus { needed: usize, available: usize },

    #[error("content unavailable: remote and offline generation both failed")]
    Unavailable,
}
