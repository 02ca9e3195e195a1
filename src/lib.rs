pub mod challenge;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod generator;
pub mod orchestrator;
pub mod remote;
pub mod session;
pub mod store;

pub use challenge::{
    ChallengeSet, Difficulty, GameVariant, HomophoneChallenge, WordChallenge,
};
pub use error::ContentError;
pub use orchestrator::{ContentOutcome, ContentRequest, ContentSource};
