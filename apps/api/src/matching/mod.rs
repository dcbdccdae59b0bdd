//! Job recommendation engine.
//!
//! Turns a résumé representation (free text, a keyword set, or an embedding)
//! plus a candidate pool of postings into a ranked, scored shortlist.
//! The engine itself performs no I/O; loading the pool and talking to
//! external models happen behind the `JobCorpus`, `TextGenerationService`
//! and `EmbeddingService` traits.

use thiserror::Error;

use crate::llm_client::LlmError;

pub mod corpus;
pub mod embedding;
pub mod engine;
pub mod handlers;
pub mod job;
pub mod keywords;
pub mod normalize;
pub mod prompts;
pub mod vocabulary;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("embedding dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
}

impl From<LlmError> for MatchError {
    fn from(err: LlmError) -> Self {
        if err.is_malformed() {
            MatchError::MalformedResponse(err.to_string())
        } else {
            MatchError::ServiceUnavailable(err.to_string())
        }
    }
}
