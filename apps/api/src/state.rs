use std::sync::Arc;

use crate::llm_client::TextGenerationService;
use crate::matching::corpus::JobCorpus;
use crate::matching::engine::RankingEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Candidate pool source. Postgres when configured, sample postings otherwise.
    pub corpus: Arc<dyn JobCorpus>,
    /// Chat-completion backend for keyword extraction, summaries and emails.
    pub llm: Arc<dyn TextGenerationService>,
    /// Stateless ranking engine; owns the embedding provider.
    pub engine: RankingEngine,
}
