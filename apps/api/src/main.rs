mod config;
mod errors;
mod llm_client;
mod matching;
mod resume;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::matching::corpus::{JobCorpus, PgJobCorpus, StaticJobCorpus};
use crate::matching::embedding::EmbeddingProvider;
use crate::matching::engine::RankingEngine;
use crate::matching::vocabulary::Vocabulary;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on present-but-invalid env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SwipedIn API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(&config)?;
    info!("LLM client initialized (model: {})", llm.chat_model());

    // Embedding service is optional; without a key every vector is the local hash embedding
    let embeddings = if llm.embeddings_configured() {
        info!("Embedding service configured (model: {})", config.embedding_model);
        EmbeddingProvider::new(Arc::new(llm.clone()), config.external_timeout)
    } else {
        warn!("OPENAI_API_KEY not set; using fallback hash embeddings");
        EmbeddingProvider::fallback_only()
    };

    let engine = RankingEngine::new(Vocabulary::DEFAULT, embeddings);
    info!("Ranking engine ready ({} vocabulary terms)", engine.vocabulary().len());

    let corpus = build_corpus(&config).await;

    // Build app state
    let state = AppState {
        corpus,
        llm: Arc::new(llm),
        engine,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Postgres-backed corpus when DATABASE_URL is set and reachable, sample postings otherwise.
async fn build_corpus(config: &Config) -> Arc<dyn JobCorpus> {
    let Some(url) = &config.database_url else {
        warn!("DATABASE_URL not set; serving the built-in sample jobs");
        return Arc::new(StaticJobCorpus::sample());
    };

    match PgJobCorpus::connect(url, config.job_tables.clone(), config.external_timeout).await {
        Ok(corpus) => {
            info!("Job tables: {}", config.job_tables.join(", "));
            Arc::new(corpus)
        }
        Err(e) => {
            warn!("PostgreSQL unavailable ({e}); serving the built-in sample jobs");
            Arc::new(StaticJobCorpus::sample())
        }
    }
}
