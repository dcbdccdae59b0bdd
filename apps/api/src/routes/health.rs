use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    /// Where candidate pools are loaded from (table names, or `sample`).
    pub job_sources: Vec<String>,
    /// False when every embedding is the local hash fallback.
    pub embedding_service: bool,
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        service: "swipedin-api",
        version: env!("CARGO_PKG_VERSION"),
        job_sources: state.corpus.sources(),
        embedding_service: state.engine.embeddings().has_service(),
    })
}
