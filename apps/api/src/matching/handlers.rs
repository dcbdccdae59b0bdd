//! Axum route handlers for recommendations, swipe scenarios and vector matching.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::matching::embedding::EmbeddingSource;
use crate::matching::engine::{ScoredCandidate, ScoringStrategy};
use crate::matching::job::JobPosting;
use crate::matching::keywords::{extract_keywords, keywords_as_query, KeywordSource};
use crate::state::AppState;

const RECOMMENDATION_POOL_LIMIT: usize = 50;
const SCENARIO_POOL_LIMIT: usize = 100;
const VECTOR_POOL_LIMIT: usize = 1000;
const DEFAULT_TOP_K: usize = 10;
const DEFAULT_SCENARIO_TOP_K: usize = 50;
const DEFAULT_JOB_LIST_LIMIT: usize = 20;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ResumeRankingRequest {
    #[serde(default)]
    pub resume: String,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<ScoredCandidate>,
    pub keywords: Vec<String>,
    pub keyword_source: KeywordSource,
}

#[derive(Debug, Serialize)]
pub struct ScenarioOption {
    pub text: &'static str,
    pub id: Value,
}

/// One swipe card: decline on the left, accept on the right.
#[derive(Debug, Serialize)]
pub struct ScenarioCard {
    pub situation: String,
    pub option_a: ScenarioOption,
    pub option_b: ScenarioOption,
    pub score: f64,
    pub rank: usize,
}

#[derive(Debug, Serialize)]
pub struct ScenarioResponse {
    pub scenarios: Vec<ScenarioCard>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct JobListQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct EmbeddingResponse {
    pub embedding: Vec<f64>,
    pub dimension: usize,
    pub source: EmbeddingSource,
}

#[derive(Debug, Serialize)]
pub struct EmbeddingStatusResponse {
    pub service_configured: bool,
}

#[derive(Debug, Deserialize)]
pub struct JobMatchingRequest {
    #[serde(default)]
    pub embedding: Vec<f64>,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct JobMatchingResponse {
    pub matches: Vec<ScoredCandidate>,
    pub total_found: usize,
}

#[derive(Debug, Serialize)]
pub struct CorpusStatusResponse {
    pub jobs_available: usize,
    pub tables_checked: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/recommendations
///
/// Extracts vocabulary keywords from the résumé (LLM first, local fallback)
/// and ranks the loaded postings by keyword overlap.
pub async fn handle_recommendations(
    State(state): State<AppState>,
    Json(request): Json<ResumeRankingRequest>,
) -> Result<Json<RecommendationResponse>, AppError> {
    require_text(&request.resume, "resume")?;
    let top_k = resolve_top_k(request.top_k, DEFAULT_TOP_K)?;

    let (recommendations, keywords, keyword_source) =
        rank_by_resume_keywords(&state, &request.resume, RECOMMENDATION_POOL_LIMIT, top_k).await?;

    Ok(Json(RecommendationResponse {
        recommendations,
        keywords,
        keyword_source,
    }))
}

/// POST /api/v1/game/scenarios
///
/// Builds the swipe deck: a larger pool ranked by keyword overlap, each
/// posting turned into a decline/accept card.
pub async fn handle_scenarios(
    State(state): State<AppState>,
    Json(request): Json<ResumeRankingRequest>,
) -> Result<Json<ScenarioResponse>, AppError> {
    require_text(&request.resume, "resume")?;
    let top_k = resolve_top_k(request.top_k, DEFAULT_SCENARIO_TOP_K)?;

    let (ranked, keywords, _) =
        rank_by_resume_keywords(&state, &request.resume, SCENARIO_POOL_LIMIT, top_k).await?;

    Ok(Json(ScenarioResponse {
        scenarios: ranked.iter().map(to_scenario).collect(),
        keywords,
    }))
}

/// GET /api/v1/jobs?limit=
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobListQuery>,
) -> Json<Vec<JobPosting>> {
    let limit = params.limit.unwrap_or(DEFAULT_JOB_LIST_LIMIT);
    Json(state.corpus.load_candidates(limit).await)
}

/// POST /api/v1/vector/embedding
pub async fn handle_embedding(
    State(state): State<AppState>,
    Json(request): Json<EmbeddingRequest>,
) -> Result<Json<EmbeddingResponse>, AppError> {
    require_text(&request.text, "text")?;

    let embedded = state.engine.embeddings().embed(&request.text).await;
    Ok(Json(EmbeddingResponse {
        dimension: embedded.vector.len(),
        embedding: embedded.vector,
        source: embedded.source,
    }))
}

/// GET /api/v1/vector/embedding
pub async fn handle_embedding_status(
    State(state): State<AppState>,
) -> Json<EmbeddingStatusResponse> {
    Json(EmbeddingStatusResponse {
        service_configured: state.engine.embeddings().has_service(),
    })
}

/// POST /api/v1/vector/job-matching
///
/// Ranks postings by cosine similarity to a caller-supplied résumé embedding.
/// A length mismatch with the postings' vectors is rejected with 422.
pub async fn handle_job_matching(
    State(state): State<AppState>,
    Json(request): Json<JobMatchingRequest>,
) -> Result<Json<JobMatchingResponse>, AppError> {
    if request.embedding.is_empty() {
        return Err(AppError::Validation(
            "embedding must be a non-empty array".to_string(),
        ));
    }
    let top_k = resolve_top_k(request.top_k, DEFAULT_TOP_K)?;

    info!(
        "Finding similar jobs for embedding of length {}",
        request.embedding.len()
    );

    let pool = state.corpus.load_candidates(VECTOR_POOL_LIMIT).await;
    let matches = state
        .engine
        .recommend(
            &ScoringStrategy::EmbeddingSimilarity(request.embedding),
            pool,
            top_k,
        )
        .await?;

    Ok(Json(JobMatchingResponse {
        total_found: matches.len(),
        matches,
    }))
}

/// GET /api/v1/vector/job-matching
pub async fn handle_corpus_status(State(state): State<AppState>) -> Json<CorpusStatusResponse> {
    let jobs = state.corpus.load_candidates(VECTOR_POOL_LIMIT).await;
    Json(CorpusStatusResponse {
        jobs_available: jobs.len(),
        tables_checked: state.corpus.sources(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn rank_by_resume_keywords(
    state: &AppState,
    resume: &str,
    pool_limit: usize,
    top_k: usize,
) -> Result<(Vec<ScoredCandidate>, Vec<String>, KeywordSource), AppError> {
    let vocabulary = state.engine.vocabulary();
    let (keywords, source) = extract_keywords(resume, vocabulary, state.llm.as_ref()).await;
    info!("Extracted {} keywords ({:?})", keywords.len(), source);

    let pool = state.corpus.load_candidates(pool_limit).await;
    let strategy = ScoringStrategy::KeywordOverlap(keywords_as_query(&keywords));
    let ranked = state.engine.recommend(&strategy, pool, top_k).await?;

    Ok((ranked, keywords.into_iter().collect(), source))
}

fn to_scenario(candidate: &ScoredCandidate) -> ScenarioCard {
    let job = &candidate.job;
    let mut situation = format!("{} at {} ({})", job.title, job.company, job.location);
    if !job.description.is_empty() {
        situation.push_str(" - ");
        situation.push_str(&job.description);
    }

    ScenarioCard {
        situation,
        option_a: ScenarioOption {
            text: "Decline",
            id: job.id.clone(),
        },
        option_b: ScenarioOption {
            text: "Accept",
            id: job.id.clone(),
        },
        score: candidate.score,
        rank: candidate.rank,
    }
}

fn require_text(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn resolve_top_k(requested: Option<usize>, default: usize) -> Result<usize, AppError> {
    match requested {
        Some(0) => Err(AppError::Validation("top_k must be at least 1".to_string())),
        Some(k) => Ok(k),
        None => Ok(default),
    }
}
