//! Ranking engine. Scores a candidate pool against a résumé representation
//! and returns a ranked top-K shortlist with per-job signals.
//!
//! Two strategies:
//! - `KeywordOverlap`: vocabulary terms shared by query text and posting, plus
//!   two flat bonus rules, normalized to `[0, 1]`.
//! - `EmbeddingSimilarity`: raw cosine similarity (roughly `[-1, 1]`, not clamped).
//!
//! Ranking is a stable sort on each candidate's `sort_key` (the uncapped raw
//! keyword score, or the similarity itself), so equal keys keep pool order.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::matching::embedding::{
    cosine_similarity, EmbeddingProvider, EmbeddingSource, EmbeddingVector,
};
use crate::matching::job::{dedup_postings, JobPosting};
use crate::matching::normalize::normalize;
use crate::matching::vocabulary::Vocabulary;
use crate::matching::MatchError;

const ENVIRONMENT_RESUME_TERMS: &[&str] = &["garbage", "collector", "waste", "recycling"];
const ENVIRONMENT_JOB_TERMS: &[&str] = &[
    "environmental",
    "waste",
    "recycling",
    "sustainability",
    "operations",
    "maintenance",
];
const GENERAL_TERMS: &[&str] = &["experience", "work", "job", "position", "role", "responsibility"];

const KEYWORD_MATCH_WEIGHT: f64 = 1.0;
const ENVIRONMENT_BONUS: f64 = 2.0;
const GENERAL_TERM_BONUS: f64 = 0.5;
/// Raw keyword scores are divided by this and capped at 1.0.
const KEYWORD_SCORE_SCALE: f64 = 10.0;
/// Postings scored by embedding at once; bounds concurrent embedding-service calls.
const EMBEDDING_CONCURRENCY: usize = 8;

/// How the résumé side of a ranking call is represented.
#[derive(Debug, Clone)]
pub enum ScoringStrategy {
    /// Free text (raw résumé or a joined keyword set) matched against the vocabulary.
    KeywordOverlap(String),
    /// A résumé embedding compared by cosine similarity.
    EmbeddingSimilarity(EmbeddingVector),
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordScore {
    pub raw: f64,
    /// `min(raw / 10, 1.0)`
    pub score: f64,
    /// Matched vocabulary terms, in vocabulary order.
    pub matched: Vec<String>,
}

/// A scored posting before ranking.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub job: JobPosting,
    /// Reported score.
    pub score: f64,
    /// Ranking order. The raw keyword score, so postings past the 1.0 cap stay ordered.
    pub sort_key: f64,
    pub matched_keywords: Option<Vec<String>>,
}

/// A ranked posting. `rank` is 1-based and contiguous within one result.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    pub job: JobPosting,
    #[serde(rename = "similarity_score")]
    pub score: f64,
    pub rank: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_keywords: Option<Vec<String>>,
}

/// Keyword-overlap score of one posting against query text.
///
/// Scoring:
/// 1. +1.0 for every vocabulary term present in both normalized texts
/// 2. +2.0 once if the résumé mentions waste/recycling work and the posting
///    mentions environmental/operations work
/// 3. +0.5 per general work term present in both
pub fn score_by_keywords(
    resume_text: &str,
    job: &JobPosting,
    vocabulary: &Vocabulary,
) -> KeywordScore {
    let resume = normalize(resume_text);
    let posting = normalize(&job.description_text());

    let mut raw = 0.0;
    let mut matched = Vec::new();

    for term in vocabulary.terms() {
        if resume.contains(term) && posting.contains(term) {
            raw += KEYWORD_MATCH_WEIGHT;
            matched.push(term.to_string());
        }
    }

    if ENVIRONMENT_RESUME_TERMS.iter().any(|t| resume.contains(t))
        && ENVIRONMENT_JOB_TERMS.iter().any(|t| posting.contains(t))
    {
        raw += ENVIRONMENT_BONUS;
    }

    for term in GENERAL_TERMS {
        if resume.contains(term) && posting.contains(term) {
            raw += GENERAL_TERM_BONUS;
        }
    }

    KeywordScore {
        raw,
        score: (raw / KEYWORD_SCORE_SCALE).min(1.0),
        matched,
    }
}

/// Cosine similarity between the résumé embedding and the posting's embedding.
/// Postings without a precomputed vector are embedded on the fly.
///
/// A precomputed vector of the wrong length fails with `DimensionMismatch`.
/// An on-the-fly vector that degraded to the hash fallback and no longer
/// matches the résumé's length scores `0.0` instead.
pub async fn score_by_embedding(
    resume_embedding: &[f64],
    job: &JobPosting,
    embeddings: &EmbeddingProvider,
) -> Result<f64, MatchError> {
    let Some(vector) = &job.embedding else {
        let embedded = embeddings.embed(&job.description_text()).await;
        if embedded.source == EmbeddingSource::Fallback
            && embedded.vector.len() != resume_embedding.len()
        {
            warn!(
                "Fallback embedding for '{}' has {} dimensions, résumé has {}; scoring 0",
                job.title,
                embedded.vector.len(),
                resume_embedding.len()
            );
            return Ok(0.0);
        }
        return cosine_similarity(resume_embedding, &embedded.vector);
    };

    cosine_similarity(resume_embedding, vector)
}

/// Sorts by `sort_key` descending (stable), keeps the first `top_k`, assigns 1-based ranks.
pub fn rank(mut candidates: Vec<Candidate>, top_k: usize) -> Vec<ScoredCandidate> {
    candidates.sort_by(|a, b| b.sort_key.total_cmp(&a.sort_key));

    candidates
        .into_iter()
        .take(top_k)
        .enumerate()
        .map(|(i, c)| ScoredCandidate {
            job: c.job,
            score: c.score,
            rank: i + 1,
            matched_keywords: c.matched_keywords,
        })
        .collect()
}

/// Stateless engine: a vocabulary plus the embedding provider used for
/// postings that carry no precomputed vector.
#[derive(Clone)]
pub struct RankingEngine {
    vocabulary: Vocabulary,
    embeddings: EmbeddingProvider,
}

impl RankingEngine {
    pub fn new(vocabulary: Vocabulary, embeddings: EmbeddingProvider) -> Self {
        Self {
            vocabulary,
            embeddings,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn embeddings(&self) -> &EmbeddingProvider {
        &self.embeddings
    }

    /// Deduplicates the pool, scores every posting with `strategy`, and ranks.
    /// An empty pool yields an empty result. Only `DimensionMismatch` escapes.
    pub async fn recommend(
        &self,
        strategy: &ScoringStrategy,
        pool: Vec<JobPosting>,
        top_k: usize,
    ) -> Result<Vec<ScoredCandidate>, MatchError> {
        let pool = dedup_postings(pool);
        let pool_size = pool.len();
        let mut candidates = Vec::with_capacity(pool_size);

        match strategy {
            ScoringStrategy::KeywordOverlap(query) => {
                for job in pool {
                    let KeywordScore { raw, score, matched } =
                        score_by_keywords(query, &job, &self.vocabulary);
                    candidates.push(Candidate {
                        job,
                        score,
                        sort_key: raw,
                        matched_keywords: Some(matched),
                    });
                }
            }
            ScoringStrategy::EmbeddingSimilarity(resume_embedding) => {
                let scores = self.embedding_scores(resume_embedding, &pool).await?;
                for (job, score) in pool.into_iter().zip(scores) {
                    candidates.push(Candidate {
                        job,
                        score,
                        sort_key: score,
                        matched_keywords: None,
                    });
                }
            }
        }

        let ranked = rank(candidates, top_k);
        info!(
            "Ranked {} of {} postings (top_k={})",
            ranked.len(),
            pool_size,
            top_k
        );
        Ok(ranked)
    }

    /// Scores every posting by embedding, at most `EMBEDDING_CONCURRENCY` at a
    /// time. Scores come back in pool order.
    async fn embedding_scores(
        &self,
        resume_embedding: &[f64],
        pool: &[JobPosting],
    ) -> Result<Vec<f64>, MatchError> {
        let resume: Arc<[f64]> = Arc::from(resume_embedding);
        let permits = Arc::new(Semaphore::new(EMBEDDING_CONCURRENCY));
        let mut tasks = JoinSet::new();

        for (index, job) in pool.iter().enumerate() {
            let resume = Arc::clone(&resume);
            let permits = Arc::clone(&permits);
            let embeddings = self.embeddings.clone();
            let job = job.clone();
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                (index, score_by_embedding(&resume, &job, &embeddings).await)
            });
        }

        let mut scores = vec![0.0; pool.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, score)) => scores[index] = score?,
                Err(e) => warn!("Embedding scoring task failed, scoring 0: {e}"),
            }
        }
        Ok(scores)
    }
}
