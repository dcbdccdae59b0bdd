//! Embeddings: text → vector, with a deterministic local fallback, plus cosine similarity.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::llm_client::EmbeddingService;
use crate::matching::normalize::normalize;
use crate::matching::MatchError;

/// Length of vectors produced by `hash_embedding`.
pub const FALLBACK_DIMENSION: usize = 384;

pub type EmbeddingVector = Vec<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingSource {
    Service,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct Embedded {
    pub vector: EmbeddingVector,
    pub source: EmbeddingSource,
}

/// Maps text to an embedding. Never fails: any service error, timeout, or a
/// missing service degrades to `hash_embedding`.
#[derive(Clone)]
pub struct EmbeddingProvider {
    service: Option<Arc<dyn EmbeddingService>>,
    timeout: Duration,
}

impl EmbeddingProvider {
    pub fn new(service: Arc<dyn EmbeddingService>, timeout: Duration) -> Self {
        Self {
            service: Some(service),
            timeout,
        }
    }

    /// Provider that always uses the hash embedding.
    pub fn fallback_only() -> Self {
        Self {
            service: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn has_service(&self) -> bool {
        self.service.is_some()
    }

    pub async fn embed(&self, text: &str) -> Embedded {
        if let Some(service) = &self.service {
            match tokio::time::timeout(self.timeout, service.embed(text)).await {
                Ok(Ok(vector)) => {
                    debug!("Embedding service returned {} dimensions", vector.len());
                    return Embedded {
                        vector,
                        source: EmbeddingSource::Service,
                    };
                }
                Ok(Err(e)) => warn!("Embedding service failed, using fallback embedding: {e}"),
                Err(_) => warn!(
                    "Embedding service timed out after {:?}, using fallback embedding",
                    self.timeout
                ),
            }
        }

        Embedded {
            vector: hash_embedding(text),
            source: EmbeddingSource::Fallback,
        }
    }
}

/// Deterministic word-hash embedding of length `FALLBACK_DIMENSION`.
///
/// Each whitespace-separated word hashes to a signed 32-bit value
/// (`h = h * 31 + utf16_unit`, wrapping). The slot `|h| mod 384` is set to
/// `(h rem 100) / 100`; later words overwrite earlier ones.
pub fn hash_embedding(text: &str) -> EmbeddingVector {
    let text = normalize(text);
    let mut embedding = vec![0.0; FALLBACK_DIMENSION];

    for word in text.split_whitespace() {
        let hash = word_hash(word);
        let index = (hash.unsigned_abs() % FALLBACK_DIMENSION as u32) as usize;
        embedding[index] = slot_value(hash);
    }

    // A trailing separator leaves an empty final word, which hashes to slot 0.
    if text.ends_with(char::is_whitespace) {
        embedding[0] = 0.0;
    }

    embedding
}

fn word_hash(word: &str) -> i32 {
    word.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

fn slot_value(hash: i32) -> f64 {
    let rem = hash % 100;
    // Remainder keeps the dividend's sign, zero included.
    if rem == 0 && hash < 0 {
        -0.0
    } else {
        f64::from(rem) / 100.0
    }
}

/// `dot(a, b) / (|a| * |b|)`, unclamped.
///
/// Unequal lengths are a contract violation and fail with `DimensionMismatch`.
/// A zero-norm operand, or components so large the result is not finite, yields `0.0`.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64, MatchError> {
    if a.len() != b.len() {
        return Err(MatchError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    let similarity = dot / (norm_a * norm_b);
    Ok(if similarity.is_finite() { similarity } else { 0.0 })
}
