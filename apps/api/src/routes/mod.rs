pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers as matching;
use crate::resume::handlers as resume;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Recommendations
        .route("/api/v1/recommendations", post(matching::handle_recommendations))
        .route("/api/v1/game/scenarios", post(matching::handle_scenarios))
        .route("/api/v1/jobs", get(matching::handle_list_jobs))
        // Vector matching
        .route(
            "/api/v1/vector/embedding",
            get(matching::handle_embedding_status).post(matching::handle_embedding),
        )
        .route(
            "/api/v1/vector/job-matching",
            get(matching::handle_corpus_status).post(matching::handle_job_matching),
        )
        // Résumés and applications
        .route("/api/v1/resumes/extract", post(resume::handle_extract))
        .route("/api/v1/resumes/summary", post(resume::handle_summary))
        .route("/api/v1/applications/email", post(resume::handle_email))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::llm_client::{LlmError, TextGenerationService};
    use crate::matching::corpus::{JobCorpus, StaticJobCorpus};
    use crate::matching::embedding::EmbeddingProvider;
    use crate::matching::engine::RankingEngine;
    use crate::matching::vocabulary::Vocabulary;

    struct Offline;

    #[async_trait]
    impl TextGenerationService for Offline {
        async fn complete(&self, _prompt: &str, _system: Option<&str>) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 503,
                message: "offline".to_string(),
            })
        }
    }

    fn test_state() -> AppState {
        AppState {
            corpus: Arc::new(StaticJobCorpus::sample()),
            llm: Arc::new(Offline),
            engine: RankingEngine::new(Vocabulary::DEFAULT, EmbeddingProvider::fallback_only()),
        }
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(test_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "swipedin-api");
        assert_eq!(body["job_sources"], json!(["sample"]));
        assert_eq!(body["embedding_service"], false);
    }

    #[tokio::test]
    async fn test_recommendations_fall_back_to_local_keywords() {
        let (status, body) = send(post_json(
            "/api/v1/recommendations",
            json!({"resume": "Machine learning engineer with Python and PyTorch experience", "top_k": 3}),
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["keyword_source"], "local");
        let recs = body["recommendations"].as_array().unwrap();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0]["rank"], 1);
        assert_eq!(recs[0]["job"]["title"], "Machine Learning Engineer");
        assert!(recs[0]["matched_keywords"]
            .as_array()
            .unwrap()
            .contains(&json!("machine learning")));
    }

    #[tokio::test]
    async fn test_recommendations_reject_empty_resume_and_zero_top_k() {
        let (status, body) = send(post_json("/api/v1/recommendations", json!({"resume": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, _) = send(post_json(
            "/api/v1/recommendations",
            json!({"resume": "python", "top_k": 0}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_scenarios_default_to_whole_sample_pool() {
        let (status, body) = send(post_json(
            "/api/v1/game/scenarios",
            json!({"resume": "React frontend developer"}),
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        let cards = body["scenarios"].as_array().unwrap();
        assert_eq!(cards.len(), 5);
        assert_eq!(cards[0]["option_a"]["text"], "Decline");
        assert_eq!(cards[0]["option_b"]["text"], "Accept");
    }

    #[tokio::test]
    async fn test_list_jobs_respects_limit() {
        let (status, body) = send(get("/api/v1/jobs?limit=2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_embedding_uses_fallback_without_service() {
        let (status, body) = send(post_json("/api/v1/vector/embedding", json!({"text": "rust"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "fallback");
        assert_eq!(body["dimension"], 384);

        let (_, body) = send(get("/api/v1/vector/embedding")).await;
        assert_eq!(body["service_configured"], false);
    }

    #[tokio::test]
    async fn test_job_matching_ranks_fallback_embeddings() {
        let jobs = StaticJobCorpus::sample().load_candidates(5).await;
        let resume = crate::matching::embedding::hash_embedding(&jobs[4].description_text());
        let (status, body) = send(post_json(
            "/api/v1/vector/job-matching",
            json!({"embedding": resume}),
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_found"], 5);
        assert_eq!(body["matches"][0]["job"]["title"], "Data Scientist");
    }

    #[tokio::test]
    async fn test_job_matching_dimension_mismatch_is_422() {
        let (status, body) = send(post_json(
            "/api/v1/vector/job-matching",
            json!({"embedding": [0.1, 0.2, 0.3]}),
        ))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
    }

    #[tokio::test]
    async fn test_corpus_status() {
        let (status, body) = send(get("/api/v1/vector/job-matching")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["jobs_available"], 5);
        assert_eq!(body["tables_checked"], json!(["sample"]));
    }

    #[tokio::test]
    async fn test_summary_falls_back_when_llm_is_down() {
        let (status, body) = send(post_json(
            "/api/v1/resumes/summary",
            json!({"resume": "Backend engineer with eight years of Rust."}),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "local");
    }

    #[tokio::test]
    async fn test_email_llm_failure_is_500() {
        let (status, body) = send(post_json(
            "/api/v1/applications/email",
            json!({"job": {"title": "Clerk", "company": "Shop"}, "resume": "text"}),
        ))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "LLM_ERROR");
    }

    #[tokio::test]
    async fn test_extract_plain_text_upload() {
        let boundary = "XBOUNDARY";
        let payload = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"cv.txt\"\r\n\
             Content-Type: text/plain\r\n\r\nJane Doe\r\nSkills\r\nRust\r\n--{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/resumes/extract")
            .header("content-type", format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(payload))
            .unwrap();

        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "Jane Doe\nSkills\nRust");
        assert_eq!(body["sections"]["skills"], json!(["Rust"]));
    }
}
