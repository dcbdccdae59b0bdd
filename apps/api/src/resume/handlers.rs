//! Axum route handlers for résumé utilities and application emails.

use axum::{extract::Multipart, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::matching::job::JobPosting;
use crate::resume::email::{generate_email, EmailDraft};
use crate::resume::summary::{summarize_resume, SummarySource};
use crate::resume::text::{clean_resume_text, extract_sections, read_upload, ResumeSections};
use crate::state::AppState;

const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub text: String,
    pub sections: ResumeSections,
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub resume: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub source: SummarySource,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    /// Posting as the client holds it; normalized like a storage row.
    #[serde(default)]
    pub job: Value,
    #[serde(default)]
    pub resume: String,
}

/// POST /api/v1/resumes/extract
///
/// Multipart upload (`file` field) → cleaned résumé text plus detected sections.
pub async fn handle_extract(mut multipart: Multipart) -> Result<Json<ExtractResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or("text/plain").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;

        let text = clean_resume_text(&read_upload(content_type, bytes).await?);
        if text.is_empty() {
            return Err(AppError::UnprocessableEntity(
                "No text could be extracted from the upload".to_string(),
            ));
        }

        let sections = extract_sections(&text);
        return Ok(Json(ExtractResponse { text, sections }));
    }

    Err(AppError::Validation(format!(
        "Multipart field '{UPLOAD_FIELD}' is required"
    )))
}

/// POST /api/v1/resumes/summary
pub async fn handle_summary(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    if request.resume.trim().is_empty() {
        return Err(AppError::Validation("resume cannot be empty".to_string()));
    }

    let (summary, source) = summarize_resume(&request.resume, state.llm.as_ref()).await;
    Ok(Json(SummaryResponse { summary, source }))
}

/// POST /api/v1/applications/email
pub async fn handle_email(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<EmailDraft>, AppError> {
    if !request.job.is_object() {
        return Err(AppError::Validation("job must be an object".to_string()));
    }

    let job = JobPosting::from_record(&request.job);
    let draft = generate_email(&job, &request.resume, state.llm.as_ref()).await?;
    Ok(Json(draft))
}
