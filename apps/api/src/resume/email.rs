//! Application email generation for a chosen posting.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{strip_json_fences, TextGenerationService};
use crate::matching::job::JobPosting;
use crate::resume::prompts::{EMAIL_PROMPT_TEMPLATE, EMAIL_SYSTEM};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
}

/// Shape the model is asked for; either field may be missing in practice.
#[derive(Debug, Deserialize)]
struct RawEmailDraft {
    subject: Option<String>,
    body: Option<String>,
}

/// Generates an application email. An LLM failure is an error; a reply that
/// is not the requested JSON still becomes a usable draft.
pub async fn generate_email(
    job: &JobPosting,
    resume: &str,
    llm: &dyn TextGenerationService,
) -> Result<EmailDraft, AppError> {
    let prompt = EMAIL_PROMPT_TEMPLATE
        .replace("{job_details}", &job_details(job))
        .replace("{resume}", resume);
    let system = format!("{EMAIL_SYSTEM} {JSON_ONLY_INSTRUCTION}");

    info!("Generating application email for {} at {}", job.title, job.company);
    let reply = llm
        .complete(&prompt, Some(&system))
        .await
        .map_err(|e| AppError::Llm(format!("Email generation failed: {e}")))?;

    Ok(parse_email_reply(&reply, job))
}

/// Reads `{subject, body}` from the reply, filling whatever is missing.
pub fn parse_email_reply(reply: &str, job: &JobPosting) -> EmailDraft {
    let parsed = serde_json::from_str::<RawEmailDraft>(strip_json_fences(reply));
    if parsed.is_err() {
        debug!("Email reply was not JSON; using it as the body");
    }
    let RawEmailDraft { subject, body } = parsed.unwrap_or(RawEmailDraft {
        subject: None,
        body: None,
    });

    EmailDraft {
        subject: subject
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| default_subject(job)),
        body: body
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| reply.trim().to_string()),
    }
}

fn default_subject(job: &JobPosting) -> String {
    format!("Application for {} position at {}", job.title, job.company)
}

fn job_details(job: &JobPosting) -> String {
    let mut details = format!(
        "- Position: {}\n- Company: {}\n- Location: {}",
        job.title, job.company, job.location
    );
    if let Some(salary) = &job.salary {
        details.push_str(&format!("\n- Salary: {salary}"));
    }
    if let Some(rating) = job.rating {
        details.push_str(&format!("\n- Company Rating: {rating}/5"));
    }
    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use async_trait::async_trait;
    use serde_json::json;

    fn posting() -> JobPosting {
        JobPosting::from_record(&json!({
            "title": "Data Scientist",
            "company": "DataCorp",
            "location": "London, UK",
            "salary": "£70k",
            "rating": 4.5
        }))
    }

    struct Reply(&'static str);

    #[async_trait]
    impl TextGenerationService for Reply {
        async fn complete(&self, prompt: &str, _system: Option<&str>) -> Result<String, LlmError> {
            assert!(prompt.contains("- Salary: £70k"));
            assert!(prompt.contains("- Company Rating: 4.5/5"));
            Ok(self.0.to_string())
        }
    }

    struct Down;

    #[async_trait]
    impl TextGenerationService for Down {
        async fn complete(&self, _prompt: &str, _system: Option<&str>) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 500,
                message: "boom".to_string(),
            })
        }
    }

    #[test]
    fn test_parse_json_reply() {
        let draft = parse_email_reply(r#"{"subject": "Hello", "body": "Dear team"}"#, &posting());
        assert_eq!(
            draft,
            EmailDraft {
                subject: "Hello".to_string(),
                body: "Dear team".to_string()
            }
        );
    }

    #[test]
    fn test_parse_fenced_json_reply() {
        let draft = parse_email_reply("```json\n{\"subject\": \"Hi\", \"body\": \"B\"}\n```", &posting());
        assert_eq!(draft.subject, "Hi");
        assert_eq!(draft.body, "B");
    }

    #[test]
    fn test_plain_text_reply_becomes_body() {
        let draft = parse_email_reply("Dear hiring manager, ...", &posting());
        assert_eq!(draft.subject, "Application for Data Scientist position at DataCorp");
        assert_eq!(draft.body, "Dear hiring manager, ...");
    }

    #[test]
    fn test_missing_subject_is_filled() {
        let draft = parse_email_reply(r#"{"body": "Dear team"}"#, &posting());
        assert_eq!(draft.subject, "Application for Data Scientist position at DataCorp");
        assert_eq!(draft.body, "Dear team");
    }

    #[test]
    fn test_job_details_omit_absent_fields() {
        let job = JobPosting::from_record(&json!({"title": "Clerk", "company": "Shop"}));
        assert_eq!(
            job_details(&job),
            "- Position: Clerk\n- Company: Shop\n- Location: Unknown Location"
        );
    }

    #[tokio::test]
    async fn test_generate_email_round_trip() {
        let llm = Reply(r#"{"subject": "Data Scientist application", "body": "Hello DataCorp"}"#);
        let draft = generate_email(&posting(), "resume", &llm).await.unwrap();
        assert_eq!(draft.subject, "Data Scientist application");
    }

    #[tokio::test]
    async fn test_generate_email_llm_failure_is_error() {
        let err = generate_email(&posting(), "resume", &Down).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }
}
