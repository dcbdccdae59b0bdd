use serde::Serialize;
use tracing::warn;

use crate::llm_client::TextGenerationService;
use crate::resume::prompts::{SUMMARY_PROMPT_TEMPLATE, SUMMARY_SYSTEM};

const FALLBACK_SENTENCES: usize = 3;
const MIN_SENTENCE_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    Llm,
    Local,
}

/// Summarizes a résumé with the LLM, or locally when the call fails.
pub async fn summarize_resume(
    resume: &str,
    llm: &dyn TextGenerationService,
) -> (String, SummarySource) {
    let prompt = SUMMARY_PROMPT_TEMPLATE.replace("{resume}", resume);
    match llm.complete(&prompt, Some(SUMMARY_SYSTEM)).await {
        Ok(summary) => (summary.trim().to_string(), SummarySource::Llm),
        Err(e) => {
            warn!("LLM summary failed, using local summary: {e}");
            (fallback_summary(resume), SummarySource::Local)
        }
    }
}

/// The first three substantial sentences, wrapped in a fixed frame.
pub fn fallback_summary(resume: &str) -> String {
    let sentences: Vec<&str> = resume
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
        .take(FALLBACK_SENTENCES)
        .collect();

    format!(
        "Professional Summary:\n\n{}. This candidate demonstrates relevant experience and skills for the position.",
        sentences.join(". ")
    )
}
