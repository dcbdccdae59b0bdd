//! Keyword extraction. Maps free-form résumé text onto the closed vocabulary.
//!
//! Two paths: local substring matching (pure, deterministic) and an LLM call
//! constrained to the vocabulary. `extract_keywords` tries the LLM once and
//! falls back to the local path on any failure.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::llm_client::TextGenerationService;
use crate::matching::normalize::normalize;
use crate::matching::prompts::KEYWORD_EXTRACTION_PROMPT;
use crate::matching::vocabulary::Vocabulary;
use crate::matching::MatchError;

/// Keywords drawn from the vocabulary. Ordered for stable output only.
pub type KeywordSet = BTreeSet<String>;

/// Which path produced a keyword set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordSource {
    Llm,
    Local,
}

/// Includes every vocabulary term that occurs as a substring of the normalized text.
pub fn extract_local(text: &str, vocabulary: &Vocabulary) -> KeywordSet {
    let text = normalize(text);
    vocabulary
        .terms()
        .iter()
        .filter(|term| text.contains(*term))
        .map(|term| term.to_string())
        .collect()
}

/// Asks the text-generation service for a comma-separated subset of the vocabulary.
///
/// Terms outside the vocabulary are discarded. A reply that leaves nothing
/// after filtering is treated as malformed.
pub async fn extract_via_llm(
    text: &str,
    vocabulary: &Vocabulary,
    llm: &dyn TextGenerationService,
) -> Result<KeywordSet, MatchError> {
    let prompt = KEYWORD_EXTRACTION_PROMPT
        .replace("{vocabulary}", &vocabulary.terms().join(", "))
        .replace("{resume}", text);

    let reply = llm.complete(&prompt, None).await?;
    debug!("Keyword extraction reply: {reply}");

    let keywords = parse_keyword_reply(&reply, vocabulary);
    if keywords.is_empty() {
        return Err(MatchError::MalformedResponse(
            "reply contained no vocabulary keywords".to_string(),
        ));
    }

    Ok(keywords)
}

/// Single LLM attempt, then local substring matching.
pub async fn extract_keywords(
    text: &str,
    vocabulary: &Vocabulary,
    llm: &dyn TextGenerationService,
) -> (KeywordSet, KeywordSource) {
    if vocabulary.is_empty() {
        return (KeywordSet::new(), KeywordSource::Local);
    }

    match extract_via_llm(text, vocabulary, llm).await {
        Ok(keywords) => (keywords, KeywordSource::Llm),
        Err(e) => {
            warn!("LLM keyword extraction failed, using local matching: {e}");
            (extract_local(text, vocabulary), KeywordSource::Local)
        }
    }
}

/// Joins a keyword set into the query text scored by the keyword-overlap strategy.
pub fn keywords_as_query(keywords: &KeywordSet) -> String {
    keywords
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_keyword_reply(reply: &str, vocabulary: &Vocabulary) -> KeywordSet {
    let reply = reply.trim();
    let reply = strip_label(reply);

    reply
        .split([',', '\n'])
        .map(|k| k.trim().trim_matches(|c: char| c == '.' || c == '"' || c == '\''))
        .map(normalize)
        .filter(|k| vocabulary.contains(k))
        .collect()
}

/// Drops a leading "Keywords:" label, case-insensitively.
fn strip_label(reply: &str) -> &str {
    const LABEL: &str = "keywords:";
    match reply.get(..LABEL.len()) {
        Some(head) if head.eq_ignore_ascii_case(LABEL) => reply[LABEL.len()..].trim_start(),
        _ => reply,
    }
}
