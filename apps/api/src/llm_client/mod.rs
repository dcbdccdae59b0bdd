/// LLM client: the single point of entry for every external model call in SwipedIn.
///
/// ARCHITECTURAL RULE: No other module may talk to a chat-completion or embedding
/// endpoint directly. Callers depend on the `TextGenerationService` and
/// `EmbeddingService` traits so tests can substitute fakes.
///
/// Each call is a single round trip bounded by the configured timeout. There is
/// no retry: callers own the fallback.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

pub mod prompts;

const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl LlmError {
    /// True when the service answered but the body could not be used.
    /// Everything else (transport, timeout, status, credentials) means the
    /// service was unavailable.
    pub fn is_malformed(&self) -> bool {
        match self {
            LlmError::Parse(_) | LlmError::EmptyContent => true,
            LlmError::Http(e) => e.is_decode(),
            LlmError::Api { .. } | LlmError::NotConfigured(_) => false,
        }
    }
}

/// One prompt in, one textual reply out. No streaming.
#[async_trait]
pub trait TextGenerationService: Send + Sync {
    async fn complete(&self, prompt: &str, system: Option<&str>) -> Result<String, LlmError>;
}

/// Maps text to a provider-defined embedding vector.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f64>, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

impl ChatResponse {
    /// Extracts the non-blank text of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f64>,
}

/// The single external-model client used by all services in SwipedIn.
/// Speaks the OpenAI-compatible chat completion and embedding wire formats.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    chat_url: String,
    chat_model: String,
    embedding_url: String,
    embedding_model: String,
    api_key: Option<String>,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(config.external_timeout).build()?;

        Ok(Self {
            client,
            chat_url: config.llm_api_url.clone(),
            chat_model: config.llm_model.clone(),
            embedding_url: config.embedding_api_url.clone(),
            embedding_model: config.embedding_model.clone(),
            api_key: config.openai_api_key.clone(),
        })
    }

    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    /// Whether the embedding endpoint can be called at all.
    pub fn embeddings_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Makes a single chat completion call and returns the parsed response.
    pub async fn call(&self, prompt: &str, system: Option<&str>) -> Result<ChatResponse, LlmError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let request_body = ChatRequest {
            model: &self.chat_model,
            messages,
            stream: false,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let mut request = self.client.post(&self.chat_url).json(&request_body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let chat_response: ChatResponse = serde_json::from_str(&body)?;
        debug!(
            "LLM call succeeded: model={}, choices={}",
            self.chat_model,
            chat_response.choices.len()
        );

        Ok(chat_response)
    }
}

#[async_trait]
impl TextGenerationService for LlmClient {
    async fn complete(&self, prompt: &str, system: Option<&str>) -> Result<String, LlmError> {
        let response = self.call(prompt, system).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

#[async_trait]
impl EmbeddingService for LlmClient {
    async fn embed(&self, text: &str) -> Result<Vec<f64>, LlmError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::NotConfigured("OPENAI_API_KEY"))?;

        let response = self
            .client
            .post(&self.embedding_url)
            .bearer_auth(key)
            .json(&EmbeddingRequest {
                input: text,
                model: &self.embedding_model,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        parse_embedding_body(&body)
    }
}

fn parse_embedding_body(body: &str) -> Result<Vec<f64>, LlmError> {
    let parsed: EmbeddingResponse = serde_json::from_str(body)?;
    parsed
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .filter(|v| !v.is_empty())
        .ok_or(LlmError::EmptyContent)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_chat_response_text_reads_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"python, rust"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.text(), Some("python, rust"));
    }

    #[test]
    fn test_chat_response_blank_content_is_none() {
        let body = r#"{"choices":[{"message":{"content":"   "}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.text(), None);

        let parsed: ChatResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.text(), None);
    }

    #[test]
    fn test_embedding_body_takes_first_vector() {
        let body = r#"{"data":[{"embedding":[0.1,-0.2,0.3]}],"model":"m"}"#;
        assert_eq!(parse_embedding_body(body).unwrap(), vec![0.1, -0.2, 0.3]);
    }

    #[test]
    fn test_embedding_body_without_data_is_malformed() {
        let err = parse_embedding_body(r#"{"data":[]}"#).unwrap_err();
        assert!(err.is_malformed());

        let err = parse_embedding_body("not json").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_status_and_configuration_errors_are_unavailable() {
        let api = LlmError::Api {
            status: 503,
            message: "overloaded".to_string(),
        };
        assert!(!api.is_malformed());
        assert!(!LlmError::NotConfigured("OPENAI_API_KEY").is_malformed());
    }

    #[test]
    fn test_chat_request_serializes_openai_shape() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            stream: false,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["stream"], false);
        assert_eq!(value["model"], "gpt-3.5-turbo");
    }
}
