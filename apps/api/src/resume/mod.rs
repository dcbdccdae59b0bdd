// Résumé utilities: upload extraction, summaries, application emails.
// All LLM calls go through llm_client; each feature falls back or fails on its own terms.

pub mod email;
pub mod handlers;
pub mod prompts;
pub mod summary;
pub mod text;
