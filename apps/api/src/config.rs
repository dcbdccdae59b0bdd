use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_JOB_TABLES: &str = "jobs,job_listings,job_posts,definitiondata,jobs_duplicate";
const DEFAULT_LLM_API_URL: &str = "https://ai.hackclub.com/chat/completions";
const DEFAULT_LLM_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_EMBEDDING_API_URL: &str = "https://api.openai.com/v1/embeddings";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// Application configuration loaded from environment variables.
/// Fails at startup if a value is present but invalid.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres (Supabase) URL. `None` serves the built-in sample corpus.
    pub database_url: Option<String>,
    /// Tables tried in order when loading the job corpus.
    pub job_tables: Vec<String>,
    pub llm_api_url: String,
    pub llm_model: String,
    pub openai_api_key: Option<String>,
    pub embedding_api_url: String,
    pub embedding_model: String,
    /// Applied to every external LLM / embedding round trip.
    pub external_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let job_tables = parse_table_list(
            &std::env::var("JOB_TABLES").unwrap_or_else(|_| DEFAULT_JOB_TABLES.to_string()),
        )?;

        let external_timeout = parse_timeout(
            &std::env::var("EXTERNAL_TIMEOUT_SECS").unwrap_or_else(|_| "30".to_string()),
        )?;

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            job_tables,
            llm_api_url: env_or("LLM_API_URL", DEFAULT_LLM_API_URL),
            llm_model: env_or("LLM_MODEL", DEFAULT_LLM_MODEL),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            embedding_api_url: env_or("EMBEDDING_API_URL", DEFAULT_EMBEDDING_API_URL),
            embedding_model: env_or("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            external_timeout,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Seconds allowed for each external call. Zero would fail every call, so it is rejected.
pub fn parse_timeout(raw: &str) -> Result<Duration> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .context("EXTERNAL_TIMEOUT_SECS must be a whole number of seconds")?;
    if secs == 0 {
        bail!("EXTERNAL_TIMEOUT_SECS must be at least 1");
    }
    Ok(Duration::from_secs(secs))
}

/// Splits a comma-separated table list. Table names end up inside SQL text,
/// so only plain identifiers are accepted.
pub fn parse_table_list(raw: &str) -> Result<Vec<String>> {
    let tables: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if tables.is_empty() {
        bail!("JOB_TABLES must name at least one table");
    }

    for table in &tables {
        if !is_plain_identifier(table) {
            bail!("JOB_TABLES entry '{table}' is not a valid table name");
        }
    }

    Ok(tables)
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
