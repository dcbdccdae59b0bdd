//! Job corpus loading: where candidate pools come from.
//!
//! `AppState` holds an `Arc<dyn JobCorpus>`: Postgres/Supabase when a database
//! is configured, the built-in sample postings otherwise.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info, warn};

use crate::matching::job::JobPosting;

#[async_trait]
pub trait JobCorpus: Send + Sync {
    /// Up to `limit` postings. Storage failures yield an empty pool.
    async fn load_candidates(&self, limit: usize) -> Vec<JobPosting>;

    /// Names of the sources consulted, for diagnostics.
    fn sources(&self) -> Vec<String>;
}

// ────────────────────────────────────────────────────────────────────────────
// PgJobCorpus
// ────────────────────────────────────────────────────────────────────────────

/// Connections held by the corpus pool. Reads only.
const MAX_CONNECTIONS: u32 = 5;

/// Loads postings from the first configured table that yields rows.
/// Rows are read as JSON so differing column sets normalize through
/// `JobPosting::from_record`.
pub struct PgJobCorpus {
    pool: PgPool,
    tables: Vec<String>,
}

impl PgJobCorpus {
    /// `tables` must already be validated identifiers (see `config::parse_table_list`).
    pub fn new(pool: PgPool, tables: Vec<String>) -> Self {
        Self { pool, tables }
    }

    /// Opens a pool against `database_url`; fails if no connection can be made
    /// within `acquire_timeout`.
    pub async fn connect(
        database_url: &str,
        tables: Vec<String>,
        acquire_timeout: Duration,
    ) -> anyhow::Result<Self> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;
        info!("PostgreSQL connection pool established");

        Ok(Self::new(pool, tables))
    }

    async fn load_table(&self, table: &str, limit: usize) -> anyhow::Result<Vec<Value>> {
        let sql = table_query(table);
        let rows = sqlx::query_scalar::<_, Value>(&sql)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl JobCorpus for PgJobCorpus {
    async fn load_candidates(&self, limit: usize) -> Vec<JobPosting> {
        for table in &self.tables {
            match self.load_table(table, limit).await {
                Ok(rows) if !rows.is_empty() => {
                    info!("Loaded {} jobs from table: {table}", rows.len());
                    return rows.iter().map(JobPosting::from_record).collect();
                }
                Ok(_) => debug!("Table {table} is empty"),
                Err(e) => debug!("Could not load jobs from table {table}: {e}"),
            }
        }

        warn!("No jobs found in any of: {}", self.tables.join(", "));
        Vec::new()
    }

    fn sources(&self) -> Vec<String> {
        self.tables.clone()
    }
}

fn table_query(table: &str) -> String {
    format!(r#"SELECT to_jsonb(t) FROM "{table}" t LIMIT $1"#)
}

// ────────────────────────────────────────────────────────────────────────────
// StaticJobCorpus
// ────────────────────────────────────────────────────────────────────────────

/// A fixed in-memory pool. Used when no database is configured, and in tests.
pub struct StaticJobCorpus {
    postings: Vec<JobPosting>,
}

impl StaticJobCorpus {
    pub fn new(postings: Vec<JobPosting>) -> Self {
        Self { postings }
    }

    /// Five representative postings across design, web, data and ML roles.
    pub fn sample() -> Self {
        let records = [
            json!({
                "id": 1,
                "title": "Frontend Developer",
                "company": "Tech Solutions",
                "location": "Remote",
                "description": "Work on modern web apps using React and TypeScript. Experience with Next.js, Tailwind CSS, and modern JavaScript frameworks required."
            }),
            json!({
                "id": 2,
                "title": "Backend Engineer",
                "company": "Cloudify",
                "location": "Berlin, Germany",
                "description": "Build scalable APIs and microservices with Node.js, Python, and cloud technologies. Experience with AWS, Docker, and Kubernetes preferred."
            }),
            json!({
                "id": 3,
                "title": "UI/UX Designer",
                "company": "DesignHub",
                "location": "New York, NY",
                "description": "Create beautiful and user-friendly interfaces for web and mobile. Proficiency in Figma, Adobe Creative Suite, and design systems required."
            }),
            json!({
                "id": 4,
                "title": "Machine Learning Engineer",
                "company": "AI Innovations",
                "location": "San Francisco, CA",
                "description": "Develop and deploy machine learning models using Python, PyTorch, and TensorFlow. Experience with NLP, computer vision, and MLOps preferred."
            }),
            json!({
                "id": 5,
                "title": "Data Scientist",
                "company": "DataCorp",
                "location": "London, UK",
                "description": "Analyze complex datasets and build predictive models using Python, R, and SQL. Experience with statistical analysis and data visualization required."
            }),
        ];

        Self::new(records.iter().map(JobPosting::from_record).collect())
    }
}

#[async_trait]
impl JobCorpus for StaticJobCorpus {
    async fn load_candidates(&self, limit: usize) -> Vec<JobPosting> {
        self.postings.iter().take(limit).cloned().collect()
    }

    fn sources(&self) -> Vec<String> {
        vec!["sample".to_string()]
    }
}
