//! Job postings as the engine sees them, normalized from loosely-shaped storage rows.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::matching::embedding::EmbeddingVector;

pub const UNKNOWN_POSITION: &str = "Unknown Position";
pub const UNKNOWN_COMPANY: &str = "Unknown Company";
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

const ID_FIELDS: &[&str] = &["id", "jobid", "job_id"];
const TITLE_FIELDS: &[&str] = &["job_title", "title", "position"];
const COMPANY_FIELDS: &[&str] = &["company_name", "company"];
const LOCATION_FIELDS: &[&str] = &["location", "job_location"];
const DESCRIPTION_FIELDS: &[&str] = &["description", "description_text", "job_description"];
const SALARY_FIELDS: &[&str] = &["salary", "salary_formatted"];
const RATING_FIELDS: &[&str] = &["rating", "company_rating"];
const EMBEDDING_FIELDS: &[&str] = &["vector", "embedding"];

/// A posting in the candidate pool. Immutable for the duration of a ranking call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobPosting {
    /// Opaque identifier as stored; `null` when the row has none.
    pub id: Value,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip)]
    pub embedding: Option<EmbeddingVector>,
}

impl JobPosting {
    /// Normalizes a storage row whose column names vary between tables.
    /// Each field takes the first non-empty candidate column, in order.
    pub fn from_record(record: &Value) -> Self {
        Self {
            id: ID_FIELDS
                .iter()
                .filter_map(|f| record.get(*f))
                .find(|v| !v.is_null())
                .cloned()
                .unwrap_or(Value::Null),
            title: first_text(record, TITLE_FIELDS).unwrap_or_else(|| UNKNOWN_POSITION.to_string()),
            company: first_text(record, COMPANY_FIELDS)
                .unwrap_or_else(|| UNKNOWN_COMPANY.to_string()),
            location: first_text(record, LOCATION_FIELDS)
                .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
            description: first_text(record, DESCRIPTION_FIELDS).unwrap_or_default(),
            salary: first_text(record, SALARY_FIELDS),
            rating: RATING_FIELDS
                .iter()
                .filter_map(|f| record.get(*f))
                .find_map(as_number),
            embedding: EMBEDDING_FIELDS
                .iter()
                .filter_map(|f| record.get(*f))
                .find_map(as_vector),
        }
    }

    /// `"{title} at {company} in {location}. {description}"`, the text matched
    /// against résumés and embedded when no precomputed vector exists.
    pub fn description_text(&self) -> String {
        format!(
            "{} at {} in {}. {}",
            self.title, self.company, self.location, self.description
        )
    }
}

/// Keeps the first posting for each non-null id. Postings without an id are kept.
pub fn dedup_postings(postings: Vec<JobPosting>) -> Vec<JobPosting> {
    let mut seen = HashSet::new();
    postings
        .into_iter()
        .filter(|p| p.id.is_null() || seen.insert(p.id.to_string()))
        .collect()
}

fn first_text(record: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().filter_map(|f| record.get(*f)).find_map(|v| match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accepts a JSON array of numbers, or its string form (pgvector columns
/// arrive as `"[0.1,0.2,...]"` through `to_jsonb`).
fn as_vector(value: &Value) -> Option<EmbeddingVector> {
    let parsed;
    let items = match value {
        Value::Array(items) => items,
        Value::String(s) => {
            parsed = serde_json::from_str::<Value>(s).ok()?;
            parsed.as_array()?
        }
        _ => return None,
    };

    if items.is_empty() {
        return None;
    }
    items.iter().map(Value::as_f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_record_prefers_first_present_field() {
        let job = JobPosting::from_record(&json!({
            "jobid": 7,
            "job_title": "Backend Engineer",
            "title": "ignored",
            "company": "Cloudify",
            "job_location": "Berlin",
            "description_text": "Rust and Postgres",
            "salary_formatted": "$120k"
        }));

        assert_eq!(job.id, json!(7));
        assert_eq!(job.title, "Backend Engineer");
        assert_eq!(job.company, "Cloudify");
        assert_eq!(job.location, "Berlin");
        assert_eq!(job.description, "Rust and Postgres");
        assert_eq!(job.salary.as_deref(), Some("$120k"));
    }

    #[test]
    fn test_from_record_fills_unknowns() {
        let job = JobPosting::from_record(&json!({"title": ""}));
        assert_eq!(job.id, Value::Null);
        assert_eq!(job.title, UNKNOWN_POSITION);
        assert_eq!(job.company, UNKNOWN_COMPANY);
        assert_eq!(job.location, UNKNOWN_LOCATION);
        assert_eq!(job.description, "");
        assert!(job.embedding.is_none());
    }

    #[test]
    fn test_from_record_reads_embedding_array_and_string() {
        let job = JobPosting::from_record(&json!({"vector": [0.5, -1, 2.25]}));
        assert_eq!(job.embedding, Some(vec![0.5, -1.0, 2.25]));

        let job = JobPosting::from_record(&json!({"embedding": "[1,2,3]"}));
        assert_eq!(job.embedding, Some(vec![1.0, 2.0, 3.0]));

        let job = JobPosting::from_record(&json!({"embedding": [1, "x"]}));
        assert!(job.embedding.is_none());
    }

    #[test]
    fn test_from_record_rating_accepts_numeric_strings() {
        let job = JobPosting::from_record(&json!({"company_rating": "4.2"}));
        assert_eq!(job.rating, Some(4.2));
    }

    #[test]
    fn test_description_text_format() {
        let job = JobPosting::from_record(&json!({
            "title": "ML Engineer",
            "company": "Acme",
            "location": "Remote",
            "description": "Python, PyTorch, machine learning"
        }));
        assert_eq!(
            job.description_text(),
            "ML Engineer at Acme in Remote. Python, PyTorch, machine learning"
        );
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let postings = vec![
            JobPosting::from_record(&json!({"id": 1, "title": "First"})),
            JobPosting::from_record(&json!({"id": 2, "title": "Other"})),
            JobPosting::from_record(&json!({"id": 1, "title": "Duplicate"})),
            JobPosting::from_record(&json!({"title": "No id"})),
            JobPosting::from_record(&json!({"title": "No id either"})),
        ];

        let deduped = dedup_postings(postings);
        let titles: Vec<_> = deduped.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Other", "No id", "No id either"]);
    }

    #[test]
    fn test_serialized_posting_omits_embedding() {
        let job = JobPosting::from_record(&json!({"id": 1, "vector": [1.0]}));
        let value = serde_json::to_value(&job).unwrap();
        assert!(value.get("embedding").is_none());
        assert_eq!(value["id"], json!(1));
    }
}
