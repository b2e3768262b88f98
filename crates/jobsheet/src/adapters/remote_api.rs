use super::SourceAdapter;
use crate::types::{JobBatch, JobRecord, SOURCE_COLUMN, SearchQuery, SourceFetch};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

pub const REMOTIVE_SOURCE: &str = "remotive";

/// Columns kept from each Remotive job, in sheet order.
pub const REMOTIVE_COLUMNS: [&str; 8] = [
    "title",
    "company_name",
    "category",
    "job_type",
    "publication_date",
    "url",
    "description",
    SOURCE_COLUMN,
];

#[derive(Debug, thiserror::Error)]
pub enum RemoteApiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
    #[error("Missing field '{0}' in every job")]
    MissingField(&'static str),
}

#[derive(Debug, Deserialize)]
struct RemotiveResponse {
    #[serde(default)]
    jobs: Vec<Map<String, Value>>,
}

/// Pulls the full remote-jobs listing from the Remotive public API.
#[derive(Debug, Clone)]
pub struct RemoteApiAdapter {
    client: Client,
    url: String,
}

impl RemoteApiAdapter {
    pub fn new(url: impl Into<String>) -> Result<Self, RemoteApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    async fn fetch_jobs(&self) -> Result<JobBatch, RemoteApiError> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_remote_jobs(&body)
    }
}

#[async_trait]
impl SourceAdapter for RemoteApiAdapter {
    fn name(&self) -> &str {
        REMOTIVE_SOURCE
    }

    async fn fetch(&self, _query: &SearchQuery) -> SourceFetch {
        log::info!("Fetching jobs from Remotive API...");
        match self.fetch_jobs().await {
            Ok(batch) => {
                log::info!("Fetched {} jobs from Remotive", batch.len());
                SourceFetch::ok(batch)
            }
            Err(e) => {
                log::warn!("Failed to fetch from Remotive: {}", e);
                SourceFetch::failed(REMOTIVE_SOURCE, e)
            }
        }
    }
}

/// Projects a Remotive payload onto [`REMOTIVE_COLUMNS`].
///
/// A column present on no job at all means the payload shape changed and
/// the whole batch is rejected; a column missing on some jobs reads as
/// empty text.
pub fn parse_remote_jobs(body: &str) -> Result<JobBatch, RemoteApiError> {
    let response: RemotiveResponse = serde_json::from_str(body)?;

    if !response.jobs.is_empty() {
        for column in REMOTIVE_COLUMNS.into_iter().filter(|c| *c != SOURCE_COLUMN) {
            if !response.jobs.iter().any(|job| job.contains_key(column)) {
                return Err(RemoteApiError::MissingField(column));
            }
        }
    }

    Ok(response
        .jobs
        .iter()
        .map(|job| {
            REMOTIVE_COLUMNS
                .iter()
                .fold(JobRecord::new(), |record, column| {
                    let value = if *column == SOURCE_COLUMN {
                        REMOTIVE_SOURCE.to_string()
                    } else {
                        job.get(*column).map(value_text).unwrap_or_default()
                    };
                    record.with(*column, value)
                })
        })
        .collect())
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote_jobs_projects_fixed_columns() {
        let body = r#"{
            "job-count": 2,
            "jobs": [
                {
                    "id": 1911234,
                    "url": "https://remotive.com/remote-jobs/software-dev/rust-engineer-1911234",
                    "title": "Rust Engineer",
                    "company_name": "Ferrous",
                    "company_logo": "https://remotive.com/logo.png",
                    "category": "Software Development",
                    "tags": ["rust", "tokio"],
                    "job_type": "full_time",
                    "publication_date": "2026-10-14T09:12:44",
                    "candidate_required_location": "Worldwide",
                    "salary": "",
                    "description": "<p>Write Rust.</p>"
                },
                {
                    "id": 1911235,
                    "url": "https://remotive.com/remote-jobs/data/analyst-1911235",
                    "title": "Data Analyst",
                    "company_name": "Initech",
                    "category": "Data",
                    "job_type": null,
                    "publication_date": "2026-10-13T10:00:00"
                }
            ]
        }"#;

        let batch = parse_remote_jobs(body).expect("Failed to parse payload");

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.columns(), &REMOTIVE_COLUMNS);

        let first = &batch.records()[0];
        assert_eq!(first.get("title"), "Rust Engineer");
        assert_eq!(first.get("company_name"), "Ferrous");
        assert_eq!(first.get("description"), "<p>Write Rust.</p>");
        assert_eq!(first.source(), "remotive");
        assert!(!first.contains("tags"));

        let second = &batch.records()[1];
        assert_eq!(second.get("job_type"), "");
        assert_eq!(second.get("description"), "");
        assert!(second.contains("description"));
    }

    #[test]
    fn test_parse_remote_jobs_column_missing_everywhere() {
        let body = r#"{"jobs": [{"title": "a", "company_name": "b", "url": "c"}]}"#;
        let err = parse_remote_jobs(body).expect_err("should reject payload");
        assert!(matches!(err, RemoteApiError::MissingField("category")));
    }

    #[test]
    fn test_parse_remote_jobs_without_jobs_key() {
        let batch = parse_remote_jobs(r#"{"message": "rate limited"}"#).expect("should parse");
        assert!(batch.is_empty());
    }

    #[test]
    fn test_parse_remote_jobs_malformed() {
        let err = parse_remote_jobs("<html>502 Bad Gateway</html>").expect_err("not json");
        assert!(matches!(err, RemoteApiError::MalformedPayload(_)));
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&Value::Null), "");
        assert_eq!(value_text(&serde_json::json!(42)), "42");
        assert_eq!(value_text(&serde_json::json!(true)), "true");
        assert_eq!(value_text(&serde_json::json!("x")), "x");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_degrades_to_empty_fetch() {
        let adapter = RemoteApiAdapter::new("http://127.0.0.1:1/api/remote-jobs")
            .expect("client should build");
        let query = crate::config::Config::default().query;

        let fetch = adapter.fetch(&query).await;

        assert!(fetch.batch.is_empty());
        assert_eq!(fetch.failures.len(), 1);
        assert_eq!(fetch.failures[0].source, "remotive");
    }
}
