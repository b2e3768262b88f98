use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Sheets API rejected the append ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("Invalid spreadsheet URL: {0}")]
    InvalidUrl(String),
}

/// Body of a `values.append` response; only the parts we report on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendResponse {
    pub table_range: Option<String>,
    #[serde(default)]
    pub updates: UpdateSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    pub updated_range: Option<String>,
    #[serde(default)]
    pub updated_rows: u64,
    #[serde(default)]
    pub updated_columns: u64,
    #[serde(default)]
    pub updated_cells: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: &'a [Vec<String>],
}

/// A spreadsheet that accepts appended rows.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Appends `rows` after the existing content of `range` as new rows,
    /// with values stored verbatim.
    async fn append_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
        token: &str,
        rows: &[Vec<String>],
    ) -> Result<AppendResponse, SheetsError>;
}

/// Google Sheets v4 REST client.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: Client,
    base_url: String,
}

impl SheetsClient {
    pub fn new() -> Result<Self, SheetsError> {
        Self::with_base_url(SHEETS_BASE_URL)
    }

    /// Client for a Sheets-compatible endpoint rooted at `base_url`
    /// (the `.../v4/spreadsheets` collection).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, SheetsError> {
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
            base_url: base_url.into(),
        })
    }

    pub fn append_url(&self, spreadsheet_id: &str, range: &str) -> Result<Url, SheetsError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| SheetsError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::InvalidUrl(self.base_url.clone()))?
            .push(spreadsheet_id)
            .push("values")
            .push(&format!("{}:append", range));
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");
        Ok(url)
    }
}

#[async_trait]
impl SheetStore for SheetsClient {
    async fn append_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
        token: &str,
        rows: &[Vec<String>],
    ) -> Result<AppendResponse, SheetsError> {
        let url = self.append_url(spreadsheet_id, range)?;
        let body = ValueRange {
            range,
            major_dimension: "ROWS",
            values: rows,
        };

        log::debug!("POST {} ({} rows)", url, rows.len());
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<AppendResponse>().await?)
    }
}
