use super::auth::{AuthError, SPREADSHEETS_SCOPE, TokenProvider};
use super::client::{SheetStore, SheetsError};
use crate::types::{DATE_FETCHED_COLUMN, Destination, JobBatch, UploadResult};

#[derive(Debug, thiserror::Error)]
pub enum AppendError {
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),
    #[error("Sheets API call failed: {0}")]
    Sheets(#[from] SheetsError),
}

/// Writes a batch to a spreadsheet as one append call.
pub struct SheetAppender {
    auth: Box<dyn TokenProvider>,
    store: Box<dyn SheetStore>,
}

impl SheetAppender {
    pub fn new(auth: impl TokenProvider + 'static, store: impl SheetStore + 'static) -> Self {
        Self {
            auth: Box::new(auth),
            store: Box::new(store),
        }
    }

    /// Rows that [`append`](Self::append) would send: a header row, then one
    /// text row per record, all stamped with `date_fetched`.
    pub fn payload(mut batch: JobBatch, date_fetched: &str) -> Vec<Vec<String>> {
        batch.stamp(DATE_FETCHED_COLUMN, date_fetched);
        batch.to_rows()
    }

    pub async fn append(
        &self,
        batch: JobBatch,
        destination: &Destination,
        date_fetched: &str,
    ) -> Result<UploadResult, AppendError> {
        log::info!("Appending data to Google Sheet...");
        self.try_append(batch, destination, date_fetched)
            .await
            .inspect(|result| log::info!("Successfully appended {} rows.", result.rows))
            .inspect_err(|e| log::error!("Failed to append to Google Sheets: {}", e))
    }

    async fn try_append(
        &self,
        batch: JobBatch,
        destination: &Destination,
        date_fetched: &str,
    ) -> Result<UploadResult, AppendError> {
        let token = self.auth.access_token(SPREADSHEETS_SCOPE).await?;
        let rows = Self::payload(batch, date_fetched);

        let response = self
            .store
            .append_rows(&destination.spreadsheet_id, &destination.range, &token, &rows)
            .await?;
        if let Some(table) = &response.table_range {
            log::debug!("Rows appended after existing table {}", table);
        }

        Ok(UploadResult {
            rows: response.updates.updated_rows,
            range: response
                .updates
                .updated_range
                .unwrap_or_else(|| destination.range.clone()),
        })
    }
}
