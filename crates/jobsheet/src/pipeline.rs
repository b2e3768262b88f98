use crate::adapters::SourceAdapter;
use crate::aggregate::combine;
use crate::sheets::SheetAppender;
use crate::types::{Destination, SearchQuery, SourceFailure, UploadResult};

use chrono::Local;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;

pub const DATE_FETCHED_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Uploaded(UploadResult),
    /// Dry run: the rows that would have been appended.
    DryRun(Vec<Vec<String>>),
    NothingToUpload,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub date_fetched: String,
    pub fetched: usize,
    pub failures: Vec<SourceFailure>,
    pub outcome: RunOutcome,
}

impl RunReport {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, RunOutcome::Failed(_))
    }
}

/// Runs every adapter in order, merges their batches and appends the
/// result to the destination sheet.
pub struct Pipeline {
    adapters: Vec<Box<dyn SourceAdapter>>,
    appender: SheetAppender,
    destination: Destination,
    query: SearchQuery,
    dry_run: bool,
}

impl Pipeline {
    pub fn new(query: SearchQuery, destination: Destination, appender: SheetAppender) -> Self {
        Self {
            adapters: Vec::new(),
            appender,
            destination,
            query,
            dry_run: false,
        }
    }

    pub fn with_adapter(mut self, adapter: impl SourceAdapter + 'static) -> Self {
        self.adapters.push(Box::new(adapter));
        self
    }

    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    pub async fn run(&self) -> RunReport {
        let date_fetched = Local::now().format(DATE_FETCHED_FORMAT).to_string();
        self.run_dated(date_fetched).await
    }

    /// Same as [`run`](Self::run) with the fetch date fixed by the caller.
    pub async fn run_dated(&self, date_fetched: String) -> RunReport {
        let mut batches = Vec::with_capacity(self.adapters.len());
        let mut failures = Vec::new();

        for adapter in &self.adapters {
            match AssertUnwindSafe(adapter.fetch(&self.query))
                .catch_unwind()
                .await
            {
                Ok(fetch) => {
                    failures.extend(fetch.failures);
                    batches.push(fetch.batch);
                }
                Err(panic) => {
                    let reason = panic_message(panic.as_ref());
                    log::error!("Source {} panicked: {}", adapter.name(), reason);
                    failures.push(SourceFailure {
                        source: adapter.name().to_string(),
                        reason,
                    });
                }
            }
        }

        let combined = combine(batches);
        let fetched = combined.len();

        let outcome = if combined.is_empty() {
            log::warn!("No jobs fetched from any source. Nothing to upload.");
            RunOutcome::NothingToUpload
        } else if self.dry_run {
            let rows = SheetAppender::payload(combined, &date_fetched);
            log::info!(
                "Dry run: {} rows ready for {}, skipping upload.",
                rows.len() - 1,
                self.destination.range
            );
            RunOutcome::DryRun(rows)
        } else {
            log::info!("Uploading {} jobs fetched on {}", fetched, date_fetched);
            match self
                .appender
                .append(combined, &self.destination, &date_fetched)
                .await
            {
                Ok(result) => RunOutcome::Uploaded(result),
                Err(e) => {
                    log::error!("CRITICAL: Job run failed: {}", e);
                    RunOutcome::Failed(e.to_string())
                }
            }
        };

        RunReport {
            date_fetched,
            fetched,
            failures,
            outcome,
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
