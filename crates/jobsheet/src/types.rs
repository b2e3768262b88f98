use std::{fmt::Display, str::FromStr};

pub const SOURCE_COLUMN: &str = "source";
pub const DATE_FETCHED_COLUMN: &str = "date_fetched";

#[derive(Debug, thiserror::Error)]
#[error("Unknown site '{0}'. Accepted values: 'linkedin', 'indeed'")]
pub struct SiteParseError(String);

/// Job boards the multi-site scraper knows how to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Site {
    LinkedIn,
    Indeed,
}

impl Site {
    pub fn slug(&self) -> &'static str {
        match self {
            Site::LinkedIn => "linkedin",
            Site::Indeed => "indeed",
        }
    }
}

impl FromStr for Site {
    type Err = SiteParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linkedin" => Ok(Site::LinkedIn),
            "indeed" => Ok(Site::Indeed),
            _ => Err(SiteParseError(s.to_string())),
        }
    }
}

impl Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Site::LinkedIn => write!(f, "LinkedIn"),
            Site::Indeed => write!(f, "Indeed"),
        }
    }
}

/// Search options shared by every source adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Site identifiers as configured; unrecognised ones fail per site.
    pub sites: Vec<String>,
    pub search_term: String,
    pub location: String,
    pub results_wanted: usize,
    pub hours_old: u32,
    pub country_indeed: String,
    pub fetch_description: bool,
}

/// One posting as a list of named text fields.
///
/// Field order is the order in which the source produced them. Reading a
/// field that was never set yields the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobRecord {
    fields: Vec<(String, String)>,
}

impl JobRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> &str {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    pub fn source(&self) -> &str {
        self.get(SOURCE_COLUMN)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }
}

/// An ordered set of records plus the union of their columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobBatch {
    columns: Vec<String>,
    records: Vec<JobRecord>,
}

impl JobBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: JobRecord) {
        for column in record.columns() {
            if !self.columns.iter().any(|c| c == column) {
                self.columns.push(column.to_string());
            }
        }
        self.records.push(record);
    }

    pub fn append(&mut self, other: JobBatch) {
        for record in other.records {
            self.push(record);
        }
    }

    /// Sets `column` to `value` on every record, adding the column if needed.
    pub fn stamp(&mut self, column: &str, value: &str) {
        for record in &mut self.records {
            record.set(column, value);
        }
        if !self.columns.iter().any(|c| c == column) {
            self.columns.push(column.to_string());
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Header row followed by one row per record, all cells as text.
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::with_capacity(self.records.len() + 1);
        rows.push(self.columns.clone());
        for record in &self.records {
            rows.push(
                self.columns
                    .iter()
                    .map(|c| record.get(c).to_string())
                    .collect(),
            );
        }
        rows
    }
}

impl FromIterator<JobRecord> for JobBatch {
    fn from_iter<I: IntoIterator<Item = JobRecord>>(iter: I) -> Self {
        let mut batch = JobBatch::new();
        for record in iter {
            batch.push(record);
        }
        batch
    }
}

/// Why a source contributed nothing to a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: String,
    pub reason: String,
}

impl Display for SourceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source, self.reason)
    }
}

/// Result of one adapter call. Never an error: failed sources degrade to
/// an empty contribution with the reason kept in `failures`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFetch {
    pub batch: JobBatch,
    pub failures: Vec<SourceFailure>,
}

impl SourceFetch {
    pub fn ok(batch: JobBatch) -> Self {
        Self {
            batch,
            failures: Vec::new(),
        }
    }

    pub fn failed(source: impl Into<String>, reason: impl Display) -> Self {
        Self {
            batch: JobBatch::new(),
            failures: vec![SourceFailure {
                source: source.into(),
                reason: reason.to_string(),
            }],
        }
    }
}

/// Spreadsheet and range that rows are appended to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub spreadsheet_id: String,
    pub range: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub rows: u64,
    pub range: String,
}

impl Display for UploadResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} row(s) appended to {}", self.rows, self.range)
    }
}
