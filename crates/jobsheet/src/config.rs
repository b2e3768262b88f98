use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::types::{Destination, SearchQuery};

pub const DEFAULT_SERVICE_ACCOUNT_FILE: &str = "google-creds.json";
pub const DEFAULT_SPREADSHEET_ID: &str = "1Hof8HBclectKVqk6LL7e5OngRj2Q_TuGSRcQ8DUKYZY";
pub const DEFAULT_SHEET_RANGE: &str = "Sheet1!A1";
pub const DEFAULT_SEARCH_TERM: &str = "software engineer intern";
pub const DEFAULT_LOCATION: &str = "India";
pub const DEFAULT_RESULTS_WANTED: usize = 100;
pub const DEFAULT_HOURS_OLD: u32 = 72;
pub const DEFAULT_JOB_SITES: &str = "linkedin,indeed";
pub const DEFAULT_COUNTRY_INDEED: &str = "India";
pub const DEFAULT_REMOTIVE_URL: &str = "https://remotive.io/api/remote-jobs";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything a run needs, read once at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub service_account_file: PathBuf,
    pub destination: Destination,
    pub query: SearchQuery,
    pub remotive_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_account_file: PathBuf::from(DEFAULT_SERVICE_ACCOUNT_FILE),
            destination: Destination {
                spreadsheet_id: DEFAULT_SPREADSHEET_ID.to_string(),
                range: DEFAULT_SHEET_RANGE.to_string(),
            },
            query: SearchQuery {
                sites: split_sites(DEFAULT_JOB_SITES),
                search_term: DEFAULT_SEARCH_TERM.to_string(),
                location: DEFAULT_LOCATION.to_string(),
                results_wanted: DEFAULT_RESULTS_WANTED,
                hours_old: DEFAULT_HOURS_OLD,
                country_indeed: DEFAULT_COUNTRY_INDEED.to_string(),
                fetch_description: true,
            },
            remotive_url: DEFAULT_REMOTIVE_URL.to_string(),
        }
    }
}

impl Config {
    /// Reads the process environment, loading `.env` first if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup, falling back to
    /// the defaults for anything unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let string = |key: &str, default: String| lookup(key).unwrap_or(default);

        Ok(Self {
            service_account_file: lookup("SERVICE_ACCOUNT_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.service_account_file),
            destination: Destination {
                spreadsheet_id: string("SPREADSHEET_ID", defaults.destination.spreadsheet_id),
                range: string("SHEET_RANGE", defaults.destination.range),
            },
            query: SearchQuery {
                sites: lookup("JOB_SITES")
                    .map(|s| split_sites(&s))
                    .unwrap_or(defaults.query.sites),
                search_term: string("SEARCH_TERM", defaults.query.search_term),
                location: string("LOCATION", defaults.query.location),
                results_wanted: parsed(
                    "RESULTS_WANTED",
                    lookup("RESULTS_WANTED"),
                    defaults.query.results_wanted,
                )?,
                hours_old: parsed("HOURS_OLD", lookup("HOURS_OLD"), defaults.query.hours_old)?,
                country_indeed: string("COUNTRY_INDEED", defaults.query.country_indeed),
                fetch_description: parsed(
                    "LINKEDIN_FETCH_DESCRIPTION",
                    lookup("LINKEDIN_FETCH_DESCRIPTION"),
                    defaults.query.fetch_description,
                )?,
            },
            remotive_url: string("REMOTIVE_URL", defaults.remotive_url),
        })
    }
}

fn split_sites(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parsed<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .to_lowercase()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key,
                value: raw,
                reason: e.to_string(),
            }),
    }
}
