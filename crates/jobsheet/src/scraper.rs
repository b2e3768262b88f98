use crate::parser::{
    ParseError, linkedin_job_id, parse_indeed_cards, parse_linkedin_cards,
    parse_linkedin_description,
};
use crate::types::{JobRecord, SearchQuery, Site};

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::collections::HashSet;
use std::time::Duration;

const LINKEDIN_BASE_URL: &str = "https://www.linkedin.com";
const LINKEDIN_MAX_START: usize = 1000;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Unsupported Indeed country '{0}'")]
    UnsupportedCountry(String),
}

/// Fetches postings from a single job board.
#[async_trait]
pub trait SiteScraper: Send + Sync {
    async fn scrape(&self, site: Site, query: &SearchQuery)
    -> Result<Vec<JobRecord>, ScraperError>;
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    linkedin_base_url: String,
    indeed_base_url: Option<String>,
}

impl WebScraper {
    pub fn new() -> Result<Self, ScraperError> {
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
            linkedin_base_url: LINKEDIN_BASE_URL.to_string(),
            indeed_base_url: None,
        })
    }

    pub fn with_linkedin_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.linkedin_base_url = base_url.into();
        self
    }

    /// Sends Indeed searches to `base_url` instead of the country host.
    /// Posting links are still built from the country host.
    pub fn with_indeed_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.indeed_base_url = Some(base_url.into());
        self
    }

    pub async fn fetch_linkedin(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<JobRecord>, ScraperError> {
        let endpoint = format!(
            "{}/jobs-guest/jobs/api/seeMoreJobPostings/search",
            self.linkedin_base_url
        );
        let recency = format!("r{}", u64::from(query.hours_old) * 3600);
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        let mut start = 0;

        while records.len() < query.results_wanted && start < LINKEDIN_MAX_START {
            let start_param = start.to_string();
            let url = Url::parse_with_params(
                &endpoint,
                &[
                    ("keywords", query.search_term.as_str()),
                    ("location", query.location.as_str()),
                    ("f_TPR", recency.as_str()),
                    ("start", start_param.as_str()),
                ],
            )
            .map_err(|e| ScraperError::InvalidUrl(e.to_string()))?;

            log::info!("Fetching LinkedIn results from offset {}...", start);
            let html = self.get_html(url.as_str()).await?;
            let page = parse_linkedin_cards(&html);
            if page.is_empty() {
                break;
            }
            start += page.len();
            // The guest endpoint repeats postings across pages.
            records.extend(
                page.into_iter()
                    .filter(|r| r.get("id").is_empty() || seen.insert(r.get("id").to_string())),
            );
        }

        records.truncate(query.results_wanted);

        if query.fetch_description {
            log::info!("Fetching {} LinkedIn description(s)...", records.len());
            for record in &mut records {
                let Some(id) = linkedin_job_id(record.get("job_url")) else {
                    continue;
                };
                let url = format!("{}/jobs/view/{}", self.linkedin_base_url, id);
                match self.get_html(&url).await {
                    Ok(html) => {
                        let description = parse_linkedin_description(&html).unwrap_or_default();
                        record.set("description", description);
                    }
                    Err(e) => {
                        log::warn!("Failed to fetch description for {}: {}", url, e);
                        record.set("description", "");
                    }
                }
            }
        }

        Ok(records)
    }

    pub async fn fetch_indeed(&self, query: &SearchQuery) -> Result<Vec<JobRecord>, ScraperError> {
        let host = indeed_host(&query.country_indeed)?;
        let days = query.hours_old.div_ceil(24).max(1).to_string();
        let base_url = self
            .indeed_base_url
            .clone()
            .unwrap_or_else(|| format!("https://{}", host));
        let url = Url::parse_with_params(
            &format!("{}/jobs", base_url),
            &[
                ("q", query.search_term.as_str()),
                ("l", query.location.as_str()),
                ("fromage", days.as_str()),
            ],
        )
        .map_err(|e| ScraperError::InvalidUrl(e.to_string()))?;

        log::info!("Fetching Indeed results from {}...", host);
        let html = self.get_html(url.as_str()).await?;
        let mut records = parse_indeed_cards(&html, &host)?;
        records.truncate(query.results_wanted);
        Ok(records)
    }

    async fn get_html(&self, url: &str) -> Result<String, ScraperError> {
        Ok(self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?
            .error_for_status()?
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?)
    }
}

#[async_trait]
impl SiteScraper for WebScraper {
    async fn scrape(
        &self,
        site: Site,
        query: &SearchQuery,
    ) -> Result<Vec<JobRecord>, ScraperError> {
        match site {
            Site::LinkedIn => self.fetch_linkedin(query).await,
            Site::Indeed => self.fetch_indeed(query).await,
        }
    }
}

/// Maps a country name or two-letter code onto its Indeed host.
pub fn indeed_host(country: &str) -> Result<String, ScraperError> {
    let country = country.trim().to_lowercase();
    let code = match country.as_str() {
        "usa" | "us" | "united states" => return Ok("www.indeed.com".to_string()),
        "india" => "in",
        "uk" | "united kingdom" => "uk",
        "canada" => "ca",
        "australia" => "au",
        "germany" => "de",
        "france" => "fr",
        "singapore" => "sg",
        c if c.len() == 2 && c.chars().all(|ch| ch.is_ascii_alphabetic()) => c,
        _ => return Err(ScraperError::UnsupportedCountry(country.clone())),
    };
    Ok(format!("{}.indeed.com", code))
}
