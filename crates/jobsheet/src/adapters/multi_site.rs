use super::SourceAdapter;
use crate::scraper::SiteScraper;
use crate::types::{JobBatch, SOURCE_COLUMN, SearchQuery, Site, SourceFailure, SourceFetch};

use async_trait::async_trait;

/// Scrapes each configured site in turn and tags records with the site slug.
pub struct MultiSiteAdapter<S> {
    scraper: S,
}

impl<S: SiteScraper> MultiSiteAdapter<S> {
    pub fn new(scraper: S) -> Self {
        Self { scraper }
    }
}

#[async_trait]
impl<S: SiteScraper> SourceAdapter for MultiSiteAdapter<S> {
    fn name(&self) -> &str {
        "multi-site"
    }

    async fn fetch(&self, query: &SearchQuery) -> SourceFetch {
        let mut batch = JobBatch::new();
        let mut failures = Vec::new();

        for name in &query.sites {
            log::info!("Scraping site: {}", name);

            let site = match name.parse::<Site>() {
                Ok(site) => site,
                Err(e) => {
                    log::warn!("Failed to fetch from {}: {}", name, e);
                    failures.push(SourceFailure {
                        source: name.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match self.scraper.scrape(site, query).await {
                Ok(records) => {
                    log::info!("Fetched {} jobs from {}", records.len(), site);
                    for mut record in records {
                        record.set(SOURCE_COLUMN, site.slug());
                        batch.push(record);
                    }
                }
                Err(e) => {
                    log::warn!("Failed to fetch from {}: {}", site.slug(), e);
                    failures.push(SourceFailure {
                        source: site.slug().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if batch.is_empty() {
            log::warn!("No jobs fetched from any scraped site.");
        } else {
            log::info!("Fetched {} jobs from scraped sites", batch.len());
        }

        SourceFetch { batch, failures }
    }
}
