pub mod adapters;
pub mod aggregate;
pub mod config;
mod parser;
pub mod pipeline;
pub mod scraper;
pub mod sheets;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use pipeline::{Pipeline, RunOutcome, RunReport};
pub use scraper::WebScraper;
