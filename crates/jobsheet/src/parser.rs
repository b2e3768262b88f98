use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::types::JobRecord;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Blocked by {0}: received a challenge page instead of results")]
    Blocked(&'static str),
}

static RE_LINKEDIN_JOB_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:-|/view/)(\d{6,})(?:[/?]|$)").expect("invalid regex: linkedin job id")
});

static SEL_LINKEDIN_CARD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.base-search-card").expect("invalid selector"));
static SEL_LINKEDIN_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.base-card__full-link").expect("invalid selector"));
static SEL_LINKEDIN_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3.base-search-card__title").expect("invalid selector"));
static SEL_LINKEDIN_COMPANY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h4.base-search-card__subtitle").expect("invalid selector"));
static SEL_LINKEDIN_LOCATION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.job-search-card__location").expect("invalid selector"));
static SEL_TIME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("time").expect("invalid selector"));
static SEL_LINKEDIN_DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.show-more-less-html__markup").expect("invalid selector")
});

static SEL_INDEED_CARD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.job_seen_beacon").expect("invalid selector"));
static SEL_INDEED_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2.jobTitle a").expect("invalid selector"));
static SEL_INDEED_COMPANY: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("[data-testid='company-name']").expect("invalid selector")
});
static SEL_INDEED_LOCATION: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("[data-testid='text-location']").expect("invalid selector")
});
static SEL_INDEED_SNIPPET: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.job-snippet").expect("invalid selector"));

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<Vec<_>>().join(" ")
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn select_text(card: ElementRef, selector: &Selector) -> String {
    card.select(selector)
        .next()
        .map(|e| normalize_whitespace(&elem_text(e)))
        .unwrap_or_default()
}

/// Drops tracking parameters from a posting link.
fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

pub fn linkedin_job_id(url: &str) -> Option<String> {
    RE_LINKEDIN_JOB_ID
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parses one page of LinkedIn's guest search results.
pub fn parse_linkedin_cards(html: &str) -> Vec<JobRecord> {
    let document = Html::parse_fragment(html);
    let mut records = Vec::new();

    for card in document.select(&SEL_LINKEDIN_CARD) {
        match parse_linkedin_card(card) {
            Ok(record) => records.push(record),
            Err(e) => log::warn!("Skipping LinkedIn card: {}", e),
        }
    }

    records
}

fn parse_linkedin_card(card: ElementRef) -> Result<JobRecord, ParseError> {
    let title = select_text(card, &SEL_LINKEDIN_TITLE);
    if title.is_empty() {
        return Err(ParseError::MissingField("title".to_string()));
    }

    let job_url = card
        .select(&SEL_LINKEDIN_LINK)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| strip_query(href.trim()).to_string())
        .ok_or_else(|| ParseError::MissingField(format!("job link for '{}'", title)))?;

    let date_posted = card
        .select(&SEL_TIME)
        .next()
        .and_then(|t| t.value().attr("datetime"))
        .unwrap_or_default()
        .to_string();

    Ok(JobRecord::new()
        .with("id", linkedin_job_id(&job_url).unwrap_or_default())
        .with("title", title)
        .with("company", select_text(card, &SEL_LINKEDIN_COMPANY))
        .with("location", select_text(card, &SEL_LINKEDIN_LOCATION))
        .with("date_posted", date_posted)
        .with("job_url", job_url))
}

/// Extracts the description body from a LinkedIn posting page.
pub fn parse_linkedin_description(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&SEL_LINKEDIN_DESCRIPTION)
        .next()
        .map(|e| normalize_whitespace(&elem_text(e)))
        .filter(|d| !d.is_empty())
}

/// Parses an Indeed search result page. `host` is used to build absolute
/// posting links from each card's job key.
pub fn parse_indeed_cards(html: &str, host: &str) -> Result<Vec<JobRecord>, ParseError> {
    let document = Html::parse_document(html);

    let cards: Vec<_> = document.select(&SEL_INDEED_CARD).collect();
    if cards.is_empty() && html.contains("challenge-platform") {
        return Err(ParseError::Blocked("Indeed"));
    }

    let mut records = Vec::new();
    for card in cards {
        match parse_indeed_card(card, host) {
            Ok(record) => records.push(record),
            Err(e) => log::warn!("Skipping Indeed card: {}", e),
        }
    }
    Ok(records)
}

fn parse_indeed_card(card: ElementRef, host: &str) -> Result<JobRecord, ParseError> {
    let link = card
        .select(&SEL_INDEED_TITLE)
        .next()
        .ok_or_else(|| ParseError::MissingField("title".to_string()))?;

    let title = normalize_whitespace(&elem_text(link));
    if title.is_empty() {
        return Err(ParseError::MissingField("title".to_string()));
    }

    let job_key = link
        .value()
        .attr("data-jk")
        .ok_or_else(|| ParseError::MissingField(format!("job key for '{}'", title)))?;

    Ok(JobRecord::new()
        .with("id", job_key)
        .with("title", title)
        .with("company", select_text(card, &SEL_INDEED_COMPANY))
        .with("location", select_text(card, &SEL_INDEED_LOCATION))
        .with("job_url", format!("https://{}/viewjob?jk={}", host, job_key))
        .with("description", select_text(card, &SEL_INDEED_SNIPPET)))
}
