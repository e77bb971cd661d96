//! RSS/Atom feed client
//!
//! Fetches a feed over HTTP (or from disk) and resolves every entry into a
//! [`ParseOutcome`] exactly once, so nothing downstream has to guess at
//! missing or malformed fields.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use headline_core::{NewsEntry, ParseOutcome};

use crate::error::{FeedError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "Headlines/0.2";

/// One feed after parsing
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedFeed {
    /// Feed title as published by the source
    pub title: String,
    /// One outcome per entry, in feed order
    pub outcomes: Vec<ParseOutcome>,
}

/// Anything that can turn a feed location into parsed entries
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<FetchedFeed>;
}

/// HTTP feed client
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    async fn fetch_remote(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| FeedError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FeedError::ApiError {
                status: response.status().as_u16(),
                message: format!("Failed to fetch {}", url),
            });
        }

        let content = response
            .bytes()
            .await
            .map_err(|e| FeedError::RequestFailed(e.to_string()))?;
        Ok(content.to_vec())
    }
}

impl Default for FeedClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    /// Fetch and parse one feed
    ///
    /// `http(s)` URLs go over the network; `file://` URLs and bare paths are
    /// read from disk.
    #[instrument(skip(self))]
    async fn fetch(&self, location: &str) -> Result<FetchedFeed> {
        let content = match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => self.fetch_remote(&url).await?,
            Ok(url) if url.scheme() == "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| FeedError::ParseError(format!("Invalid file URL: {}", location)))?;
                tokio::fs::read(path).await?
            }
            _ => tokio::fs::read(location).await?,
        };

        let feed = parse_feed(&content, location)?;
        debug!("{} entries: {}", feed.title, feed.outcomes.len());
        Ok(feed)
    }
}

/// Parse a feed body as RSS, falling back to Atom
///
/// `source` is recorded on every entry as the base it was read from.
pub fn parse_feed(content: &[u8], source: &str) -> Result<FetchedFeed> {
    if let Ok(channel) = rss::Channel::read_from(content) {
        return Ok(FetchedFeed {
            title: channel.title().to_string(),
            outcomes: channel
                .items()
                .iter()
                .map(|item| resolve_rss_item(item, source))
                .collect(),
        });
    }

    if let Ok(atom_feed) = atom_syndication::Feed::read_from(content) {
        return Ok(FetchedFeed {
            title: atom_feed.title().as_str().to_string(),
            outcomes: atom_feed
                .entries()
                .iter()
                .map(|entry| resolve_atom_entry(entry, source))
                .collect(),
        });
    }

    Err(FeedError::ParseError(format!("Failed to parse feed: {}", source)))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn resolve_rss_item(item: &rss::Item, source: &str) -> ParseOutcome {
    let Some(title) = non_empty(item.title()) else {
        return ParseOutcome::MissingField("title");
    };
    let Some(link) = non_empty(item.link()) else {
        return ParseOutcome::MissingField("link");
    };
    // Some feeds only carry dc:date
    let dc_date = item
        .dublin_core_ext()
        .and_then(|dc| dc.dates().first())
        .map(String::as_str);
    let Some(published) = non_empty(item.pub_date()).or_else(|| non_empty(dc_date)) else {
        return ParseOutcome::MissingField("published");
    };

    build_entry(title, link, published, source)
}

fn resolve_atom_entry(entry: &atom_syndication::Entry, source: &str) -> ParseOutcome {
    let Some(title) = non_empty(Some(entry.title().as_str())) else {
        return ParseOutcome::MissingField("title");
    };
    let Some(link) = non_empty(entry.links().first().map(|l| l.href())) else {
        return ParseOutcome::MissingField("link");
    };
    let published = entry.published().unwrap_or_else(|| entry.updated()).to_rfc3339();

    build_entry(title, link, &published, source)
}

fn build_entry(title: &str, link: &str, published: &str, source: &str) -> ParseOutcome {
    match parse_published(published) {
        Some(published_at) => ParseOutcome::Ok(NewsEntry {
            title: title.to_string(),
            link: link.to_string(),
            published: published.to_string(),
            published_at,
            source: source.to_string(),
        }),
        None => ParseOutcome::Unparseable(format!("published date '{}'", published)),
    }
}

/// Parse a feed date: RFC 2822, RFC 3339, or a bare `YYYY-MM-DD`
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}
