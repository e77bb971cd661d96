//! Title data loading
//!
//! Reads the list of feed sources, fetches each feed and keeps the recent,
//! well-formed entries keyed by title.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use itertools::Itertools;
use tracing::{debug, info, instrument, warn};

use headline_core::{NewsEntry, ParseOutcome};

use crate::error::Result;
use crate::rss_client::FeedSource;

/// Entries older than this many days are dropped
pub const DEFAULT_DATE_RANGE_DAYS: i64 = 14;

const TOP_FEEDS_LOGGED: usize = 10;

/// Read feed locations from a file, one per line
pub fn load_rss_sources(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let sources: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    debug!("Loaded {} feed sources from {}", sources.len(), path.as_ref().display());
    Ok(sources)
}

/// True if `published_at` falls less than `days` whole days before `today`
pub fn within_date_range(published_at: DateTime<Utc>, today: NaiveDate, days: i64) -> bool {
    (today - published_at.date_naive()).num_days() < days
}

/// Kept entries per feed title, in fetch order
pub type FeedEntries = IndexMap<String, Vec<NewsEntry>>;

/// Result of [`build_title_data`]
#[derive(Debug, Clone, Default)]
pub struct LoadedTitles {
    /// Title -> entry map fed to grouping
    pub title_data: IndexMap<String, NewsEntry>,
    /// Every kept entry, before title de-duplication
    pub entries: FeedEntries,
}

/// Log a summary of what was loaded
pub fn log_entries(entries: &FeedEntries) {
    let total: usize = entries.values().map(Vec::len).sum();
    info!("Loaded {} titles from {} feeds", total, entries.len());

    for (feed, count) in entries
        .iter()
        .map(|(feed, kept)| (feed, kept.len()))
        .sorted_by(|(fa, ca), (fb, cb)| cb.cmp(ca).then_with(|| fa.cmp(fb)))
        .take(TOP_FEEDS_LOGGED)
    {
        debug!("  {:>4}  {}", count, feed);
    }
}

/// Fetch every source and build the title -> entry map
///
/// Sources that fail are logged and skipped. Entries that did not resolve
/// cleanly, or fall outside the date range, are dropped. A title seen again
/// keeps its first position but takes the later entry. The per-feed entries
/// are returned alongside for the debug dump.
#[instrument(skip(sources, client), fields(sources = sources.len()))]
pub async fn build_title_data(
    sources: &[String],
    client: &dyn FeedSource,
    date_range_days: i64,
    today: NaiveDate,
) -> LoadedTitles {
    let mut title_data: IndexMap<String, NewsEntry> = IndexMap::new();
    let mut entries = FeedEntries::new();
    let mut skipped = 0usize;
    let mut stale = 0usize;

    for source in sources {
        let feed = match client.fetch(source).await {
            Ok(feed) => feed,
            Err(e) => {
                warn!("Failed to fetch feed {}: {}", source, e);
                continue;
            }
        };

        let mut kept = Vec::new();
        for outcome in feed.outcomes {
            match outcome {
                ParseOutcome::Ok(entry) => {
                    if !within_date_range(entry.published_at, today, date_range_days) {
                        stale += 1;
                        continue;
                    }
                    title_data.insert(entry.title.clone(), entry.clone());
                    kept.push(entry);
                }
                ParseOutcome::MissingField(field) => {
                    skipped += 1;
                    debug!("Skipping entry in {}: missing {}", source, field);
                }
                ParseOutcome::Unparseable(reason) => {
                    skipped += 1;
                    debug!("Skipping entry in {}: unparseable {}", source, reason);
                }
            }
        }
        entries.entry(feed.title).or_default().extend(kept);
    }

    if skipped > 0 || stale > 0 {
        info!("Dropped {} malformed and {} out-of-range entries", skipped, stale);
    }
    log_entries(&entries);
    LoadedTitles {
        title_data,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::rss_client::FetchedFeed;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::io::Write;

    fn entry(title: &str, date: &str, link: &str) -> ParseOutcome {
        let published_at = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc();
        ParseOutcome::Ok(NewsEntry {
            title: title.to_string(),
            link: link.to_string(),
            published: date.to_string(),
            published_at,
            source: "test".to_string(),
        })
    }

    struct StaticFeeds(HashMap<String, FetchedFeed>);

    #[async_trait]
    impl FeedSource for StaticFeeds {
        async fn fetch(&self, location: &str) -> Result<FetchedFeed> {
            self.0.get(location).cloned().ok_or(FeedError::ApiError {
                status: 404,
                message: location.to_string(),
            })
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 25).unwrap()
    }

    #[test]
    fn test_load_rss_sources_trims_and_skips_blank() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "https://a.example.com/rss  ").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  https://b.example.com/feed").unwrap();

        let sources = load_rss_sources(file.path()).unwrap();
        assert_eq!(sources, vec!["https://a.example.com/rss", "https://b.example.com/feed"]);
    }

    #[test]
    fn test_load_rss_sources_missing_file() {
        assert!(matches!(
            load_rss_sources("/nonexistent/rss.txt"),
            Err(FeedError::Io(_))
        ));
    }

    #[test]
    fn test_within_date_range() {
        let at = |d: &str| {
            NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .unwrap()
                .and_hms_opt(23, 0, 0)
                .unwrap()
                .and_utc()
        };
        assert!(within_date_range(at("2024-11-25"), today(), 14));
        assert!(within_date_range(at("2024-11-12"), today(), 14));
        assert!(!within_date_range(at("2024-11-11"), today(), 14));
        // Future-dated entries are kept
        assert!(within_date_range(at("2024-11-30"), today(), 14));
    }

    #[tokio::test]
    async fn test_build_title_data() {
        let feeds: HashMap<String, FetchedFeed> = [
            (
                "a".to_string(),
                FetchedFeed {
                    title: "Feed A".to_string(),
                    outcomes: vec![
                        entry("Fed cuts rates", "2024-11-24", "https://a/1"),
                        ParseOutcome::MissingField("title"),
                        entry("Old story", "2024-10-01", "https://a/2"),
                        entry("Shared story", "2024-11-23", "https://a/3"),
                    ],
                },
            ),
            (
                "b".to_string(),
                FetchedFeed {
                    title: "Feed B".to_string(),
                    outcomes: vec![
                        entry("Tesla stock rises", "2024-11-25", "https://b/1"),
                        entry("Shared story", "2024-11-25", "https://b/2"),
                        ParseOutcome::Unparseable("date".to_string()),
                    ],
                },
            ),
        ]
        .into_iter()
        .collect();

        let sources = vec!["a".to_string(), "missing".to_string(), "b".to_string()];
        let loaded = build_title_data(&sources, &StaticFeeds(feeds), 14, today()).await;
        let data = &loaded.title_data;

        let titles: Vec<&str> = data.keys().map(String::as_str).collect();
        assert_eq!(titles, vec!["Fed cuts rates", "Shared story", "Tesla stock rises"]);
        assert_eq!(data["Shared story"].link, "https://b/2");

        // Both copies of the shared story survive in the per-feed entries
        let feeds: Vec<&str> = loaded.entries.keys().map(String::as_str).collect();
        assert_eq!(feeds, vec!["Feed A", "Feed B"]);
        let links: Vec<&str> = loaded
            .entries
            .values()
            .flatten()
            .map(|entry| entry.link.as_str())
            .collect();
        assert_eq!(links, vec!["https://a/1", "https://a/3", "https://b/1", "https://b/2"]);
    }
}
