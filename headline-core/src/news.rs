//! Feed entry data structures consumed by the grouping pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fully-validated feed entry
///
/// Produced once at the feed boundary; everything downstream of the loader
/// only ever sees this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsEntry {
    /// Headline text
    pub title: String,
    /// Article URL
    pub link: String,
    /// Publication date exactly as the feed reported it
    pub published: String,
    /// Parsed publication date
    pub published_at: DateTime<Utc>,
    /// Base URL of the feed the entry came from
    pub source: String,
}

/// Leaf of the published visualization
///
/// Exactly four string fields; changing this shape requires a version bump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub timestamp: String,
    pub source: String,
}

impl From<&NewsEntry> for Article {
    fn from(entry: &NewsEntry) -> Self {
        Self {
            title: entry.title.clone(),
            link: entry.link.clone(),
            timestamp: entry.published.clone(),
            source: entry.source.clone(),
        }
    }
}

/// Result of resolving one raw feed entry
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// Entry had every required field
    Ok(NewsEntry),
    /// A required field was absent or empty
    MissingField(&'static str),
    /// A field was present but could not be interpreted
    Unparseable(String),
}

impl ParseOutcome {
    /// Returns the entry if parsing succeeded
    pub fn entry(self) -> Option<NewsEntry> {
        match self {
            ParseOutcome::Ok(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ParseOutcome::Ok(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> NewsEntry {
        NewsEntry {
            title: "Trump picks new attorney general".to_string(),
            link: "https://example.com/news1".to_string(),
            published: "Mon, 25 Nov 2024 08:03:10 +0000".to_string(),
            published_at: DateTime::parse_from_rfc2822("Mon, 25 Nov 2024 08:03:10 +0000")
                .unwrap()
                .with_timezone(&Utc),
            source: "https://example.com/rss".to_string(),
        }
    }

    #[test]
    fn test_article_from_entry_keeps_raw_timestamp() {
        let article = Article::from(&entry());
        assert_eq!(article.timestamp, "Mon, 25 Nov 2024 08:03:10 +0000");
        assert_eq!(article.source, "https://example.com/rss");
    }

    #[test]
    fn test_article_has_exactly_four_fields() {
        let value = serde_json::to_value(Article::from(&entry())).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 4);
        for key in ["title", "link", "timestamp", "source"] {
            assert!(object[key].is_string(), "{} should be a string", key);
        }
    }

    #[test]
    fn test_parse_outcome_entry() {
        assert!(ParseOutcome::Ok(entry()).entry().is_some());
        assert!(ParseOutcome::MissingField("title").entry().is_none());
        assert!(!ParseOutcome::Unparseable("bad date".to_string()).is_ok());
    }
}
