//! Feed loading for the headline grouping pipeline
//!
//! This crate turns a list of feed sources into title data:
//! - RSS and Atom parsing, with each entry resolved to a `ParseOutcome`
//! - Date-range filtering and title de-duplication
//! - A per-feed summary in the logs

pub mod error;
pub mod loader;
pub mod rss_client;

pub use error::{FeedError, Result};
pub use loader::{
    build_title_data, load_rss_sources, log_entries, within_date_range, FeedEntries,
    LoadedTitles, DEFAULT_DATE_RANGE_DAYS,
};
pub use rss_client::{parse_feed, parse_published, FeedClient, FeedSource, FetchedFeed};
