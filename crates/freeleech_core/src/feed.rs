//! Feed entries and the candidates derived from them.

use url::Url;

use crate::filename::{sanitize_stem, TORRENT_EXTENSION};

pub const UNKNOWN_CATEGORY: &str = "Unknown";

const DOWNLOAD_BASE: &str = "https://www.torrentleech.org/rss/download/";

/// One entry as returned by the feed fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedEntry {
    pub id: Option<String>,
    pub tags: Vec<String>,
    pub title: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedCandidate {
    pub identifier: String,
    pub category: String,
    pub title: String,
    /// Empty when the entry had no link.
    pub link: String,
}

impl FeedCandidate {
    /// Derive a candidate; entries without a usable identifier yield `None`.
    pub fn from_entry(entry: &FeedEntry) -> Option<Self> {
        let identifier = entry.id.as_deref().and_then(trailing_segment)?.to_string();
        let category = entry
            .tags
            .first()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .unwrap_or(UNKNOWN_CATEGORY)
            .to_string();
        let title = entry
            .title
            .clone()
            .unwrap_or_else(|| default_title(&identifier));
        Some(Self {
            identifier,
            category,
            title,
            link: entry.link.clone().unwrap_or_default(),
        })
    }
}

/// Title used when none is known.
pub fn default_title(identifier: &str) -> String {
    format!("torrent_{identifier}")
}

/// Last `/`-separated segment, if non-empty.
pub fn trailing_segment(value: &str) -> Option<&str> {
    value.rsplit('/').next().filter(|s| !s.is_empty())
}

/// The personal feed key: the last non-empty path segment of the feed URL.
pub fn feed_key(feed_url: &Url) -> Option<&str> {
    feed_url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
}

/// Download URL for an item seen only on the live channel.
pub fn announce_download_url(feed_url: &Url, identifier: &str, title: &str) -> Option<Url> {
    let key = feed_key(feed_url)?;
    let mut url = Url::parse(DOWNLOAD_BASE).ok()?;
    let file = format!("{}{TORRENT_EXTENSION}", sanitize_stem(title));
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend([identifier, key, file.as_str()]);
    Some(url)
}
