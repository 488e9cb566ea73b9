//! Feed retrieval and parsing into plain entries.

use std::sync::Arc;

use freeleech_core::FeedEntry;
use thiserror::Error;

use crate::{FetchError, Fetcher};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("feed could not be parsed: {0}")]
    Parse(#[from] feed_rs::parser::ParseFeedError),
}

/// Source of feed entries, newest first as published.
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_entries(&self) -> Result<Vec<FeedEntry>, FeedError>;
}

/// Fetches the feed document over HTTP and parses RSS or Atom.
pub struct HttpFeedSource {
    url: String,
    fetcher: Arc<dyn Fetcher>,
}

impl HttpFeedSource {
    pub fn new(url: impl Into<String>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            url: url.into(),
            fetcher,
        }
    }
}

#[async_trait::async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_entries(&self) -> Result<Vec<FeedEntry>, FeedError> {
        let output = self.fetcher.fetch(&self.url).await?;
        parse_entries(&output.bytes)
    }
}

pub fn parse_entries(document: &[u8]) -> Result<Vec<FeedEntry>, FeedError> {
    let feed = feed_rs::parser::parse(document)?;
    Ok(feed.entries.into_iter().map(into_entry).collect())
}

fn into_entry(entry: feed_rs::model::Entry) -> FeedEntry {
    FeedEntry {
        id: Some(entry.id).filter(|id| !id.is_empty()),
        tags: entry.categories.into_iter().map(|c| c.term).collect(),
        title: entry.title.map(|t| t.content),
        link: entry.links.into_iter().next().map(|l| l.href),
    }
}
