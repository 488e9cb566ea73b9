//! Shared acceptance path for both detection sources.

use std::path::PathBuf;
use std::sync::Arc;

use engine_logging::targets::{IRC, RSS};
use engine_logging::{engine_debug, engine_info, engine_warn};
use freeleech_core::{
    announce_download_url, default_title, AnnounceEvent, CategoryFilter, FeedCandidate,
    ProcessedSet, SizeVerdict, Stats, UNKNOWN_CATEGORY,
};
use url::Url;

use crate::{Pipeline, SizeFilter};

/// What happened to one announcement or candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Already accepted earlier, by either source.
    Duplicate,
    FilteredCategory,
    NotFreeleech,
    NoLink,
    SkippedSize,
    Downloaded(PathBuf),
    Failed,
}

pub struct Acceptor {
    feed_url: Url,
    categories: CategoryFilter,
    processed: ProcessedSet,
    size_filter: SizeFilter,
    pipeline: Pipeline,
    stats: Arc<Stats>,
}

impl Acceptor {
    pub fn new(
        feed_url: Url,
        categories: CategoryFilter,
        size_filter: SizeFilter,
        pipeline: Pipeline,
        stats: Arc<Stats>,
    ) -> Self {
        Self {
            feed_url,
            categories,
            processed: ProcessedSet::new(),
            size_filter,
            pipeline,
            stats,
        }
    }

    pub fn processed(&self) -> &ProcessedSet {
        &self.processed
    }

    pub fn categories(&self) -> &CategoryFilter {
        &self.categories
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Event path: freeleech flag, category, accept, size, found, download.
    pub async fn accept_announce(&self, event: &AnnounceEvent) -> Outcome {
        if !event.is_freeleech {
            return Outcome::NotFreeleech;
        }
        if let Some(category) = event.category.as_deref() {
            if !self.categories.matches(category) {
                engine_debug!(target: IRC, "Category {} filtered out for {}", category, event.identifier);
                return Outcome::FilteredCategory;
            }
        }
        if !self.processed.try_accept(&event.identifier) {
            return Outcome::Duplicate;
        }

        let title = event
            .title
            .clone()
            .unwrap_or_else(|| default_title(&event.identifier));
        let Some(url) = announce_download_url(&self.feed_url, &event.identifier, &title) else {
            engine_warn!(target: IRC, "No feed key available to build a link for {}", event.identifier);
            return Outcome::NoLink;
        };

        if self.rejected_by_size(IRC, url.as_str(), &title).await {
            return Outcome::SkippedSize;
        }
        self.stats.record_found();
        engine_info!(
            target: IRC,
            "✓ Freeleech match: [{}] {}...",
            event.category.as_deref().unwrap_or(UNKNOWN_CATEGORY),
            short(&title, 60)
        );
        self.download(url.as_str(), &title).await
    }

    /// Feed path, after the caller checked category and confirmation.
    pub async fn accept_candidate(&self, candidate: &FeedCandidate) -> Outcome {
        if !self.processed.try_accept(&candidate.identifier) {
            return Outcome::Duplicate;
        }
        if candidate.link.is_empty() {
            engine_warn!(target: RSS, "Warning: No download link for {}", short(&candidate.title, 40));
            return Outcome::NoLink;
        }
        if self
            .rejected_by_size(RSS, &candidate.link, &candidate.title)
            .await
        {
            return Outcome::SkippedSize;
        }
        self.stats.record_found();
        engine_info!(
            target: RSS,
            "✓ New freeleech: [{}] {}...",
            candidate.category,
            short(&candidate.title, 60)
        );
        self.download(&candidate.link, &candidate.title).await
    }

    async fn rejected_by_size(&self, target: &str, url: &str, title: &str) -> bool {
        match self.size_filter.check(url).await {
            SizeVerdict::TooSmall { size_gb, min_gb } => {
                engine_info!(
                    target: target,
                    "✗ Skipped (too small: {:.2} GB < {} GB): {}...",
                    size_gb,
                    min_gb,
                    short(title, 40)
                );
                self.stats.record_skipped();
                true
            }
            SizeVerdict::TooLarge { size_gb, max_gb } => {
                engine_info!(
                    target: target,
                    "✗ Skipped (too large: {:.2} GB > {} GB): {}...",
                    size_gb,
                    max_gb,
                    short(title, 40)
                );
                self.stats.record_skipped();
                true
            }
            SizeVerdict::Accept { size_gb } => {
                engine_info!(target: target, "Size: {:.2} GB", size_gb);
                false
            }
            SizeVerdict::Unknown => false,
        }
    }

    async fn download(&self, url: &str, title: &str) -> Outcome {
        match self.pipeline.download_and_relay(url, title).await {
            Ok(path) => Outcome::Downloaded(path),
            Err(_) => Outcome::Failed,
        }
    }
}

fn short(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
