use std::sync::Arc;

use engine_logging::targets::RSS;
use engine_logging::{engine_debug, engine_error, engine_info};
use freeleech_core::{FeedCandidate, FreeleechOracle, Stats};

use crate::{Acceptor, FeedSource, Outcome};

/// Tally of one poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollReport {
    pub entries: usize,
    /// Candidates handed to the acceptance path and accepted by it.
    pub accepted: usize,
    pub downloaded: usize,
    pub unconfirmed: usize,
    pub failed: bool,
}

/// Drives one feed check per call; scheduling is the caller's business.
///
/// The feed never establishes freeleech status on its own: a candidate must be
/// confirmed by the live channel first.
pub struct FeedPoller {
    source: Arc<dyn FeedSource>,
    oracle: Arc<dyn FreeleechOracle>,
    acceptor: Arc<Acceptor>,
    stats: Arc<Stats>,
}

impl FeedPoller {
    pub fn new(
        source: Arc<dyn FeedSource>,
        oracle: Arc<dyn FreeleechOracle>,
        acceptor: Arc<Acceptor>,
        stats: Arc<Stats>,
    ) -> Self {
        Self {
            source,
            oracle,
            acceptor,
            stats,
        }
    }

    pub async fn poll_once(&self) -> PollReport {
        self.stats.record_poll();
        let mut report = PollReport::default();

        let entries = match self.source.fetch_entries().await {
            Ok(entries) => entries,
            Err(err) => {
                engine_error!(target: RSS, "Error checking feed: {}", err);
                self.stats.record_error();
                report.failed = true;
                return report;
            }
        };
        report.entries = entries.len();

        for entry in &entries {
            let Some(candidate) = FeedCandidate::from_entry(entry) else {
                continue;
            };
            if self.acceptor.processed().contains(&candidate.identifier) {
                continue;
            }
            if !self.acceptor.categories().matches(&candidate.category) {
                continue;
            }
            if !self.oracle.is_confirmed_freeleech(&candidate.identifier) {
                engine_debug!(target: RSS, "{} not confirmed freeleech yet", candidate.identifier);
                report.unconfirmed += 1;
                continue;
            }
            let outcome = self.acceptor.accept_candidate(&candidate).await;
            match outcome {
                Outcome::Duplicate => {}
                Outcome::Downloaded(_) => {
                    report.accepted += 1;
                    report.downloaded += 1;
                }
                _ => report.accepted += 1,
            }
        }

        if report.accepted > 0 {
            engine_info!(target: RSS, "Found {} new freeleech torrents", report.accepted);
        }
        report
    }
}
