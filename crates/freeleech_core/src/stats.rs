use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

/// Monotonic counters shared by every component that completes a countable action.
#[derive(Debug)]
pub struct Stats {
    started_at: DateTime<Utc>,
    poll_count: AtomicU64,
    items_found: AtomicU64,
    items_downloaded: AtomicU64,
    items_skipped: AtomicU64,
    error_count: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub started_at: DateTime<Utc>,
    pub poll_count: u64,
    pub items_found: u64,
    pub items_downloaded: u64,
    pub items_skipped: u64,
    pub error_count: u64,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Stats {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            poll_count: AtomicU64::new(0),
            items_found: AtomicU64::new(0),
            items_downloaded: AtomicU64::new(0),
            items_skipped: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
        }
    }

    pub fn record_poll(&self) {
        self.poll_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_found(&self) {
        self.items_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_downloaded(&self) {
        self.items_downloaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.items_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            started_at: self.started_at,
            poll_count: self.poll_count.load(Ordering::Relaxed),
            items_found: self.items_found.load(Ordering::Relaxed),
            items_downloaded: self.items_downloaded.load(Ordering::Relaxed),
            items_skipped: self.items_skipped.load(Ordering::Relaxed),
            error_count: self.error_count.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// Runtime as `"{hours}h {minutes}m"`.
    pub fn runtime_label(&self, now: DateTime<Utc>) -> String {
        let secs = (now - self.started_at).num_seconds().max(0);
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
