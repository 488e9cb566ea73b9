//! Identifier sets shared between the live channel path and the feed path.
//!
//! Neither set ever evicts; they live as long as the process.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Answers whether an identifier has been announced as freeleech.
pub trait FreeleechOracle: Send + Sync {
    fn is_confirmed_freeleech(&self, identifier: &str) -> bool;
}

/// Identifiers seen as freeleech on the live channel. Append-only.
#[derive(Debug, Default)]
pub struct ConfirmationSet {
    ids: Mutex<HashSet<String>>,
}

impl ConfirmationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a confirmation. Returns false if it was already known.
    pub fn confirm(&self, identifier: &str) -> bool {
        lock(&self.ids).insert(identifier.to_string())
    }

    pub fn len(&self) -> usize {
        lock(&self.ids).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FreeleechOracle for ConfirmationSet {
    fn is_confirmed_freeleech(&self, identifier: &str) -> bool {
        lock(&self.ids).contains(identifier)
    }
}

/// Identifiers already committed to the download pipeline.
#[derive(Debug, Default)]
pub struct ProcessedSet {
    ids: Mutex<HashSet<String>>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check-and-insert under a single lock.
    ///
    /// Returns true exactly once per identifier; the caller that gets `true` owns
    /// the download, every other caller must drop the item.
    pub fn try_accept(&self, identifier: &str) -> bool {
        lock(&self.ids).insert(identifier.to_string())
    }

    /// Advisory membership test. Only [`ProcessedSet::try_accept`] decides.
    pub fn contains(&self, identifier: &str) -> bool {
        lock(&self.ids).contains(identifier)
    }

    pub fn len(&self) -> usize {
        lock(&self.ids).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock(ids: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
    // A panic while holding the lock cannot leave a HashSet half-inserted.
    ids.lock().unwrap_or_else(PoisonError::into_inner)
}
