//! One-entry list cache.
//!
//! Holds the last fetched list under a single key. Reads past the staleness
//! window miss; any successful write evicts the entry so the next read
//! refetches.

use std::time::{Duration, Instant};

/// Logical key of the bug list.
pub const BUGS_KEY: &str = "bugs";

pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub struct ListCache<T> {
    key: &'static str,
    stale_after: Duration,
    entry: Option<(Instant, Vec<T>)>,
}

impl<T> ListCache<T> {
    #[must_use]
    pub const fn new(key: &'static str, stale_after: Duration) -> Self {
        Self {
            key,
            stale_after,
            entry: None,
        }
    }

    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// The cached list if it is still fresh.
    #[must_use]
    pub fn get(&self) -> Option<&[T]> {
        self.get_at(Instant::now())
    }

    #[must_use]
    pub fn get_at(&self, now: Instant) -> Option<&[T]> {
        self.entry
            .as_ref()
            .filter(|(stored, _)| now.saturating_duration_since(*stored) < self.stale_after)
            .map(|(_, items)| items.as_slice())
    }

    pub fn put(&mut self, items: Vec<T>) {
        self.put_at(Instant::now(), items);
    }

    pub fn put_at(&mut self, now: Instant, items: Vec<T>) {
        self.entry = Some((now, items));
    }

    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            tracing::debug!(key = self.key, "list cache invalidated");
        }
    }
}

impl<T> Default for ListCache<T> {
    fn default() -> Self {
        Self::new(BUGS_KEY, DEFAULT_STALE_AFTER)
    }
}
