//! Shared latest-value store backed by a `tokio::sync::watch` channel.
//!
//! [`LatestValueStore`] holds exactly one [`Reading`]. The acquisition loop
//! is the only writer; any number of HTTP handlers read concurrently.
//! Publishing replaces the whole value in one step and never waits for
//! readers, and readers only hold the borrow long enough to clone, so a
//! reader can never observe a half-written reading.
//!
//! Designed to be shared via `Arc<LatestValueStore>`.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use crate::reading::Reading;

pub struct LatestValueStore {
    sender: watch::Sender<Reading>,
    published: AtomicU64,
}

impl Default for LatestValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LatestValueStore {
    /// Create a store holding the placeholder reading.
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(Reading::placeholder());
        Self {
            sender,
            published: AtomicU64::new(0),
        }
    }

    /// Replace the current reading. Last write wins.
    ///
    /// The counter is bumped before the value becomes visible, so any reader
    /// that sees a published reading also sees a count of at least one.
    pub fn publish(&self, reading: Reading) {
        self.published.fetch_add(1, Ordering::Release);
        self.sender.send_replace(reading);
    }

    /// A copy of the most recent reading, or the placeholder before the
    /// first publish.
    pub fn latest(&self) -> Reading {
        self.sender.borrow().clone()
    }

    /// Receiver that is notified on every subsequent publish.
    pub fn subscribe(&self) -> watch::Receiver<Reading> {
        self.sender.subscribe()
    }

    /// Number of readings published since startup.
    pub fn published_count(&self) -> u64 {
        self.published.load(Ordering::Acquire)
    }
}
