//! Deduplicating work queue
//!
//! URIs are keyed by their canonical form. A URI is appended only if it is
//! neither pending nor already handed out, so every URI is fetched at most once
//! per crawl no matter how many pages link to it. The URI handed out is the
//! first spelling seen for its key, so a directory path keeps its trailing
//! slash when fetched.

use crate::url::{normalize_url, request_uri};
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};

#[derive(Debug)]
struct PendingUri {
    key: String,
    uri: String,
}

#[derive(Debug, Default)]
struct QueueInner {
    /// URIs waiting to be fetched, in insertion order
    pending: VecDeque<PendingUri>,

    /// Same keys as `pending`, for membership checks
    pending_keys: HashSet<String>,

    /// Canonical URIs that have been handed out
    completed: HashSet<String>,
}

/// Thread-safe FIFO of URIs still to be crawled
#[derive(Debug, Default)]
pub struct Queue {
    inner: Mutex<QueueInner>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one URI; returns true if it was not seen before
    pub fn push(&self, uri: &str) -> bool {
        let key = normalize_url(uri);
        let mut inner = self.inner.lock();

        if inner.completed.contains(&key) || inner.pending_keys.contains(&key) {
            return false;
        }

        inner.pending_keys.insert(key.clone());
        inner.pending.push_back(PendingUri {
            key,
            uri: request_uri(uri),
        });
        true
    }

    /// Adds every URI in `uris`; returns the number actually added
    pub fn append<I, S>(&self, uris: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        uris.into_iter()
            .filter(|uri| self.push(uri.as_ref()))
            .count()
    }

    /// Takes the next pending URI and marks it completed
    pub fn pop(&self) -> Option<String> {
        let mut inner = self.inner.lock();
        let PendingUri { key, uri } = inner.pending.pop_front()?;
        inner.pending_keys.remove(&key);
        inner.completed.insert(key);
        Some(uri)
    }

    /// Number of pending URIs
    pub fn len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().pending.is_empty()
    }

    /// Number of URIs handed out so far
    pub fn completed_count(&self) -> usize {
        self.inner.lock().completed.len()
    }

    pub fn is_pending(&self, uri: &str) -> bool {
        self.inner.lock().pending_keys.contains(&normalize_url(uri))
    }

    pub fn is_completed(&self, uri: &str) -> bool {
        self.inner.lock().completed.contains(&normalize_url(uri))
    }

    /// Snapshot of the pending URIs in pop order
    pub fn pending(&self) -> Vec<String> {
        self.inner
            .lock()
            .pending
            .iter()
            .map(|pending| pending.uri.clone())
            .collect()
    }
}
