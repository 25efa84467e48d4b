use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::StoreResult;

/// One `(key, value)` pair produced by a rich query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub key: String,
    pub value: Vec<u8>,
}

impl QueryRecord {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Counts query iterators that are still open against a store.
///
/// Cloning shares the counter.
#[derive(Clone, Debug, Default)]
pub struct IteratorTracker {
    open: Arc<AtomicUsize>,
}

impl IteratorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of iterators handed out and not yet released.
    pub fn open_count(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    fn acquire(&self) -> Lease {
        self.open.fetch_add(1, Ordering::SeqCst);
        Lease {
            open: Arc::clone(&self.open),
        }
    }
}

struct Lease {
    open: Arc<AtomicUsize>,
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Iterator over rich query results.
///
/// The iterator is a scoped resource: it is released when dropped or when
/// [`close`](Self::close) is called, whichever comes first.
pub struct StateQueryIterator {
    results: VecDeque<StoreResult<QueryRecord>>,
    lease: Option<Lease>,
}

impl StateQueryIterator {
    /// An iterator over already-materialized records.
    pub fn new(records: Vec<QueryRecord>, tracker: Option<&IteratorTracker>) -> Self {
        Self::from_results(records.into_iter().map(Ok).collect(), tracker)
    }

    /// An iterator whose items may individually fail, as a remote state
    /// database cursor can.
    pub fn from_results(
        results: Vec<StoreResult<QueryRecord>>,
        tracker: Option<&IteratorTracker>,
    ) -> Self {
        Self {
            results: results.into(),
            lease: tracker.map(IteratorTracker::acquire),
        }
    }

    /// Whether another item is available.
    pub fn has_next(&self) -> bool {
        !self.results.is_empty()
    }

    /// Release the iterator early. Dropping it has the same effect.
    pub fn close(mut self) {
        self.results.clear();
        self.lease.take();
    }
}

impl Iterator for StateQueryIterator {
    type Item = StoreResult<QueryRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.results.pop_front()
    }
}

impl std::fmt::Debug for StateQueryIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateQueryIterator")
            .field("remaining", &self.results.len())
            .field("tracked", &self.lease.is_some())
            .finish()
    }
}
