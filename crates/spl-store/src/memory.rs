use std::collections::BTreeMap;
use std::sync::RwLock;

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::iter::{IteratorTracker, StateQueryIterator};
use crate::selector::Selector;
use crate::traits::LedgerStore;

/// In-memory, `BTreeMap`-based world state.
///
/// Intended for tests and embedding. State lives behind a `RwLock` and values
/// are cloned on read and write. Open query iterators are counted so callers
/// can check that every iterator they opened was released.
pub struct InMemoryLedgerStore {
    state: RwLock<BTreeMap<String, Vec<u8>>>,
    iterators: IteratorTracker,
}

impl InMemoryLedgerStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(BTreeMap::new()),
            iterators: IteratorTracker::new(),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Returns `true` if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All keys in ascending order.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.keys().cloned().collect())
    }

    /// Query iterators handed out and not yet dropped.
    pub fn open_iterators(&self) -> usize {
        self.iterators.open_count()
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.get(key).cloned())
    }

    fn put_state(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        state.insert(key.to_owned(), value.to_vec());
        debug!(key, len = value.len(), "put state");
        Ok(())
    }

    fn del_state(&self, key: &str) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        state.remove(key);
        debug!(key, "del state");
        Ok(())
    }

    fn get_query_result(&self, query: &str) -> StoreResult<StateQueryIterator> {
        let selector = Selector::parse(query)?;
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        let records = selector.filter(&state);
        debug!(matches = records.len(), "rich query");
        Ok(StateQueryIterator::new(records, Some(&self.iterators)))
    }
}

impl std::fmt::Debug for InMemoryLedgerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLedgerStore")
            .field("key_count", &self.len())
            .field("open_iterators", &self.open_iterators())
            .finish()
    }
}
