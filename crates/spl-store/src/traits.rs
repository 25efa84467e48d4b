use crate::error::StoreResult;
use crate::iter::StateQueryIterator;

/// The world-state interface a host ledger exposes to chaincode.
///
/// All implementations must satisfy these invariants:
/// - A missing key reads as `Ok(None)`; `Err` is reserved for infrastructure
///   failure.
/// - `put_state` replaces the whole value under a key.
/// - `del_state` on a missing key is not an error.
/// - Query results are ordered by key and the returned iterator is released
///   when dropped.
pub trait LedgerStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write `value` under `key`, replacing any previous value.
    fn put_state(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Remove `key` from the world state.
    fn del_state(&self, key: &str) -> StoreResult<()>;

    /// Execute a rich query (`{"selector": {...}}`) against the state.
    fn get_query_result(&self, query: &str) -> StoreResult<StateQueryIterator>;

    /// Whether `key` currently holds a non-empty value.
    fn contains_key(&self, key: &str) -> StoreResult<bool> {
        Ok(self
            .get_state(key)?
            .is_some_and(|value| !value.is_empty()))
    }
}
