//! World-state storage for the Student Profile Ledger.
//!
//! The chaincode never owns its storage: the host ledger hands it a key-value
//! world state with point reads, writes, deletes and CouchDB-style rich
//! queries. This crate pins that contract down as the [`LedgerStore`] trait
//! and ships two host-side implementations for local use and tests.
//!
//! # Storage Backends
//!
//! - [`InMemoryLedgerStore`] -- `BTreeMap`-based store for tests and embedding
//! - [`WalLedgerStore`] -- in-memory state rebuilt from a CRC-framed
//!   write-ahead log on open
//!
//! # Design Rules
//!
//! 1. A missing key is `Ok(None)`, never an error.
//! 2. Every write replaces the full value stored under a key.
//! 3. Rich query results come back in ascending key order.
//! 4. Query iterators release their resources when dropped.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod iter;
pub mod memory;
pub mod selector;
pub mod traits;
pub mod wal;

pub use error::{StoreError, StoreResult};
pub use iter::{IteratorTracker, QueryRecord, StateQueryIterator};
pub use memory::InMemoryLedgerStore;
pub use selector::Selector;
pub use traits::LedgerStore;
pub use wal::{WalLedgerStore, WalStoreConfig};
