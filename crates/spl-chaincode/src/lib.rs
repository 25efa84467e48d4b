//! Profile chaincode for the Student Profile Ledger.
//!
//! Stores one [`Profile`](spl_types::Profile) per student under the student's
//! user id. The host ledger invokes the chaincode with a function name and
//! flat string arguments; [`ProfileChaincode`] routes each call through the
//! [`Operation`] table, decodes class specs with [`ClassCodec`], and applies
//! the change through [`ProfileManager`] against the host's
//! [`LedgerStore`](spl_store::LedgerStore).
//!
//! # Quick Start
//!
//! ```rust
//! use spl_chaincode::ProfileChaincode;
//! use spl_store::InMemoryLedgerStore;
//!
//! let cc = ProfileChaincode::default();
//! let store = InMemoryLedgerStore::new();
//! let args: Vec<String> = ["u1", "10A,SchoolA,Mr.X,Ms.Y,Math#9&Lit#8,HK1,A#B", "tx1#tx2"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//! assert!(cc.invoke(&store, "initProfile", &args).is_ok());
//!
//! let found = cc.invoke(&store, "getProfileByID", &["u1".to_string()]);
//! assert!(found.is_ok());
//! ```

pub mod chaincode;
pub mod codec;
pub mod config;
pub mod error;
pub mod manager;
pub mod operation;
pub mod response;

pub use chaincode::ProfileChaincode;
pub use codec::{ClassCodec, SpecContext, CLASS_FIELD_COUNT};
pub use config::CodecConfig;
pub use error::{ChaincodeError, ChaincodeResult};
pub use manager::{user_id_query, ProfileManager, QueryResult};
pub use operation::{Arity, Operation};
pub use response::Response;
