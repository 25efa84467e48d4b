//! HTTP gateway for the Student Profile Ledger.
//!
//! Stands in for the host platform's client side: it owns a world state,
//! orders transactions one at a time, and exposes the profile chaincode both
//! as typed JSON endpoints and as a raw `function + args` invoke endpoint.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use handler::{CreateProfileRequest, InvokeRequest, InvokeResponse, UpdateClassRequest};
pub use router::build_router;
pub use server::GatewayServer;
pub use state::AppState;
