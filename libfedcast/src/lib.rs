//! Fedcast - reach resolution for federated social content
//!
//! This library computes, for a status published by an account on a
//! federated social network, the deduplicated set of remote inboxes that
//! must receive it, collapsing per-account deliveries into server-wide
//! shared inboxes wherever one is advertised.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod resolver;
pub mod sources;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ReachConfig};
pub use db::Database;
pub use error::{FedcastError, Result};
pub use resolver::ReachResolver;
pub use store::ReachStore;
pub use types::{Account, Protocol, ReachSet, Status};
