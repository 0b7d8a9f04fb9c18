//! # casdb-client
//!
//! Client library for databases fronted by a CAS (Common Application
//! Server) broker.
//!
//! This crate provides:
//! - Async TCP session with broker rendezvous and login handshake
//! - SQL execution with paged result streaming over server-side handles
//! - Transaction control with auto-commit tracking
//! - An optional time-bounded response cache for idempotent reads
//! - A broadcast event channel mirroring every operation outcome

pub mod cache;
pub mod config;
pub mod error;
pub mod event;
pub mod handle;
pub mod session;
mod transport;

pub use cache::QueryCache;
pub use config::SessionConfig;
pub use error::{ClientError, StateError};
pub use event::SessionEvent;
pub use handle::{QueryHandle, QueryResult};
pub use session::{Session, SessionState};
