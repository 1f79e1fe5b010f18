//! Domain layer for Roster.
//!
//! Records, queries, the remote collection contract, configuration and the
//! shared error type. No I/O happens here.

pub mod collection;
pub mod config;
pub mod error;
pub mod query;
pub mod role;
pub mod user;

// Re-export common error type
pub use error::{Result, RosterError};
