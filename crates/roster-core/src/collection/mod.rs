//! Remote collection module.
//!
//! This module defines the contract between a synchronized store and the
//! asynchronous service that owns the authoritative records.
//!
//! # Module Structure
//!
//! - `record`: `Record` and `CsvRecord` traits implemented by entities
//! - `service`: `RemoteCollection` trait implemented by backends
//!
//! # Usage
//!
//! ```ignore
//! use roster_core::collection::{Record, RemoteCollection};
//! ```

mod record;
pub mod service;

pub use record::{CsvRecord, Record};
pub use service::RemoteCollection;
