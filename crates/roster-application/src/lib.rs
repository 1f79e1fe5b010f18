//! Application layer for Roster.
//!
//! This crate provides the synchronized collection store that sits between
//! views and a remote collection service, plus the helpers layered on top
//! of it: search debouncing and delimited-text export.

pub mod debounce;
pub mod export;
pub mod store;

pub use debounce::SearchDebouncer;
pub use store::{CollectionStore, RefreshOutcome, StoreEvent, StoreOptions};
