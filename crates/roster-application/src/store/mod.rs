//! Synchronized collection store.
//!
//! This module contains the store that caches one query-parameterized page
//! of a remote collection and mediates every mutation through an
//! optimistic-apply, call, commit-or-revert cycle.

mod collection_store;
mod event;
mod state;

pub use collection_store::{CollectionStore, StoreOptions};
pub use event::StoreEvent;
pub use state::RefreshOutcome;
