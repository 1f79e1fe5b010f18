//! Remote collection service trait.
//!
//! Defines the interface for the asynchronous store of records keyed by id.

use super::record::Record;
use crate::error::Result;
use crate::query::{Page, Query};
use async_trait::async_trait;

/// An abstract, asynchronous, possibly flaky collection of records.
///
/// This trait decouples the synchronized store from the backend that owns
/// the records (an in-memory mock, an HTTP API, ...).
///
/// # Implementation Notes
///
/// Every method may fail with `RosterError::Service` at any time. Methods
/// addressing a single id fail with `RosterError::NotFound` when the id is
/// unknown. The service is authoritative for ids, timestamps and for the
/// placement of records under a query.
#[async_trait]
pub trait RemoteCollection: Send + Sync {
    /// The record type held by this collection.
    type Item: Record;

    /// Lists one page of records matching the query.
    ///
    /// # Returns
    ///
    /// - `Ok(Page)`: the requested page and the size of the filtered set
    /// - `Err(_)`: service failure
    async fn list(&self, query: &Query) -> Result<Page<Self::Item>>;

    /// Finds a record by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(record)`: record found
    /// - `Err(RosterError::NotFound)`: no record with this id
    /// - `Err(_)`: service failure
    async fn get_by_id(&self, id: &str) -> Result<Self::Item>;

    /// Fetches the records with the given ids, skipping unknown ids.
    async fn get_many(&self, ids: &[String]) -> Result<Vec<Self::Item>>;

    /// Fetches the whole, unpaginated collection.
    async fn list_all(&self) -> Result<Vec<Self::Item>>;

    /// Creates a record and returns it as stored (with its assigned id).
    async fn create(&self, draft: <Self::Item as Record>::Draft) -> Result<Self::Item>;

    /// Applies a partial update and returns the canonical record.
    ///
    /// # Returns
    ///
    /// - `Ok(record)`: the record after the server-side merge
    /// - `Err(RosterError::NotFound)`: no record with this id
    /// - `Err(_)`: service failure
    async fn update(&self, id: &str, patch: <Self::Item as Record>::Patch)
    -> Result<Self::Item>;

    /// Deletes a record.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: record deleted
    /// - `Err(RosterError::NotFound)`: no record with this id
    /// - `Err(_)`: service failure
    async fn delete(&self, id: &str) -> Result<()>;

    /// Deletes every listed record in one request. Unknown ids are ignored.
    async fn bulk_delete(&self, ids: &[String]) -> Result<()>;
}
