//! Record trait.
//!
//! A record is one managed entity with a stable string identifier. The
//! trait carries just enough behaviour for a store to patch records
//! locally, and for a service to filter, sort and export them, without
//! knowing the concrete entity.

use crate::error::Result;

/// An entity held by a remote collection.
pub trait Record: Clone + Send + Sync + 'static {
    /// Attributes needed to create a record (everything but the id).
    type Draft: Clone + Send + Sync + 'static;

    /// Partial attributes for an update.
    type Patch: Clone + Send + Sync + 'static;

    /// Entity name used in error messages (e.g. "User").
    const ENTITY: &'static str;

    /// Returns the stable identifier of this record.
    fn id(&self) -> &str;

    /// Returns a copy of this record with the patch applied.
    ///
    /// Used for optimistic local replacement; the service's own merge stays
    /// authoritative.
    fn patched(&self, patch: &Self::Patch) -> Self;

    /// Returns the string value of a named field, if the field exists.
    fn field(&self, name: &str) -> Option<String>;

    /// Fields matched by free-text search.
    fn search_fields() -> &'static [&'static str];

    /// Checks draft attributes before a create request is sent.
    fn validate_draft(_draft: &Self::Draft) -> Result<()> {
        Ok(())
    }

    /// Checks patch attributes before an update request is sent.
    fn validate_patch(_patch: &Self::Patch) -> Result<()> {
        Ok(())
    }
}

/// Delimited-text rendering of a record.
pub trait CsvRecord: Record {
    /// Fixed header row.
    fn csv_header() -> &'static [&'static str];

    /// One row, in header order.
    fn csv_row(&self) -> Vec<String>;
}
