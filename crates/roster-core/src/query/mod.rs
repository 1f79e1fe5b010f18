//! Query domain module.
//!
//! # Module Structure
//!
//! - `model`: `Query`, `QueryPatch`, list pages, snapshots and pagination info

mod model;

pub use model::{
    CollectionSnapshot, DEFAULT_PAGE_SIZE, DEFAULT_SORT_FIELD, Page, PaginationInfo, Query,
    QueryPatch, SortDirection,
};
