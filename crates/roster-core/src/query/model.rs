//! Query domain model.
//!
//! A `Query` describes which page of the filtered, sorted collection the
//! store is looking at. `QueryPatch` is a partial change to it; merging a
//! patch applies the page-reset and sort-toggle rules.

use crate::error::{Result, RosterError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Default number of records per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Default sort field.
pub const DEFAULT_SORT_FIELD: &str = "name";

/// Sort direction of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Returns the opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// Pagination, search, filter and sort parameters for a list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// 1-based page number
    pub page: u32,
    /// Records per page, always > 0
    pub page_size: u32,
    /// Free-text search; empty means no search
    pub search: String,
    /// Field equality filters; empty values are ignored
    pub filters: BTreeMap<String, String>,
    /// Field to sort by
    pub sort_field: String,
    /// Sort direction
    pub sort_direction: SortDirection,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search: String::new(),
            filters: BTreeMap::new(),
            sort_field: DEFAULT_SORT_FIELD.to_string(),
            sort_direction: SortDirection::Asc,
        }
    }
}

impl Query {
    /// Creates a default query with a custom page size.
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            ..Self::default()
        }
    }

    /// Zero-based offset of the first record on the current page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.page_size as usize)
    }

    /// Filters with a non-empty value.
    pub fn active_filters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filters
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Merges a partial change into this query.
    ///
    /// Rules:
    /// - a change to `search`, `filters` or `page_size` forces `page = 1`
    ///   (an explicit `page` in the same patch is overridden)
    /// - a `sort_field` equal to the active one toggles the direction,
    ///   a different one switches field and resets to ascending
    /// - `page` alone is taken as-is
    ///
    /// The query is left untouched when the patch is invalid.
    pub fn merge(&mut self, patch: &QueryPatch) -> Result<()> {
        patch.validate()?;

        let mut reset_page = false;

        if let Some(search) = &patch.search {
            reset_page |= *search != self.search;
            self.search = search.clone();
        }
        if let Some(filters) = &patch.filters {
            reset_page |= *filters != self.filters;
            self.filters = filters.clone();
        }
        if let Some(page_size) = patch.page_size {
            reset_page |= page_size != self.page_size;
            self.page_size = page_size;
        }
        if let Some(field) = &patch.sort_field {
            if *field == self.sort_field {
                self.sort_direction = self.sort_direction.toggled();
            } else {
                self.sort_field = field.clone();
                self.sort_direction = SortDirection::Asc;
            }
        }
        if let Some(page) = patch.page {
            self.page = page;
        }
        if reset_page {
            self.page = 1;
        }

        Ok(())
    }
}

/// A partial change to a `Query`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPatch {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
    pub filters: Option<BTreeMap<String, String>>,
    pub sort_field: Option<String>,
}

impl QueryPatch {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }

    pub fn page_size(page_size: u32) -> Self {
        Self {
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    pub fn search(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
            ..Self::default()
        }
    }

    pub fn filters<K, V, I>(filters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            filters: Some(
                filters
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub fn sort_by(field: impl Into<String>) -> Self {
        Self {
            sort_field: Some(field.into()),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.page == Some(0) {
            return Err(RosterError::validation("page must be at least 1"));
        }
        if self.page_size == Some(0) {
            return Err(RosterError::validation("page size must be greater than 0"));
        }
        if matches!(&self.sort_field, Some(field) if field.trim().is_empty()) {
            return Err(RosterError::validation("sort field must not be empty"));
        }
        Ok(())
    }
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Records of the requested page, in server order
    pub items: Vec<T>,
    /// Size of the whole filtered set
    pub total: usize,
}

/// The store's cached view of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSnapshot<T> {
    pub items: Vec<T>,
    pub total: usize,
    /// The query this snapshot answers
    pub query: Query,
}

impl<T> CollectionSnapshot<T> {
    /// An empty snapshot for the given query.
    pub fn empty(query: Query) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            query,
        }
    }

    /// Builds a snapshot from a list response.
    pub fn from_page(page: Page<T>, query: Query) -> Self {
        Self {
            items: page.items,
            total: page.total,
            query,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Page navigation summary derived from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: u32,
    pub total_pages: u32,
    pub page_size: u32,
    pub total_items: usize,
}

impl PaginationInfo {
    pub fn new(query: &Query, total: usize) -> Self {
        let page_size = query.page_size.max(1) as usize;
        Self {
            current_page: query.page,
            total_pages: total.div_ceil(page_size) as u32,
            page_size: query.page_size,
            total_items: total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_first_page() -> Query {
        Query {
            page: 4,
            ..Query::default()
        }
    }

    #[test]
    fn test_search_filters_and_page_size_reset_page() {
        let patches = [
            QueryPatch::search("user 1"),
            QueryPatch::filters([("role", "admin")]),
            QueryPatch::page_size(25),
            QueryPatch {
                page: Some(3),
                search: Some("x".to_string()),
                ..QueryPatch::default()
            },
        ];

        for patch in patches {
            let mut query = non_first_page();
            query.merge(&patch).unwrap();
            assert_eq!(query.page, 1, "patch {:?} should reset page", patch);
        }
    }

    #[test]
    fn test_page_only_change_is_kept() {
        let mut query = Query::default();
        query.merge(&QueryPatch::page(3)).unwrap();
        assert_eq!(query.page, 3);
    }

    #[test]
    fn test_unchanged_search_does_not_reset_page() {
        let mut query = non_first_page();
        query.merge(&QueryPatch::search("")).unwrap();
        assert_eq!(query.page, 4);
    }

    #[test]
    fn test_same_sort_field_toggles_direction() {
        let mut query = Query::default();
        query.merge(&QueryPatch::sort_by("name")).unwrap();
        assert_eq!(query.sort_direction, SortDirection::Desc);
        query.merge(&QueryPatch::sort_by("name")).unwrap();
        assert_eq!(query.sort_direction, SortDirection::Asc);
    }

    #[test]
    fn test_new_sort_field_resets_to_ascending() {
        let mut query = Query {
            sort_direction: SortDirection::Desc,
            ..Query::default()
        };
        query.merge(&QueryPatch::sort_by("email")).unwrap();
        assert_eq!(query.sort_field, "email");
        assert_eq!(query.sort_direction, SortDirection::Asc);
    }

    #[test]
    fn test_invalid_patch_leaves_query_untouched() {
        let mut query = non_first_page();
        let err = query.merge(&QueryPatch::page_size(0)).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(query, non_first_page());

        assert!(query.merge(&QueryPatch::page(0)).is_err());
    }

    #[test]
    fn test_offset_and_pagination_info() {
        let query = Query {
            page: 3,
            page_size: 10,
            ..Query::default()
        };
        assert_eq!(query.offset(), 20);

        let info = PaginationInfo::new(&query, 55);
        assert_eq!(info.total_pages, 6);
        assert_eq!(info.total_items, 55);
        assert_eq!(PaginationInfo::new(&query, 0).total_pages, 0);
    }

    #[test]
    fn test_active_filters_skip_empty_values() {
        let mut query = Query::default();
        query.filters.insert("role".into(), "admin".into());
        query.filters.insert("status".into(), String::new());
        let active: Vec<_> = query.active_filters().collect();
        assert_eq!(active, vec![("role", "admin")]);
    }
}
