//! In-memory evaluation of a `Query` over a slice of records.
//!
//! Search is a case-insensitive substring match over the record's search
//! fields. Filters are exact field matches; empty filter values are
//! skipped. Sorting compares field values case-insensitively and is
//! stable, so an unknown sort field keeps the source order.

use roster_core::collection::Record;
use roster_core::query::{Page, Query, SortDirection};
use std::cmp::Ordering;

/// Returns true when the record passes the query's search and filters.
pub fn matches<R: Record>(record: &R, query: &Query) -> bool {
    let search = query.search.trim().to_lowercase();
    if !search.is_empty() {
        let hit = R::search_fields().iter().any(|name| {
            record
                .field(name)
                .is_some_and(|value| value.to_lowercase().contains(&search))
        });
        if !hit {
            return false;
        }
    }

    query
        .active_filters()
        .all(|(name, expected)| record.field(name).as_deref() == Some(expected))
}

fn compare_field<R: Record>(a: &R, b: &R, field: &str) -> Ordering {
    match (a.field(field), b.field(field)) {
        (Some(a), Some(b)) => a
            .to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(&b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sorts records in place by a named field.
pub fn sort_records<R: Record>(records: &mut [R], field: &str, direction: SortDirection) {
    records.sort_by(|a, b| {
        let ordering = compare_field(a, b, field);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Filters, sorts and paginates `records` according to `query`.
pub fn run_query<R: Record>(records: &[R], query: &Query) -> Page<R> {
    let mut matching: Vec<R> = records
        .iter()
        .filter(|record| matches(*record, query))
        .cloned()
        .collect();

    if !query.sort_field.is_empty() {
        sort_records(&mut matching, &query.sort_field, query.sort_direction);
    }

    let total = matching.len();
    let items = matching
        .into_iter()
        .skip(query.offset())
        .take(query.page_size as usize)
        .collect();

    Page { items, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::sample_user;
    use roster_core::query::QueryPatch;
    use roster_core::user::{User, UserStatus};

    fn users() -> Vec<User> {
        vec![
            sample_user(1, "admin", UserStatus::Active),
            sample_user(2, "viewer", UserStatus::Pending),
            sample_user(3, "admin", UserStatus::Inactive),
            sample_user(10, "manager", UserStatus::Active),
        ]
    }

    fn ids(page: &Page<User>) -> Vec<&str> {
        page.items.iter().map(|u| u.id.as_str()).collect()
    }

    #[test]
    fn test_filter_by_role_counts_whole_set() {
        let mut query = Query::with_page_size(1);
        query
            .merge(&QueryPatch::filters([("role", "admin")]))
            .unwrap();

        let page = run_query(&users(), &query);

        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_and_email() {
        let mut query = Query::default();
        query.search = "USER1@".to_string();
        let page = run_query(&users(), &query);
        assert_eq!(ids(&page), vec!["user-1"]);

        query.search = "user 1".to_string();
        let page = run_query(&users(), &query);
        assert_eq!(page.total, 2); // "User 1" and "User 10"
    }

    #[test]
    fn test_sort_desc_and_pagination() {
        let mut query = Query::with_page_size(2);
        query.sort_field = "id".to_string();
        query.sort_direction = SortDirection::Desc;

        let first = run_query(&users(), &query);
        assert_eq!(ids(&first), vec!["user-3", "user-2"]);

        query.page = 2;
        let second = run_query(&users(), &query);
        assert_eq!(ids(&second), vec!["user-10", "user-1"]);
        assert_eq!(second.total, 4);

        query.page = 3;
        assert!(run_query(&users(), &query).items.is_empty());
    }

    #[test]
    fn test_unknown_sort_field_keeps_source_order() {
        let mut query = Query::default();
        query.sort_field = "favourite_colour".to_string();
        let page = run_query(&users(), &query);
        assert_eq!(ids(&page), vec!["user-1", "user-2", "user-3", "user-10"]);
    }
}
