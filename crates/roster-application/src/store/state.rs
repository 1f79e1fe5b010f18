use roster_core::collection::Record;
use roster_core::error::RosterError;
use roster_core::query::{CollectionSnapshot, Query};
use std::collections::{BTreeSet, HashSet};

/// Result of a `refresh()` that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response was the latest issued one and replaced the snapshot.
    Applied,
    /// A newer refresh was issued meanwhile; the response was discarded.
    Superseded,
}

/// Everything a store owns, guarded by a single lock.
pub(crate) struct StoreState<R: Record> {
    /// Query used by the next refresh
    pub query: Query,
    pub snapshot: CollectionSnapshot<R>,
    /// Record loaded by `get_by_id` (detail view)
    pub selected: Option<R>,
    pub selection: BTreeSet<String>,
    /// Ids seen in any snapshot or lookup and not removed since.
    ///
    /// Not pruned to the current page, so a selection made on one page
    /// stays valid after paging away. Only removals shrink it.
    pub known: HashSet<String>,
    pub last_error: Option<RosterError>,
    /// Sequence number of the most recently issued refresh
    pub issued_refresh: u64,
    /// Sequence number of the refresh that produced `snapshot`
    pub applied_refresh: u64,
}

impl<R: Record> StoreState<R> {
    pub fn new(query: Query) -> Self {
        Self {
            snapshot: CollectionSnapshot::empty(query.clone()),
            query,
            selected: None,
            selection: BTreeSet::new(),
            known: HashSet::new(),
            last_error: None,
            issued_refresh: 0,
            applied_refresh: 0,
        }
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.snapshot.items.iter().position(|item| item.id() == id)
    }

    pub fn page_ids(&self) -> Vec<String> {
        self.snapshot
            .items
            .iter()
            .map(|item| item.id().to_string())
            .collect()
    }

    /// Replaces the snapshot and registers its ids as known.
    pub fn install_snapshot(&mut self, snapshot: CollectionSnapshot<R>) {
        self.known
            .extend(snapshot.items.iter().map(|item| item.id().to_string()));
        self.snapshot = snapshot;
    }

    /// Replaces the record with the same id in the snapshot and in the
    /// selected slot. Returns whether anything was replaced.
    pub fn replace_record(&mut self, record: &R) -> bool {
        let mut replaced = false;
        if let Some(index) = self.position(record.id()) {
            self.snapshot.items[index] = record.clone();
            replaced = true;
        }
        if self
            .selected
            .as_ref()
            .is_some_and(|selected| selected.id() == record.id())
        {
            self.selected = Some(record.clone());
            replaced = true;
        }
        replaced
    }

    /// Removes the given ids from the snapshot, the known ids and the
    /// selection. `total` drops by the number of records removed from the
    /// page. Returns the removed ids.
    pub fn remove_records(&mut self, ids: &BTreeSet<String>) -> Vec<String> {
        let mut removed = Vec::new();
        self.snapshot.items.retain(|item| {
            if ids.contains(item.id()) {
                removed.push(item.id().to_string());
                false
            } else {
                true
            }
        });
        self.snapshot.total = self.snapshot.total.saturating_sub(removed.len());

        for id in ids {
            self.known.remove(id);
            self.selection.remove(id);
        }
        if self
            .selected
            .as_ref()
            .is_some_and(|selected| ids.contains(selected.id()))
        {
            self.selected = None;
        }

        removed
    }

    /// Puts back the records with the given ids from `captured`, each right
    /// after its nearest captured predecessor still on the page. Records
    /// already present are skipped; `total` grows by the number restored.
    /// Returns the restored ids.
    pub fn restore_records(
        &mut self,
        captured: &CollectionSnapshot<R>,
        ids: &BTreeSet<String>,
    ) -> Vec<String> {
        let mut restored = Vec::new();
        for (index, item) in captured.items.iter().enumerate() {
            if !ids.contains(item.id()) || self.position(item.id()).is_some() {
                continue;
            }
            let at = captured.items[..index]
                .iter()
                .rev()
                .find_map(|prev| self.position(prev.id()))
                .map_or(0, |position| position + 1);
            self.snapshot.items.insert(at, item.clone());
            self.known.insert(item.id().to_string());
            restored.push(item.id().to_string());
        }
        self.snapshot.total += restored.len();
        restored
    }

    /// Drops selected ids the store no longer knows about.
    pub fn prune_selection(&mut self) {
        let known = &self.known;
        self.selection.retain(|id| known.contains(id));
    }
}

/// Pre-operation state captured before an optimistic change.
pub(crate) struct RevertPoint<R: Record> {
    pub snapshot: CollectionSnapshot<R>,
    pub selected: Option<R>,
    pub selection: BTreeSet<String>,
    /// `applied_refresh` at capture time
    pub refresh_seq: u64,
}

impl<R: Record> RevertPoint<R> {
    pub fn capture(state: &StoreState<R>) -> Self {
        Self {
            snapshot: state.snapshot.clone(),
            selected: state.selected.clone(),
            selection: state.selection.clone(),
            refresh_seq: state.applied_refresh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use roster_core::query::Page;
    use roster_core::user::{User, UserStatus};
    use roster_infrastructure::seed::user_at;

    fn state_with(count: usize) -> StoreState<User> {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let items: Vec<User> = (1..=count)
            .map(|i| user_at(i, "viewer", UserStatus::Active, "Sales", day, day))
            .collect();
        let mut state = StoreState::new(Query::default());
        let total = items.len() + 20;
        state.install_snapshot(CollectionSnapshot::from_page(
            Page { items, total },
            Query::default(),
        ));
        state
    }

    fn id_set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_restore_puts_back_only_the_given_records() {
        let mut state = state_with(5);
        let captured = state.snapshot.clone();

        state.remove_records(&id_set(&["user-2", "user-4"]));
        assert_eq!(state.snapshot.total, 23);

        let restored = state.restore_records(&captured, &id_set(&["user-4"]));

        assert_eq!(restored, vec!["user-4"]);
        assert_eq!(
            state.page_ids(),
            vec!["user-1", "user-3", "user-4", "user-5"]
        );
        assert_eq!(state.snapshot.total, 24);
        assert!(state.known.contains("user-4"));
        assert!(!state.known.contains("user-2"));
    }

    #[test]
    fn test_restore_skips_records_still_on_the_page() {
        let mut state = state_with(3);
        let captured = state.snapshot.clone();

        let restored = state.restore_records(&captured, &id_set(&["user-1"]));

        assert!(restored.is_empty());
        assert_eq!(state.snapshot, captured);
    }
}
