use super::event::StoreEvent;
use super::state::{RefreshOutcome, RevertPoint, StoreState};
use crate::export;
use roster_core::collection::{CsvRecord, Record, RemoteCollection};
use roster_core::config::StoreConfig;
use roster_core::error::{Result, RosterError};
use roster_core::query::{CollectionSnapshot, PaginationInfo, Query, QueryPatch};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{RwLock, broadcast};

const EVENT_CAPACITY: usize = 64;

/// Options fixed at store construction.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreOptions {
    /// Query the store starts with
    pub initial_query: Query,
    /// Field delimiter of exports
    pub export_delimiter: u8,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            initial_query: Query::default(),
            export_delimiter: b',',
        }
    }
}

impl From<&StoreConfig> for StoreOptions {
    fn from(config: &StoreConfig) -> Self {
        let mut initial_query = Query::with_page_size(config.page_size);
        initial_query.sort_field = config.sort_field.clone();
        Self {
            initial_query,
            export_delimiter: u8::try_from(config.export_delimiter).unwrap_or(b','),
        }
    }
}

/// Decrements the in-flight counter when an operation ends, however it ends.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn begin(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A locally cached, query-parameterized view of a remote collection.
///
/// `CollectionStore` owns the current page (snapshot), the query that
/// produced it, a selection set and a "selected record" slot. Every
/// mutation goes through the same cycle: apply optimistically, call the
/// service, then either commit the server's answer or revert from an
/// authoritative re-fetch before the error is returned. The lock is never
/// held across a service call, so overlapping operations interleave at
/// those points only.
///
/// # Example
///
/// ```ignore
/// let store = CollectionStore::new(Arc::new(MockUserApi::new(ApiConfig::default())));
/// store.set_query(QueryPatch::filters([("role", "admin")])).await?;
/// let snapshot = store.snapshot().await;
/// ```
pub struct CollectionStore<S: RemoteCollection> {
    service: Arc<S>,
    state: RwLock<StoreState<S::Item>>,
    in_flight: AtomicUsize,
    events: broadcast::Sender<StoreEvent>,
    export_delimiter: u8,
}

impl<S: RemoteCollection> CollectionStore<S> {
    /// Creates a store with default options. Nothing is fetched yet.
    pub fn new(service: Arc<S>) -> Self {
        Self::with_options(service, StoreOptions::default())
    }

    pub fn with_options(service: Arc<S>, options: StoreOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            service,
            state: RwLock::new(StoreState::new(options.initial_query)),
            in_flight: AtomicUsize::new(0),
            events,
            export_delimiter: options.export_delimiter,
        }
    }

    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    // ============================================================================
    // Read-only projections
    // ============================================================================

    /// Copy of the current page.
    pub async fn snapshot(&self) -> CollectionSnapshot<S::Item> {
        self.state.read().await.snapshot.clone()
    }

    /// Query used by the next refresh.
    pub async fn query(&self) -> Query {
        self.state.read().await.query.clone()
    }

    pub async fn selection(&self) -> BTreeSet<String> {
        self.state.read().await.selection.clone()
    }

    /// Record loaded by the last successful `get_by_id`.
    pub async fn selected(&self) -> Option<S::Item> {
        self.state.read().await.selected.clone()
    }

    pub async fn last_error(&self) -> Option<RosterError> {
        self.state.read().await.last_error.clone()
    }

    /// Whether any operation is waiting on the service.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Page navigation for the current query and snapshot total.
    pub async fn pagination(&self) -> PaginationInfo {
        let state = self.state.read().await;
        PaginationInfo::new(&state.query, state.snapshot.total)
    }

    /// Subscribes to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Records a failure as the last error and announces it.
    async fn fail(&self, operation: &'static str, err: RosterError) -> RosterError {
        tracing::debug!("[CollectionStore] {} failed: {}", operation, err);
        self.state.write().await.last_error = Some(err.clone());
        self.emit(StoreEvent::Failed {
            operation,
            message: err.to_string(),
        });
        err
    }

    async fn clear_error(&self) {
        self.state.write().await.last_error = None;
    }

    // ============================================================================
    // Fetching
    // ============================================================================

    /// Lists the current query's page and installs it as the snapshot.
    ///
    /// Each call takes a sequence number when it is issued. A response is
    /// applied only if no later call was issued in the meantime; otherwise
    /// it is dropped and `RefreshOutcome::Superseded` is returned. A failed
    /// response leaves the snapshot untouched. Errors of superseded calls
    /// are returned to their caller but not recorded as the last error.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let _loading = LoadingGuard::begin(&self.in_flight);

        let (seq, query) = {
            let mut state = self.state.write().await;
            state.issued_refresh += 1;
            state.last_error = None;
            (state.issued_refresh, state.query.clone())
        };
        tracing::debug!(
            "[CollectionStore] refresh #{} issued (page {}, size {})",
            seq,
            query.page,
            query.page_size
        );

        let result = self.service.list(&query).await;

        let mut state = self.state.write().await;
        if seq != state.issued_refresh {
            tracing::debug!(
                "[CollectionStore] refresh #{} superseded by #{}, response dropped",
                seq,
                state.issued_refresh
            );
            return result.map(|_| RefreshOutcome::Superseded);
        }

        match result {
            Ok(page) => {
                let snapshot = CollectionSnapshot::from_page(page, query);
                let (len, total) = (snapshot.len(), snapshot.total);
                state.install_snapshot(snapshot);
                state.applied_refresh = seq;
                drop(state);

                self.emit(StoreEvent::SnapshotReplaced { len, total });
                Ok(RefreshOutcome::Applied)
            }
            Err(err) => {
                drop(state);
                Err(self.fail("refresh", err).await)
            }
        }
    }

    /// Loads one record into the selected slot, independent of the query.
    ///
    /// On failure the previously selected record stays in place.
    pub async fn get_by_id(&self, id: &str) -> Result<S::Item> {
        let _loading = LoadingGuard::begin(&self.in_flight);
        self.clear_error().await;

        match self.service.get_by_id(id).await {
            Ok(record) => {
                let mut state = self.state.write().await;
                state.known.insert(record.id().to_string());
                state.selected = Some(record.clone());
                Ok(record)
            }
            Err(err) => Err(self.fail("get_by_id", err).await),
        }
    }

    // ============================================================================
    // Mutations
    // ============================================================================

    /// Creates a record, then refreshes so it shows up wherever the server
    /// places it under the current query.
    ///
    /// Nothing is inserted locally ahead of the server's answer. A failing
    /// follow-up refresh is recorded as the last error but does not undo
    /// the successful create.
    pub async fn create(&self, draft: <S::Item as Record>::Draft) -> Result<S::Item> {
        let _loading = LoadingGuard::begin(&self.in_flight);
        self.clear_error().await;

        if let Err(err) = <S::Item as Record>::validate_draft(&draft) {
            return Err(self.fail("create", err).await);
        }

        let created = match self.service.create(draft).await {
            Ok(created) => created,
            Err(err) => return Err(self.fail("create", err).await),
        };
        tracing::debug!("[CollectionStore] created {}", created.id());

        if let Err(err) = self.refresh().await {
            tracing::warn!(
                "[CollectionStore] refresh after creating {} failed: {}",
                created.id(),
                err
            );
        }

        Ok(created)
    }

    /// Updates a record optimistically.
    ///
    /// The patched record replaces the cached one (page and selected slot)
    /// before the request is sent. On success the server's canonical record
    /// replaces the optimistic one. On failure the record is re-fetched by
    /// id and the cache restored from that answer before the original error
    /// is returned.
    pub async fn update(
        &self,
        id: &str,
        patch: <S::Item as Record>::Patch,
    ) -> Result<S::Item> {
        let _loading = LoadingGuard::begin(&self.in_flight);
        self.clear_error().await;

        if let Err(err) = <S::Item as Record>::validate_patch(&patch) {
            return Err(self.fail("update", err).await);
        }

        let revert_point = {
            let mut state = self.state.write().await;
            let revert_point = RevertPoint::capture(&state);

            let cached = state
                .position(id)
                .map(|index| state.snapshot.items[index].clone())
                .or_else(|| state.selected.clone().filter(|s| s.id() == id));
            if let Some(cached) = cached {
                let optimistic = cached.patched(&patch);
                state.replace_record(&optimistic);
                drop(state);
                self.emit(StoreEvent::RecordReplaced {
                    id: id.to_string(),
                    optimistic: true,
                });
            }
            revert_point
        };

        match self.service.update(id, patch).await {
            Ok(canonical) => {
                self.state.write().await.replace_record(&canonical);
                self.emit(StoreEvent::RecordReplaced {
                    id: id.to_string(),
                    optimistic: false,
                });
                Ok(canonical)
            }
            Err(err) => {
                self.revert_update(id, revert_point).await;
                Err(self.fail("update", err).await)
            }
        }
    }

    /// Restores the cached copy of `id` from an authoritative fetch.
    ///
    /// A record the server no longer has is dropped. If the fetch fails the
    /// pre-update values are put back, unless a refresh has replaced the
    /// snapshot since.
    async fn revert_update(&self, id: &str, revert_point: RevertPoint<S::Item>) {
        match self.service.get_by_id(id).await {
            Ok(authoritative) => {
                self.state.write().await.replace_record(&authoritative);
                tracing::debug!("[CollectionStore] update of {} reverted from server", id);
            }
            Err(err) if err.is_not_found() => {
                let ids = BTreeSet::from([id.to_string()]);
                let removed = self.state.write().await.remove_records(&ids);
                tracing::debug!("[CollectionStore] {} is gone, dropped from cache", id);
                self.emit(StoreEvent::RecordsRemoved {
                    ids: removed,
                    optimistic: false,
                });
            }
            Err(err) => {
                tracing::warn!(
                    "[CollectionStore] re-fetch of {} failed ({}), restoring cached copy",
                    id,
                    err
                );
                let mut state = self.state.write().await;
                if state.applied_refresh == revert_point.refresh_seq {
                    if let Some(prior) = revert_point.snapshot.items.iter().find(|r| r.id() == id) {
                        if let Some(index) = state.position(id) {
                            state.snapshot.items[index] = prior.clone();
                        }
                    }
                }
                if state.selected.as_ref().is_some_and(|s| s.id() == id) {
                    state.selected = revert_point.selected.filter(|s| s.id() == id);
                }
            }
        }
        self.emit(StoreEvent::Reverted {
            operation: "update",
        });
    }

    /// Deletes a record optimistically.
    ///
    /// The record leaves the page (total drops by one) and the selection
    /// before the request is sent. On failure the page is re-fetched with
    /// the current query before the error is returned.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let _loading = LoadingGuard::begin(&self.in_flight);
        self.clear_error().await;

        let ids = BTreeSet::from([id.to_string()]);
        let revert_point = self.remove_optimistically(&ids).await;

        match self.service.delete(id).await {
            Ok(()) => {
                tracing::debug!("[CollectionStore] deleted {}", id);
                Ok(())
            }
            Err(err) => {
                let still_exists = !err.is_not_found();
                self.revert_removal(&ids, revert_point, still_exists).await;
                Err(self.fail("delete", err).await)
            }
        }
    }

    /// Deletes every selected record with one request.
    ///
    /// Does nothing when the selection is empty. The selected records leave
    /// the page and the selection is cleared before the request is sent.
    /// On failure the page is re-fetched and the selection restored.
    pub async fn bulk_delete(&self) -> Result<()> {
        let ids = self.state.read().await.selection.clone();
        if ids.is_empty() {
            return Ok(());
        }

        let _loading = LoadingGuard::begin(&self.in_flight);
        self.clear_error().await;

        let revert_point = self.remove_optimistically(&ids).await;
        let request: Vec<String> = ids.iter().cloned().collect();

        match self.service.bulk_delete(&request).await {
            Ok(()) => {
                tracing::debug!("[CollectionStore] bulk-deleted {} records", request.len());
                Ok(())
            }
            Err(err) => {
                self.revert_removal(&ids, revert_point, true).await;
                Err(self.fail("bulk_delete", err).await)
            }
        }
    }

    async fn remove_optimistically(&self, ids: &BTreeSet<String>) -> RevertPoint<S::Item> {
        let mut state = self.state.write().await;
        let revert_point = RevertPoint::capture(&state);
        let removed = state.remove_records(ids);
        let selection_len = state.selection.len();
        drop(state);

        self.emit(StoreEvent::RecordsRemoved {
            ids: removed,
            optimistic: true,
        });
        self.emit(StoreEvent::SelectionChanged { len: selection_len });
        revert_point
    }

    /// Rolls back an optimistic removal.
    ///
    /// The page comes back from a full refresh, since the server decides
    /// where the records sit. If that refresh fails and nothing newer has
    /// landed, only this operation's records are put back into the current
    /// page, so removals made meanwhile by other operations stay in effect.
    /// When the records still exist, their ids become known again and those
    /// of them that were selected are selected again.
    async fn revert_removal(
        &self,
        ids: &BTreeSet<String>,
        revert_point: RevertPoint<S::Item>,
        still_exists: bool,
    ) {
        if let Err(err) = self.refresh().await {
            tracing::warn!(
                "[CollectionStore] revert refresh failed ({}), restoring cached records",
                err
            );
            let mut state = self.state.write().await;
            if still_exists && state.applied_refresh == revert_point.refresh_seq {
                let restored = state.restore_records(&revert_point.snapshot, ids);
                tracing::debug!("[CollectionStore] restored {:?} from cache", restored);
            }
        }

        let mut state = self.state.write().await;
        if still_exists {
            state.known.extend(ids.iter().cloned());
            state
                .selection
                .extend(revert_point.selection.intersection(ids).cloned());
            if state.selected.is_none() {
                state.selected = revert_point.selected.filter(|s| ids.contains(s.id()));
            }
        }
        state.prune_selection();
        let selection_len = state.selection.len();
        drop(state);

        self.emit(StoreEvent::SelectionChanged { len: selection_len });
        self.emit(StoreEvent::Reverted {
            operation: "delete",
        });
    }

    // ============================================================================
    // Query
    // ============================================================================

    /// Merges a partial query change, then refreshes.
    ///
    /// Changing search, filters or page size sends the query back to page
    /// 1. Naming the active sort field again flips the direction; a new
    /// sort field starts ascending. An invalid patch changes nothing.
    pub async fn set_query(&self, patch: QueryPatch) -> Result<RefreshOutcome> {
        {
            let mut state = self.state.write().await;
            let mut query = state.query.clone();
            if let Err(err) = query.merge(&patch) {
                drop(state);
                return Err(self.fail("set_query", err).await);
            }
            state.query = query;
        }
        self.refresh().await
    }

    // ============================================================================
    // Selection (local only)
    // ============================================================================

    /// Flips membership of `id` in the selection.
    ///
    /// Returns whether `id` is selected afterwards. Ids the store does not
    /// know are ignored.
    pub async fn toggle_selection(&self, id: &str) -> bool {
        let mut state = self.state.write().await;
        if !state.known.contains(id) {
            tracing::debug!("[CollectionStore] ignoring selection of unknown id {}", id);
            return false;
        }

        let selected = if state.selection.remove(id) {
            false
        } else {
            state.selection.insert(id.to_string());
            true
        };
        let len = state.selection.len();
        drop(state);

        self.emit(StoreEvent::SelectionChanged { len });
        selected
    }

    /// Selects every record on the current page, or clears the selection
    /// when all of them are already selected.
    pub async fn select_all(&self) {
        let mut state = self.state.write().await;
        let page_ids = state.page_ids();
        if page_ids.iter().all(|id| state.selection.contains(id)) {
            state.selection.clear();
        } else {
            state.selection.extend(page_ids);
        }
        let len = state.selection.len();
        drop(state);

        self.emit(StoreEvent::SelectionChanged { len });
    }

    pub async fn clear_selection(&self) {
        self.state.write().await.selection.clear();
        self.emit(StoreEvent::SelectionChanged { len: 0 });
    }
}

impl<S> CollectionStore<S>
where
    S: RemoteCollection,
    S::Item: CsvRecord,
{
    /// Serializes the selected records, or the whole collection when the
    /// selection is empty, to delimited text with a header row.
    ///
    /// Selected records are fetched by id, whatever page they are on.
    pub async fn export_selection_or_all(&self) -> Result<String> {
        let _loading = LoadingGuard::begin(&self.in_flight);
        let ids: Vec<String> = self.state.read().await.selection.iter().cloned().collect();

        let records = if ids.is_empty() {
            self.service.list_all().await
        } else {
            self.service.get_many(&ids).await
        };
        let records = match records {
            Ok(records) => records,
            Err(err) => return Err(self.fail("export", err).await),
        };

        tracing::debug!(
            "[CollectionStore] exporting {} records ({} selected)",
            records.len(),
            ids.len()
        );

        match export::to_delimited(&records, self.export_delimiter) {
            Ok(text) => Ok(text),
            Err(err) => Err(self.fail("export", err).await),
        }
    }
}
