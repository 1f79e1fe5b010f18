//! Search debouncing on top of `CollectionStore::set_query`.
//!
//! Typing into a search box produces one change per keystroke. The
//! debouncer keeps only the latest text and issues the query change once
//! input has been quiet for the configured delay.

use crate::store::CollectionStore;
use roster_core::collection::RemoteCollection;
use roster_core::query::QueryPatch;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Default quiet period before a search is issued.
pub const DEFAULT_SEARCH_DELAY: Duration = Duration::from_millis(500);

/// Coalesces rapid search input into one `set_query` call.
///
/// Must be used from within a tokio runtime.
pub struct SearchDebouncer<S: RemoteCollection + 'static> {
    store: Arc<CollectionStore<S>>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<S: RemoteCollection + 'static> SearchDebouncer<S> {
    pub fn new(store: Arc<CollectionStore<S>>) -> Self {
        Self::with_delay(store, DEFAULT_SEARCH_DELAY)
    }

    pub fn with_delay(store: Arc<CollectionStore<S>>, delay: Duration) -> Self {
        Self {
            store,
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Records new search text and restarts the quiet-period timer.
    ///
    /// Any search still waiting is dropped.
    pub fn push(&self, text: impl Into<String>) {
        let text = text.into();
        let store = Arc::clone(&self.store);
        let delay = self.delay;

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::debug!("[SearchDebouncer] issuing search {:?}", text);
            if let Err(err) = store.set_query(QueryPatch::search(text)).await {
                // Already recorded as the store's last error
                tracing::debug!("[SearchDebouncer] search failed: {}", err);
            }
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.replace(task) {
            previous.abort();
        }
    }

    /// Whether a search is waiting for its quiet period to end.
    pub fn is_debouncing(&self) -> bool {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Drops the waiting search, if any.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = pending.take() {
            task.abort();
        }
    }
}

impl<S: RemoteCollection + 'static> Drop for SearchDebouncer<S> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::config::ApiConfig;
    use roster_infrastructure::MockUserApi;

    fn store() -> Arc<CollectionStore<MockUserApi>> {
        Arc::new(CollectionStore::new(Arc::new(MockUserApi::new(
            ApiConfig::instant(20),
        ))))
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_last_text_is_searched() {
        let store = store();
        let debouncer = SearchDebouncer::with_delay(Arc::clone(&store), Duration::from_millis(500));

        debouncer.push("u");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.push("user 1");
        assert!(debouncer.is_debouncing());
        assert_eq!(store.query().await.search, "");

        tokio::time::sleep(Duration::from_millis(600)).await;

        assert!(!debouncer.is_debouncing());
        assert_eq!(store.query().await.search, "user 1");
        // "User 1" and "User 10".."User 19"
        assert_eq!(store.snapshot().await.total, 11);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_search() {
        let store = store();
        let debouncer = SearchDebouncer::with_delay(Arc::clone(&store), Duration::from_millis(500));

        debouncer.push("user 2");
        debouncer.cancel();
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert_eq!(store.query().await.search, "");
        assert_eq!(store.snapshot().await.total, 0);
    }
}
