use super::context::Context;
use super::print_json;
use anyhow::Result;
use roster_application::{SearchDebouncer, StoreEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Reads search text line by line from stdin and prints the first page of
/// matches once typing pauses for the configured debounce delay.
pub async fn run(context: &Context) -> Result<()> {
    let store = Arc::new(context.store(context.initial_query()));
    let delay = Duration::from_millis(context.config.store.search_debounce_ms);
    let debouncer = SearchDebouncer::with_delay(Arc::clone(&store), delay);

    let mut events = store.subscribe();
    let printer = {
        let store = Arc::downgrade(&store);
        tokio::spawn(async move {
            // Ends once the store is dropped and buffered events are drained
            while let Ok(event) = events.recv().await {
                match event {
                    StoreEvent::SnapshotReplaced { .. } => {
                        let Some(store) = store.upgrade() else { break };
                        let snapshot = store.snapshot().await;
                        if let Err(err) = print_json(&snapshot) {
                            tracing::warn!("[search] failed to print results: {}", err);
                        }
                    }
                    StoreEvent::Failed { message, .. } => eprintln!("Search failed: {}", message),
                    _ => {}
                }
            }
        })
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        debouncer.push(line.trim());
    }

    // Let the last search run before exiting
    while debouncer.is_debouncing() || store.is_loading() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    drop(debouncer);
    drop(store);
    printer.await?;
    Ok(())
}
