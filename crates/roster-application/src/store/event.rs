use serde::Serialize;

/// Change notifications published by a `CollectionStore`.
///
/// Views subscribe to these instead of polling; the payload only names
/// what changed, the current values are read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// A refresh replaced the whole snapshot.
    SnapshotReplaced { len: usize, total: usize },
    /// One record was replaced in place (optimistically or by the server).
    RecordReplaced { id: String, optimistic: bool },
    /// Records were removed from the snapshot.
    RecordsRemoved { ids: Vec<String>, optimistic: bool },
    /// The selection set changed.
    SelectionChanged { len: usize },
    /// An optimistic change was rolled back.
    Reverted { operation: &'static str },
    /// An operation failed; the message is also kept as the last error.
    Failed {
        operation: &'static str,
        message: String,
    },
}
