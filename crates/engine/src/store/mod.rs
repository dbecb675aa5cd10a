// Local note storage boundary.
//
// The engine reads and writes note content only through `LocalStore`;
// adapters decide how records actually persist. Point operations must be
// safe to call concurrently — per-note ordering comes from task-lane
// serialization above this layer, not from the store.

use async_trait::async_trait;
use thiserror::Error;

use notula_common::note::{Note, NoteId};

pub mod memory;
pub mod sqlite;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("note `{0}` not found")]
    NotFound(NoteId),
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(error: impl std::fmt::Display) -> Self {
        Self::Backend(error.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Key-indexed mutable record storage for notes.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get(&self, id: &NoteId) -> StoreResult<Option<Note>>;

    /// All notes, ordered by creation time then ID.
    async fn get_all(&self) -> StoreResult<Vec<Note>>;

    async fn insert_or_replace(&self, note: Note) -> StoreResult<()>;

    async fn insert_or_replace_all(&self, notes: Vec<Note>) -> StoreResult<()>;

    /// Overwrite title and body of an existing note.
    async fn update_fields(&self, id: &NoteId, title: &str, body: &str) -> StoreResult<()>;

    /// Overwrite the pin flag of an existing note.
    async fn update_pin(&self, id: &NoteId, pinned: bool) -> StoreResult<()>;

    /// Replace a note's primary key, content unchanged. If a record
    /// already exists under `new_id` (a sync pulled the server copy
    /// before the create task finished) it is replaced.
    async fn rekey(&self, old_id: &NoteId, new_id: &NoteId) -> StoreResult<()>;

    /// Remove a note. Removing an absent ID is a no-op.
    async fn delete(&self, id: &NoteId) -> StoreResult<()>;

    async fn delete_all(&self) -> StoreResult<()>;
}
