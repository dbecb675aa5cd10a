// Remote note service boundary.
//
// Four idempotent-intent operations plus a bulk fetch. Errors cross this
// boundary only as `RemoteError` values carrying a message; the task
// executor turns each one into a retry-or-fail decision, so nothing else
// may escape an adapter.

use async_trait::async_trait;
use thiserror::Error;

use notula_common::note::{Note, NoteId};

pub mod http;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("remote note service error: {message}")]
pub struct RemoteError {
    pub message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Client for the remote note service.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// The full authoritative note set. IDs are always durable.
    async fn fetch_all(&self) -> RemoteResult<Vec<Note>>;

    /// Create the note remotely; returns the server-assigned durable ID.
    /// The note's own (temporary) ID never leaves the client.
    async fn create(&self, note: &Note) -> RemoteResult<NoteId>;

    async fn update(&self, id: &NoteId, title: &str, body: &str) -> RemoteResult<()>;

    async fn delete(&self, id: &NoteId) -> RemoteResult<()>;

    async fn set_pin(&self, id: &NoteId, pinned: bool) -> RemoteResult<()>;
}
