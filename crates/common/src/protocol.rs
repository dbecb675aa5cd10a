// Wire payloads for the remote note service REST API.
//
// The engine consumes this surface through its `RemoteClient` boundary;
// the server side is owned elsewhere. Endpoints:
//
//   GET    /notes           -> NoteListResponse
//   POST   /notes           -> CreateNoteResponse
//   PUT    /notes/{id}      -> ()
//   DELETE /notes/{id}      -> ()
//   PUT    /notes/{id}/pin  -> ()
//
// Non-2xx responses carry an `ErrorResponse` body where possible.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::note::{Note, NoteId};

pub const NOTES_PATH: &str = "/notes";

/// Path for operations on a single note.
pub fn note_path(id: &NoteId) -> String {
    format!("{NOTES_PATH}/{id}")
}

/// Path for the pin flag of a single note.
pub fn pin_path(id: &NoteId) -> String {
    format!("{NOTES_PATH}/{id}/pin")
}

/// A note as the server represents it. IDs here are always durable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteNote {
    pub id: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub is_pinned: bool,
}

impl From<RemoteNote> for Note {
    fn from(remote: RemoteNote) -> Self {
        Self {
            id: NoteId::from(remote.id),
            title: remote.title,
            body: remote.body,
            created_at: remote.created_at,
            is_pinned: remote.is_pinned,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteListResponse {
    pub notes: Vec<RemoteNote>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub is_pinned: bool,
}

/// Server-assigned durable ID for a freshly created note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNoteResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPinRequest {
    pub is_pinned: bool,
}

/// Error body for non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
