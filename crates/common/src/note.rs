// Core note domain types shared across all Notula crates.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reserved prefix for client-minted note identifiers.
///
/// The server never assigns IDs with this prefix, so the prefix alone
/// distinguishes a note that is still pending its initial create from one
/// the server already knows about.
pub const TEMP_ID_PREFIX: &str = "TMP-";

/// Identifier of a note.
///
/// Two flavors share this type: *temporary* IDs minted on the client
/// (`TMP-<uuid>`) while a create is still queued, and *durable* IDs
/// assigned by the server. Every mutation site checks the flavor to
/// decide which task kind to schedule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Mint a fresh temporary ID for a note created locally.
    pub fn mint_temporary() -> Self {
        Self(format!("{TEMP_ID_PREFIX}{}", Uuid::new_v4()))
    }

    /// Whether this ID is client-minted and has not yet been replaced by
    /// a server-assigned one.
    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMP_ID_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A short text note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub is_pinned: bool,
}

impl Note {
    /// Build a note under a fresh temporary ID (pending create).
    pub fn new_local(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: NoteId::mint_temporary(),
            title: title.into(),
            body: body.into(),
            created_at: Utc::now(),
            is_pinned: false,
        }
    }

    /// The same note under a different ID, content unchanged. Used when a
    /// create completes and the server hands back the durable ID.
    pub fn with_id(mut self, id: NoteId) -> Self {
        self.id = id;
        self
    }
}
