// Task records: the durable description of one pending remote mutation.

use serde::{Deserialize, Serialize};

use crate::note::NoteId;

/// The remote-side effect a task performs.
///
/// A closed set: the executor matches exhaustively, so adding a kind is a
/// compile-time-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Create,
    Update,
    Delete,
    SetPin,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::SetPin => "set_pin",
        }
    }
}

/// One pending remote operation for a note.
///
/// At most one record is outstanding per note ID; scheduling a newer one
/// supersedes the old (latest intent wins). `note_id` is the local ID at
/// enqueue time, which for a pending create is still temporary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub kind: TaskKind,
    pub note_id: NoteId,
}

impl TaskRecord {
    pub fn new(kind: TaskKind, note_id: NoteId) -> Self {
        Self { kind, note_id }
    }
}

/// Externally visible status of a scheduled task.
///
/// The engine's richer execution states collapse into this set:
/// queued/running map to `Scheduled`; everything else is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Scheduled,
    Completed,
    Cancelled,
    Failed,
}

impl TaskStatus {
    /// Terminal statuses never change again.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Scheduled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}
