// Shared test doubles for the engine integration tests.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use notula_common::note::{Note, NoteId};
use notula_engine::reconciler::PendingTasks;
use notula_engine::remote::{RemoteClient, RemoteError, RemoteResult};

/// A single recorded remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    FetchAll,
    Create { title: String, body: String },
    Update { id: String, title: String, body: String },
    Delete { id: String },
    SetPin { id: String, pinned: bool },
}

/// Scripted remote: records every call, fails a configurable number of
/// times before succeeding (-1 = always fail), hands out server IDs from
/// a queue (falling back to a counter), and serves a fixed fetch result.
#[derive(Default)]
pub struct ScriptedRemote {
    calls: Mutex<Vec<RemoteCall>>,
    fail_remaining: Mutex<i64>,
    assigned_ids: Mutex<VecDeque<String>>,
    next_server_id: AtomicU64,
    fetch_result: Mutex<Vec<Note>>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn always_failing() -> Self {
        Self { fail_remaining: Mutex::new(-1), ..Self::default() }
    }

    /// Fail the next `times` calls (-1 = every call from now on).
    pub fn fail_next(&self, times: i64) {
        *self.fail_remaining.lock().expect("failure lock") = times;
    }

    /// Queue a server ID for the next successful create.
    pub fn assign_id(&self, id: &str) {
        self.assigned_ids.lock().expect("id lock").push_back(id.to_string());
    }

    pub fn set_fetch_result(&self, notes: Vec<Note>) {
        *self.fetch_result.lock().expect("fetch lock") = notes;
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: RemoteCall) -> RemoteResult<()> {
        self.calls.lock().expect("calls lock").push(call);
        let mut remaining = self.fail_remaining.lock().expect("failure lock");
        match *remaining {
            0 => Ok(()),
            n => {
                if n > 0 {
                    *remaining = n - 1;
                }
                Err(RemoteError::new("scripted failure"))
            }
        }
    }
}

#[async_trait]
impl RemoteClient for ScriptedRemote {
    async fn fetch_all(&self) -> RemoteResult<Vec<Note>> {
        self.record(RemoteCall::FetchAll)?;
        Ok(self.fetch_result.lock().expect("fetch lock").clone())
    }

    async fn create(&self, note: &Note) -> RemoteResult<NoteId> {
        self.record(RemoteCall::Create { title: note.title.clone(), body: note.body.clone() })?;
        let id = self
            .assigned_ids
            .lock()
            .expect("id lock")
            .pop_front()
            .unwrap_or_else(|| (self.next_server_id.fetch_add(1, Ordering::SeqCst) + 1).to_string());
        Ok(NoteId::from(id))
    }

    async fn update(&self, id: &NoteId, title: &str, body: &str) -> RemoteResult<()> {
        self.record(RemoteCall::Update {
            id: id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        })
    }

    async fn delete(&self, id: &NoteId) -> RemoteResult<()> {
        self.record(RemoteCall::Delete { id: id.to_string() })
    }

    async fn set_pin(&self, id: &NoteId, pinned: bool) -> RemoteResult<()> {
        self.record(RemoteCall::SetPin { id: id.to_string(), pinned })
    }
}

/// Pending-task probe backed by a fixed ID set.
#[derive(Default)]
pub struct FixedPending {
    ids: HashSet<NoteId>,
}

impl FixedPending {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn of(ids: &[&str]) -> Self {
        Self { ids: ids.iter().map(|id| NoteId::from(*id)).collect() }
    }
}

impl PendingTasks for FixedPending {
    fn has_pending(&self, id: &NoteId) -> bool {
        self.ids.contains(id)
    }
}

/// A note with a fixed ID, for seeding stores and fetch results.
pub fn note(id: &str, title: &str, body: &str) -> Note {
    Note {
        id: NoteId::from(id),
        title: title.to_string(),
        body: body.to_string(),
        created_at: Utc::now(),
        is_pinned: false,
    }
}
