// Note mutation entry points: optimistic local writes plus task
// scheduling.
//
// Every mutation follows the same two-step shape: apply to the local
// store immediately, then enqueue the matching remote task. Whether the
// note's ID is still temporary decides the task kind at every site — a
// note the server has never seen always (re-)queues Create, whatever
// the edit was.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use notula_common::note::{Note, NoteId};
use notula_common::task::{TaskKind, TaskRecord};

use crate::session::Session;
use crate::store::LocalStore;
use crate::tasks::manager::TaskManager;
use crate::tasks::{TaskHandle, TaskKey};

pub struct Notebook {
    store: Arc<dyn LocalStore>,
    tasks: TaskManager,
    session: Session,
}

impl Notebook {
    pub fn new(store: Arc<dyn LocalStore>, tasks: TaskManager, session: Session) -> Self {
        Self { store, tasks, session }
    }

    /// Create a note under a fresh temporary ID and queue its create.
    pub async fn add(&self, title: &str, body: &str) -> Result<(Note, TaskHandle)> {
        if title.trim().is_empty() {
            bail!("note title must not be empty");
        }
        if body.trim().is_empty() {
            bail!("note body must not be empty");
        }

        let note = Note::new_local(title, body);
        self.store
            .insert_or_replace(note.clone())
            .await
            .context("failed to store new note")?;
        let handle = self.tasks.schedule_task(TaskRecord::new(TaskKind::Create, note.id.clone()));
        debug!(note_id = %note.id, "queued note create");
        Ok((note, handle))
    }

    /// Edit title and body in place. A note still pending its initial
    /// create re-queues Create; otherwise Update.
    pub async fn update(&self, id: &NoteId, title: &str, body: &str) -> Result<TaskHandle> {
        if title.trim().is_empty() {
            bail!("note title must not be empty");
        }
        if body.trim().is_empty() {
            bail!("note body must not be empty");
        }

        self.store
            .update_fields(id, title, body)
            .await
            .with_context(|| format!("failed to update note `{id}` locally"))?;

        let kind = if id.is_temporary() { TaskKind::Create } else { TaskKind::Update };
        Ok(self.tasks.schedule_task(TaskRecord::new(kind, id.clone())))
    }

    /// Delete locally. A note that never reached the server needs no
    /// remote task — only the cancellation of its pending create.
    pub async fn delete(&self, id: &NoteId) -> Result<Option<TaskHandle>> {
        self.store
            .delete(id)
            .await
            .with_context(|| format!("failed to delete note `{id}` locally"))?;

        if id.is_temporary() {
            self.tasks.cancel_pending(id);
            debug!(note_id = %id, "deleted never-synced note, no remote task");
            return Ok(None);
        }

        Ok(Some(self.tasks.schedule_task(TaskRecord::new(TaskKind::Delete, id.clone()))))
    }

    /// Flip the pin flag. Same temporary/durable rule as `update`.
    pub async fn set_pin(&self, id: &NoteId, pinned: bool) -> Result<TaskHandle> {
        self.store
            .update_pin(id, pinned)
            .await
            .with_context(|| format!("failed to update pin flag of note `{id}`"))?;

        let kind = if id.is_temporary() { TaskKind::Create } else { TaskKind::SetPin };
        Ok(self.tasks.schedule_task(TaskRecord::new(kind, id.clone())))
    }

    pub async fn get(&self, id: &NoteId) -> Result<Option<Note>> {
        self.store.get(id).await.context("failed to read note")
    }

    pub async fn list(&self) -> Result<Vec<Note>> {
        self.store.get_all().await.context("failed to list notes")
    }

    /// Schedule a remote pull. Refused while signed out: the returned
    /// handle is already cancelled, since scheduling itself never errors.
    pub fn sync(&self) -> TaskHandle {
        if !self.session.is_authenticated() {
            debug!("sync requested while signed out; refusing");
            return TaskHandle::cancelled(TaskKey::Sync);
        }
        self.tasks.schedule_sync()
    }

    /// Sign out: abort all queued work and clear local data.
    pub async fn logout(&self) -> Result<()> {
        self.session.sign_out();
        self.tasks.abort_all();
        self.store.delete_all().await.context("failed to clear local notes on logout")?;
        info!("signed out; local state cleared");
        Ok(())
    }
}
