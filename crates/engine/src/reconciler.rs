// Sync reconciler: merge the authoritative remote note set into local
// storage without clobbering notes that still have in-flight tasks.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use notula_common::note::NoteId;

use crate::remote::{RemoteClient, RemoteError};
use crate::store::{LocalStore, StoreError};
use crate::tasks::manager::TaskManager;

/// Read-only probe for notes with an in-flight task. The task manager
/// implements this; sync consults it to decide which remote copies are
/// stale relative to local intent.
pub trait PendingTasks: Send + Sync {
    fn has_pending(&self, id: &NoteId) -> bool;
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// One reconciliation round.
///
/// Fetches the full remote set; a fetch error leaves local data
/// untouched. Remote notes whose ID has a pending or running task are
/// skipped this round — their local content embodies intent the server
/// has not seen yet. Everything else is replaced wholesale. Local notes
/// absent from the fetch are left alone: deletion is driven only by
/// explicit delete tasks, never inferred from a fetch (which may be
/// partial).
pub async fn run_sync(
    store: &dyn LocalStore,
    remote: &dyn RemoteClient,
    pending: &dyn PendingTasks,
) -> Result<(), SyncError> {
    let fetched = remote.fetch_all().await?;
    let total = fetched.len();

    let mut merged = Vec::with_capacity(total);
    let mut skipped = 0usize;
    for note in fetched {
        if pending.has_pending(&note.id) {
            debug!(note_id = %note.id, "skipping remote copy of note with in-flight task");
            skipped += 1;
            continue;
        }
        merged.push(note);
    }

    let applied = merged.len();
    store.insert_or_replace_all(merged).await?;

    info!(total, applied, skipped, "sync round merged remote notes");
    Ok(())
}

/// Schedule a sync on `manager` every `interval` until `shutdown` fires.
/// The first round is scheduled immediately on spawn.
pub fn spawn_periodic(
    manager: TaskManager,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    debug!("scheduling periodic sync");
                    let _ = manager.schedule_sync();
                }
                _ = shutdown.recv() => {
                    info!("periodic sync loop stopped");
                    return;
                }
            }
        }
    })
}
