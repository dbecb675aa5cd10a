// Task executor: performs one work item's remote-side effect with
// bounded retry and exponential backoff.
//
// Remote failures retry up to `RetryPolicy::max_attempts`; local store
// failures are terminal immediately. No error escapes `execute` — every
// failure path collapses into the returned outcome.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use notula_common::task::{TaskKind, TaskRecord, TaskStatus};

use crate::reconciler::{run_sync, PendingTasks, SyncError};
use crate::remote::{RemoteClient, RemoteError};
use crate::store::{LocalStore, StoreError};

use super::{AbortCheck, Work};

const BASE_DELAY_MS: u64 = 250;
const MAX_DELAY_MS: u64 = 30_000;
const MAX_ATTEMPTS: u32 = 3;

/// Retry bounds for remote calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: Duration::from_millis(BASE_DELAY_MS),
            max_delay: Duration::from_millis(MAX_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// No sleeping between attempts; used by tests and interactive flows.
    pub fn immediate(max_attempts: u32) -> Self {
        Self { max_attempts, base_delay: Duration::ZERO, max_delay: Duration::ZERO }
    }

    /// Exponential backoff delay before retrying after failed attempt
    /// number `attempt` (0-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = attempt.min(16); // cap exponent to avoid overflow
        let base_ms = self.base_delay.as_millis() as u64;
        let max_ms = self.max_delay.as_millis() as u64;
        let delay_ms = base_ms.saturating_mul(1u64 << exp).min(max_ms);
        Duration::from_millis(delay_ms)
    }
}

/// How one execution ended, as seen by the lane worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExecOutcome {
    Completed,
    Failed,
    Aborted,
}

enum AttemptError {
    Store(StoreError),
    Remote(RemoteError),
}

impl From<StoreError> for AttemptError {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}

impl From<RemoteError> for AttemptError {
    fn from(error: RemoteError) -> Self {
        Self::Remote(error)
    }
}

impl From<SyncError> for AttemptError {
    fn from(error: SyncError) -> Self {
        match error {
            SyncError::Store(error) => Self::Store(error),
            SyncError::Remote(error) => Self::Remote(error),
        }
    }
}

pub struct TaskExecutor {
    store: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteClient>,
    retry: RetryPolicy,
}

impl TaskExecutor {
    pub fn new(store: Arc<dyn LocalStore>, remote: Arc<dyn RemoteClient>, retry: RetryPolicy) -> Self {
        Self { store, remote, retry }
    }

    pub(crate) async fn execute(
        &self,
        work: &Work,
        status_tx: &watch::Sender<TaskStatus>,
        pending: &dyn PendingTasks,
        abort: &AbortCheck,
    ) -> ExecOutcome {
        for attempt in 0..self.retry.max_attempts {
            if attempt > 0 {
                let delay = self.retry.backoff_delay(attempt - 1);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                if abort.is_aborted() {
                    return ExecOutcome::Aborted;
                }
                // Re-announce: still scheduled, about to retry.
                let _ = status_tx.send(TaskStatus::Scheduled);
            }

            match self.attempt(work, pending).await {
                Ok(()) => return ExecOutcome::Completed,
                Err(AttemptError::Store(error)) => {
                    // Data-layer trouble will not self-heal; fail now.
                    warn!(%error, "local store failure while executing task");
                    return ExecOutcome::Failed;
                }
                Err(AttemptError::Remote(error)) => {
                    warn!(attempt, %error, "remote call failed");
                }
            }
        }

        ExecOutcome::Failed
    }

    async fn attempt(&self, work: &Work, pending: &dyn PendingTasks) -> Result<(), AttemptError> {
        match work {
            Work::Sync => {
                run_sync(self.store.as_ref(), self.remote.as_ref(), pending).await?;
                Ok(())
            }
            Work::Note(record) => self.attempt_note(record).await,
        }
    }

    async fn attempt_note(&self, record: &TaskRecord) -> Result<(), AttemptError> {
        match record.kind {
            TaskKind::Create => {
                let Some(note) = self.store.get(&record.note_id).await? else {
                    // Deleted locally before the create ever ran.
                    debug!(note_id = %record.note_id, "create target gone, nothing to do");
                    return Ok(());
                };
                // No idempotency token: if a create succeeds server-side
                // but the response is lost, a retry can duplicate the
                // note remotely. Known limitation.
                let server_id = self.remote.create(&note).await?;
                match self.store.rekey(&record.note_id, &server_id).await {
                    Ok(()) => {
                        debug!(old_id = %record.note_id, new_id = %server_id, "rekeyed created note");
                        Ok(())
                    }
                    Err(StoreError::NotFound(_)) => {
                        // The note vanished between the remote call and
                        // the rekey; treat like the deleted-before-run case.
                        debug!(note_id = %record.note_id, "note removed mid-create");
                        Ok(())
                    }
                    Err(error) => Err(error.into()),
                }
            }
            TaskKind::Update => {
                let Some(note) = self.store.get(&record.note_id).await? else {
                    return Ok(());
                };
                self.remote.update(&record.note_id, &note.title, &note.body).await?;
                Ok(())
            }
            TaskKind::Delete => {
                // The local row is already gone; only the remote side is left.
                self.remote.delete(&record.note_id).await?;
                Ok(())
            }
            TaskKind::SetPin => {
                let Some(note) = self.store.get(&record.note_id).await? else {
                    return Ok(());
                };
                self.remote.set_pin(&record.note_id, note.is_pinned).await?;
                Ok(())
            }
        }
    }
}
