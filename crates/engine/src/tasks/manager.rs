// Task manager: replace-on-submit scheduling keyed by note ID.
//
// One lane per key holds at most one pending intent; scheduling a newer
// task for the same key supersedes the old one, whose observers see
// `Cancelled`. A detached worker drains each lane, so effects for one
// note apply serially while distinct notes proceed concurrently. The
// global sync pull occupies its own fixed lane.
//
// `abort_all` bumps a global epoch: pending work is cancelled on the
// spot, and running work finishes its current remote call but is never
// retried afterward.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, info};

use notula_common::note::NoteId;
use notula_common::task::{TaskRecord, TaskStatus};

use crate::reconciler::PendingTasks;

use super::executor::{ExecOutcome, TaskExecutor};
use super::{AbortCheck, StatusStream, TaskHandle, TaskKey, Work};

struct ScheduledWork {
    work: Work,
    status_tx: watch::Sender<TaskStatus>,
    epoch: u64,
}

#[derive(Default)]
struct Lane {
    pending: Option<ScheduledWork>,
    running: bool,
}

struct ManagerInner {
    executor: TaskExecutor,
    lanes: Mutex<HashMap<TaskKey, Lane>>,
    epoch: Arc<AtomicU64>,
}

#[derive(Clone)]
pub struct TaskManager {
    inner: Arc<ManagerInner>,
}

impl TaskManager {
    pub fn new(executor: TaskExecutor) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                executor,
                lanes: Mutex::new(HashMap::new()),
                epoch: Arc::new(AtomicU64::new(0)),
            }),
        }
    }

    /// Enqueue one note task. Never fails synchronously; execution
    /// failures surface only through the handle's status.
    pub fn schedule_task(&self, record: TaskRecord) -> TaskHandle {
        self.schedule(Work::Note(record))
    }

    /// Enqueue the global remote pull. At most one sync is outstanding;
    /// a second call supersedes it rather than running two concurrently.
    pub fn schedule_sync(&self) -> TaskHandle {
        self.schedule(Work::Sync)
    }

    /// Synchronous status snapshot for a handle.
    pub fn status(&self, handle: &TaskHandle) -> TaskStatus {
        handle.status()
    }

    /// Observe a handle's statuses up to and including the terminal one.
    pub fn observe(&self, handle: &TaskHandle) -> StatusStream {
        handle.observe()
    }

    /// Cancel the pending task for one note, if any. Used when a note
    /// that never reached the server is deleted locally.
    pub fn cancel_pending(&self, note_id: &NoteId) {
        let mut lanes = self.lanes();
        let key = TaskKey::Note(note_id.clone());
        if let Some(lane) = lanes.get_mut(&key) {
            if let Some(superseded) = lane.pending.take() {
                let _ = superseded.status_tx.send(TaskStatus::Cancelled);
                debug!(note_id = %note_id, "cancelled pending task");
            }
            if !lane.running {
                lanes.remove(&key);
            }
        }
    }

    /// Cancel every outstanding and queued task. Running remote calls
    /// finish but nothing is retried or rescheduled afterward.
    pub fn abort_all(&self) {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);

        let mut lanes = self.lanes();
        let mut cancelled = 0usize;
        for lane in lanes.values_mut() {
            if let Some(superseded) = lane.pending.take() {
                let _ = superseded.status_tx.send(TaskStatus::Cancelled);
                cancelled += 1;
            }
        }
        lanes.retain(|_, lane| lane.running);
        info!(cancelled, "aborted all queued tasks");
    }

    fn schedule(&self, work: Work) -> TaskHandle {
        let key = work.key();
        let (status_tx, status_rx) = watch::channel(TaskStatus::Scheduled);
        let scheduled = ScheduledWork {
            work,
            status_tx,
            epoch: self.inner.epoch.load(Ordering::SeqCst),
        };

        let spawn_worker = {
            let mut lanes = self.lanes();
            let lane = lanes.entry(key.clone()).or_default();
            if let Some(superseded) = lane.pending.replace(scheduled) {
                let _ = superseded.status_tx.send(TaskStatus::Cancelled);
                debug!(key = ?key, "superseded pending task");
            }
            if lane.running {
                false
            } else {
                lane.running = true;
                true
            }
        };

        if spawn_worker {
            let manager = self.clone();
            let worker_key = key.clone();
            tokio::spawn(async move {
                manager.drain_lane(worker_key).await;
            });
        }

        TaskHandle::new(key, status_rx)
    }

    async fn drain_lane(&self, key: TaskKey) {
        loop {
            let scheduled = {
                let mut lanes = self.lanes();
                let Some(lane) = lanes.get_mut(&key) else { return };
                match lane.pending.take() {
                    Some(scheduled) => {
                        lane.running = true;
                        Some(scheduled)
                    }
                    None => {
                        lanes.remove(&key);
                        None
                    }
                }
            };
            let Some(scheduled) = scheduled else { return };

            let abort = AbortCheck::new(scheduled.epoch, Arc::clone(&self.inner.epoch));
            if abort.is_aborted() {
                let _ = scheduled.status_tx.send(TaskStatus::Cancelled);
                continue;
            }

            let outcome = self
                .inner
                .executor
                .execute(&scheduled.work, &scheduled.status_tx, self, &abort)
                .await;

            let status = match outcome {
                ExecOutcome::Completed => TaskStatus::Completed,
                ExecOutcome::Failed => TaskStatus::Failed,
                ExecOutcome::Aborted => TaskStatus::Cancelled,
            };
            let _ = scheduled.status_tx.send(status);
            debug!(key = ?key, status = status.as_str(), "task finished");
        }
    }

    fn lanes(&self) -> MutexGuard<'_, HashMap<TaskKey, Lane>> {
        // Recover the map if a worker panicked while holding the lock.
        self.inner.lanes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PendingTasks for TaskManager {
    fn has_pending(&self, id: &NoteId) -> bool {
        let lanes = self.lanes();
        lanes
            .get(&TaskKey::Note(id.clone()))
            .map(|lane| lane.pending.is_some() || lane.running)
            .unwrap_or(false)
    }
}
