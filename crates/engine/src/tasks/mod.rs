// Task scheduling model: lanes keyed by note ID, handles, status streams.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use notula_common::note::NoteId;
use notula_common::task::{TaskRecord, TaskStatus};

pub mod executor;
pub mod manager;

/// Key a unit of work is deduplicated under: one lane per note, plus a
/// single well-known lane for the global sync pull.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskKey {
    Note(NoteId),
    Sync,
}

/// Work items a lane can carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Work {
    Note(TaskRecord),
    Sync,
}

impl Work {
    pub fn key(&self) -> TaskKey {
        match self {
            Self::Note(record) => TaskKey::Note(record.note_id.clone()),
            Self::Sync => TaskKey::Sync,
        }
    }
}

/// Handle to one scheduled task: query or observe its status.
///
/// Dropping a handle never affects the task; it only stops observing.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    key: TaskKey,
    status_rx: watch::Receiver<TaskStatus>,
}

impl TaskHandle {
    pub(crate) fn new(key: TaskKey, status_rx: watch::Receiver<TaskStatus>) -> Self {
        Self { key, status_rx }
    }

    /// A handle born terminal, for work refused at the door (e.g. sync
    /// while signed out).
    pub(crate) fn cancelled(key: TaskKey) -> Self {
        let (_, status_rx) = watch::channel(TaskStatus::Cancelled);
        Self { key, status_rx }
    }

    pub fn key(&self) -> &TaskKey {
        &self.key
    }

    /// Current status snapshot; never blocks on I/O.
    pub fn status(&self) -> TaskStatus {
        *self.status_rx.borrow()
    }

    /// Lazy, finite sequence of statuses ending at the terminal one.
    pub fn observe(&self) -> StatusStream {
        StatusStream { rx: self.status_rx.clone(), yielded_current: false, done: false }
    }

    /// Wait for the task to reach a terminal status.
    pub async fn outcome(&self) -> TaskStatus {
        let mut rx = self.status_rx.clone();
        loop {
            let status = *rx.borrow_and_update();
            if status.is_terminal() {
                return status;
            }
            if rx.changed().await.is_err() {
                // publisher gone; the last published value is all there is
                return *rx.borrow();
            }
        }
    }
}

/// Sequence of observed task statuses. Intermediate values may be
/// coalesced under a slow consumer; the terminal status is always the
/// last element. Dropping the stream early leaks nothing.
pub struct StatusStream {
    rx: watch::Receiver<TaskStatus>,
    yielded_current: bool,
    done: bool,
}

impl StatusStream {
    pub async fn next(&mut self) -> Option<TaskStatus> {
        if self.done {
            return None;
        }

        if !self.yielded_current {
            self.yielded_current = true;
            let status = *self.rx.borrow_and_update();
            self.done = status.is_terminal();
            return Some(status);
        }

        match self.rx.changed().await {
            Ok(()) => {
                let status = *self.rx.borrow_and_update();
                self.done = status.is_terminal();
                Some(status)
            }
            Err(_) => {
                self.done = true;
                None
            }
        }
    }

    /// Drain the stream to completion and return everything observed.
    pub async fn collect(mut self) -> Vec<TaskStatus> {
        let mut statuses = Vec::new();
        while let Some(status) = self.next().await {
            statuses.push(status);
        }
        statuses
    }
}

/// Checked before work starts and between retry attempts: true once
/// `abort_all` has run since this task was scheduled.
#[derive(Debug, Clone)]
pub(crate) struct AbortCheck {
    scheduled_epoch: u64,
    current_epoch: Arc<AtomicU64>,
}

impl AbortCheck {
    pub(crate) fn new(scheduled_epoch: u64, current_epoch: Arc<AtomicU64>) -> Self {
        Self { scheduled_epoch, current_epoch }
    }

    pub(crate) fn is_aborted(&self) -> bool {
        self.current_epoch.load(Ordering::SeqCst) != self.scheduled_epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn status_stream_ends_at_the_terminal_status() {
        let (tx, rx) = watch::channel(TaskStatus::Scheduled);
        let handle = TaskHandle::new(TaskKey::Sync, rx);

        let mut stream = handle.observe();
        assert_eq!(stream.next().await, Some(TaskStatus::Scheduled));

        tx.send(TaskStatus::Completed).expect("receiver alive");
        assert_eq!(stream.next().await, Some(TaskStatus::Completed));
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn born_cancelled_handles_are_terminal_immediately() {
        let handle = TaskHandle::cancelled(TaskKey::Sync);

        assert_eq!(handle.status(), TaskStatus::Cancelled);
        assert_eq!(handle.outcome().await, TaskStatus::Cancelled);
        assert_eq!(handle.observe().collect().await, vec![TaskStatus::Cancelled]);
    }

    #[test]
    fn abort_check_trips_on_epoch_change() {
        let epoch = Arc::new(AtomicU64::new(0));
        let check = AbortCheck::new(0, Arc::clone(&epoch));

        assert!(!check.is_aborted());
        epoch.fetch_add(1, Ordering::SeqCst);
        assert!(check.is_aborted());
    }
}
