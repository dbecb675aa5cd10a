// Task manager scheduling semantics: replace-on-submit, per-note lanes,
// sync deduplication, abort.
//
// These tests run on the current-thread runtime: spawned lane workers
// only execute once the test body awaits, so scheduling several tasks
// "before the first executes" is deterministic.

mod support;

use std::sync::Arc;

use notula_common::note::NoteId;
use notula_common::task::{TaskKind, TaskRecord, TaskStatus};
use notula_engine::store::memory::MemoryStore;
use notula_engine::store::LocalStore;
use notula_engine::remote::RemoteClient;
use notula_engine::tasks::executor::{RetryPolicy, TaskExecutor};
use notula_engine::tasks::manager::TaskManager;

use support::{note, RemoteCall, ScriptedRemote};

fn manager_with(
    store: &Arc<MemoryStore>,
    remote: &Arc<ScriptedRemote>,
    attempts: u32,
) -> TaskManager {
    TaskManager::new(TaskExecutor::new(
        Arc::clone(store) as Arc<dyn LocalStore>,
        Arc::clone(remote) as Arc<dyn RemoteClient>,
        RetryPolicy::immediate(attempts),
    ))
}

#[tokio::test]
async fn newer_task_supersedes_a_pending_one_for_the_same_note() {
    let store = Arc::new(MemoryStore::new());
    let remote = Arc::new(ScriptedRemote::new());
    store.insert_or_replace(note("42", "Title A", "Body A")).await.expect("insert");
    let manager = manager_with(&store, &remote, 3);

    let first = manager.schedule_task(TaskRecord::new(TaskKind::SetPin, NoteId::from("42")));
    let second = manager.schedule_task(TaskRecord::new(TaskKind::Update, NoteId::from("42")));

    assert_eq!(second.outcome().await, TaskStatus::Completed);
    assert_eq!(first.outcome().await, TaskStatus::Cancelled);

    let calls = remote.calls();
    assert_eq!(calls.len(), 1, "only the latest intent may execute");
    assert!(matches!(calls[0], RemoteCall::Update { .. }));
}

#[tokio::test]
async fn abort_all_prevents_scheduled_tasks_from_ever_completing() {
    let store = Arc::new(MemoryStore::new());
    let remote = Arc::new(ScriptedRemote::new());
    store.insert_or_replace(note("42", "Title A", "Body A")).await.expect("insert");
    let manager = manager_with(&store, &remote, 3);

    let handle = manager.schedule_task(TaskRecord::new(TaskKind::Update, NoteId::from("42")));
    manager.abort_all();

    assert_eq!(handle.outcome().await, TaskStatus::Cancelled);
    assert!(remote.calls().is_empty(), "aborted work must never reach the remote");
}

#[tokio::test]
async fn tasks_scheduled_after_an_abort_run_normally() {
    let store = Arc::new(MemoryStore::new());
    let remote = Arc::new(ScriptedRemote::new());
    store.insert_or_replace(note("42", "Title A", "Body A")).await.expect("insert");
    let manager = manager_with(&store, &remote, 3);

    manager.abort_all();
    let handle = manager.schedule_task(TaskRecord::new(TaskKind::Update, NoteId::from("42")));

    assert_eq!(handle.outcome().await, TaskStatus::Completed);
    assert_eq!(remote.calls().len(), 1);
}

#[tokio::test]
async fn a_second_sync_supersedes_an_outstanding_one() {
    let store = Arc::new(MemoryStore::new());
    let remote = Arc::new(ScriptedRemote::new());
    let manager = manager_with(&store, &remote, 3);

    let first = manager.schedule_sync();
    let second = manager.schedule_sync();

    assert_eq!(second.outcome().await, TaskStatus::Completed);
    assert_eq!(first.outcome().await, TaskStatus::Cancelled);
    assert_eq!(remote.calls(), vec![RemoteCall::FetchAll]);
}

#[tokio::test]
async fn tasks_for_distinct_notes_all_execute() {
    let store = Arc::new(MemoryStore::new());
    let remote = Arc::new(ScriptedRemote::new());
    store.insert_or_replace(note("1", "one", "body")).await.expect("insert");
    store.insert_or_replace(note("2", "two", "body")).await.expect("insert");
    let manager = manager_with(&store, &remote, 3);

    let first = manager.schedule_task(TaskRecord::new(TaskKind::Update, NoteId::from("1")));
    let second = manager.schedule_task(TaskRecord::new(TaskKind::Update, NoteId::from("2")));

    assert_eq!(first.outcome().await, TaskStatus::Completed);
    assert_eq!(second.outcome().await, TaskStatus::Completed);
    assert_eq!(remote.calls().len(), 2);
}

#[tokio::test]
async fn a_lane_accepts_new_work_after_its_task_finished() {
    let store = Arc::new(MemoryStore::new());
    let remote = Arc::new(ScriptedRemote::new());
    store.insert_or_replace(note("42", "Title A", "Body A")).await.expect("insert");
    let manager = manager_with(&store, &remote, 3);

    let first = manager.schedule_task(TaskRecord::new(TaskKind::Update, NoteId::from("42")));
    assert_eq!(first.outcome().await, TaskStatus::Completed);

    let second = manager.schedule_task(TaskRecord::new(TaskKind::Delete, NoteId::from("42")));
    assert_eq!(second.outcome().await, TaskStatus::Completed);

    let calls = remote.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[1], RemoteCall::Delete { .. }));
}

#[tokio::test]
async fn observed_status_sequence_starts_scheduled_and_ends_terminal() {
    let store = Arc::new(MemoryStore::new());
    let remote = Arc::new(ScriptedRemote::always_failing());
    let manager = manager_with(&store, &remote, 3);

    let handle = manager.schedule_task(TaskRecord::new(TaskKind::Delete, NoteId::from("42")));
    let observed = handle.observe().collect().await;

    assert_eq!(observed.first(), Some(&TaskStatus::Scheduled));
    assert_eq!(observed.last(), Some(&TaskStatus::Failed));
    assert!(observed[..observed.len() - 1].iter().all(|s| *s == TaskStatus::Scheduled));
    assert_eq!(remote.calls().len(), 3, "bounded retry: exactly the configured attempts");
}

#[tokio::test]
async fn status_lookup_through_the_manager_matches_the_handle() {
    let store = Arc::new(MemoryStore::new());
    let remote = Arc::new(ScriptedRemote::new());
    let manager = manager_with(&store, &remote, 3);

    let handle = manager.schedule_sync();
    assert_eq!(manager.status(&handle), TaskStatus::Scheduled);

    assert_eq!(handle.outcome().await, TaskStatus::Completed);
    assert_eq!(manager.status(&handle), TaskStatus::Completed);
}
