// Reconciler semantics: in-flight notes are never clobbered, sync is
// idempotent, failures leave local data untouched, and absence from a
// fetch never deletes anything.

mod support;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use notula_common::note::NoteId;
use notula_common::task::TaskStatus;
use notula_engine::reconciler::{run_sync, spawn_periodic};
use notula_engine::remote::RemoteClient;
use notula_engine::store::memory::MemoryStore;
use notula_engine::store::LocalStore;
use notula_engine::tasks::executor::{RetryPolicy, TaskExecutor};
use notula_engine::tasks::manager::TaskManager;

use support::{note, FixedPending, RemoteCall, ScriptedRemote};

#[tokio::test]
async fn remote_copies_of_in_flight_notes_are_skipped() {
    let store = MemoryStore::new();
    let remote = ScriptedRemote::new();

    store.insert_or_replace(note("42", "local edit", "unsynced body")).await.expect("insert");
    remote.set_fetch_result(vec![
        note("42", "stale remote title", "stale remote body"),
        note("7", "fresh remote note", "remote body"),
    ]);

    run_sync(&store, &remote, &FixedPending::of(&["42"])).await.expect("sync");

    let kept = store.get(&NoteId::from("42")).await.expect("get").expect("present");
    assert_eq!(kept.title, "local edit");
    assert_eq!(kept.body, "unsynced body");

    let pulled = store.get(&NoteId::from("7")).await.expect("get").expect("present");
    assert_eq!(pulled.title, "fresh remote note");
}

#[tokio::test]
async fn notes_without_in_flight_tasks_are_replaced_wholesale() {
    let store = MemoryStore::new();
    let remote = ScriptedRemote::new();

    store.insert_or_replace(note("42", "old title", "old body")).await.expect("insert");
    let mut remote_copy = note("42", "server title", "server body");
    remote_copy.is_pinned = true;
    remote.set_fetch_result(vec![remote_copy]);

    run_sync(&store, &remote, &FixedPending::none()).await.expect("sync");

    let replaced = store.get(&NoteId::from("42")).await.expect("get").expect("present");
    assert_eq!(replaced.title, "server title");
    assert_eq!(replaced.body, "server body");
    assert!(replaced.is_pinned);
}

#[tokio::test]
async fn running_sync_twice_with_an_unchanged_remote_is_idempotent() {
    let store = MemoryStore::new();
    let remote = ScriptedRemote::new();
    remote.set_fetch_result(vec![note("1", "one", "a"), note("2", "two", "b")]);

    run_sync(&store, &remote, &FixedPending::none()).await.expect("first sync");
    let after_first = store.get_all().await.expect("get_all");

    run_sync(&store, &remote, &FixedPending::none()).await.expect("second sync");
    let after_second = store.get_all().await.expect("get_all");

    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn a_failed_fetch_leaves_local_data_untouched() {
    let store = MemoryStore::new();
    let remote = ScriptedRemote::always_failing();

    store.insert_or_replace(note("42", "precious", "data")).await.expect("insert");
    remote.set_fetch_result(vec![note("42", "never applied", "never applied")]);

    let result = run_sync(&store, &remote, &FixedPending::none()).await;
    assert!(result.is_err());

    let untouched = store.get(&NoteId::from("42")).await.expect("get").expect("present");
    assert_eq!(untouched.title, "precious");
}

#[tokio::test]
async fn absence_from_the_fetched_set_never_deletes_local_notes() {
    let store = MemoryStore::new();
    let remote = ScriptedRemote::new();

    store.insert_or_replace(note("13", "local only", "body")).await.expect("insert");
    remote.set_fetch_result(vec![note("7", "remote note", "body")]);

    run_sync(&store, &remote, &FixedPending::none()).await.expect("sync");

    assert!(store.get(&NoteId::from("13")).await.expect("get").is_some());
    assert!(store.get(&NoteId::from("7")).await.expect("get").is_some());
}

#[tokio::test]
async fn a_scheduled_sync_pulls_the_remote_set_into_the_store() {
    let store = Arc::new(MemoryStore::new());
    let remote = Arc::new(ScriptedRemote::new());
    remote.set_fetch_result(vec![note("1", "one", "a"), note("2", "two", "b")]);

    let manager = TaskManager::new(TaskExecutor::new(
        Arc::clone(&store) as Arc<dyn LocalStore>,
        Arc::clone(&remote) as Arc<dyn RemoteClient>,
        RetryPolicy::immediate(3),
    ));

    let handle = manager.schedule_sync();
    assert_eq!(handle.outcome().await, TaskStatus::Completed);

    let all = store.get_all().await.expect("get_all");
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn the_periodic_driver_schedules_syncs_until_shutdown() {
    let store = Arc::new(MemoryStore::new());
    let remote = Arc::new(ScriptedRemote::new());
    remote.set_fetch_result(vec![note("1", "one", "a")]);

    let manager = TaskManager::new(TaskExecutor::new(
        Arc::clone(&store) as Arc<dyn LocalStore>,
        Arc::clone(&remote) as Arc<dyn RemoteClient>,
        RetryPolicy::immediate(3),
    ));

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let driver = spawn_periodic(manager, Duration::from_millis(10), shutdown_rx);

    // The first round fires immediately; wait for it to land.
    for _ in 0..200 {
        if !store.get_all().await.expect("get_all").is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    shutdown_tx.send(()).expect("driver is listening");
    driver.await.expect("driver task");

    let all = store.get_all().await.expect("get_all");
    assert_eq!(all.len(), 1);
    assert!(remote.calls().contains(&RemoteCall::FetchAll));
}

#[tokio::test]
async fn a_sync_that_keeps_failing_reports_failed() {
    let store = Arc::new(MemoryStore::new());
    let remote = Arc::new(ScriptedRemote::always_failing());

    let manager = TaskManager::new(TaskExecutor::new(
        Arc::clone(&store) as Arc<dyn LocalStore>,
        Arc::clone(&remote) as Arc<dyn RemoteClient>,
        RetryPolicy::immediate(3),
    ));

    let handle = manager.schedule_sync();
    assert_eq!(handle.outcome().await, TaskStatus::Failed);
    assert_eq!(remote.calls().len(), 3);
    assert!(store.get_all().await.expect("get_all").is_empty());
}
