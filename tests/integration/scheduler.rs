//! Scheduler loop behavior against real on-disk storage.

use crate::common::wait_for_event;
use chrono::Utc;
use reprise::testing::RecordingHandler;
use reprise::{
    Event, EventBus, Interval, JsonDirStore, ProfileConfig, ProfileStore, Scheduler,
    SchedulerError, SchedulerHandle, SchedulerState, ZonedCalendar,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::{tempdir, TempDir};
use tokio::task::JoinHandle;

const EVENT_TIMEOUT: Duration = Duration::from_secs(2);

/// A profile whose first occurrence is long overdue.
fn overdue_profile(name: &str) -> ProfileConfig {
    ProfileConfig::builder(name)
        .target_dir(format!("/backups/{name}"))
        .interval(Interval::any())
        .build("2020-01-01T00:00:00Z".parse().unwrap(), &ZonedCalendar::utc())
        .unwrap()
}

/// A profile that will not come due on its own during a test.
fn idle_profile(name: &str) -> ProfileConfig {
    ProfileConfig::builder(name)
        .target_dir(format!("/backups/{name}"))
        .interval(Interval::daily(3, 0).unwrap())
        .build(Utc::now(), &ZonedCalendar::utc())
        .unwrap()
}

async fn started_scheduler(
    dir: &TempDir,
) -> (
    Arc<JsonDirStore>,
    Arc<RecordingHandler>,
    SchedulerHandle,
    JoinHandle<()>,
) {
    let store = Arc::new(JsonDirStore::new(dir.path()).unwrap());
    let handler = Arc::new(RecordingHandler::new());
    let bus = EventBus::new();
    bus.register(handler.clone()).await;
    let scheduler = Scheduler::with_store(store.clone())
        .with_event_bus(bus)
        .with_tick_interval(Duration::from_millis(10));
    let (handle, task) = scheduler.start().await;
    (store, handler, handle, task)
}

#[tokio::test]
async fn test_due_profile_announced_and_reschedule_persisted() {
    let dir = tempdir().unwrap();
    let (store, handler, handle, task) = started_scheduler(&dir).await;

    let profile = overdue_profile("docs");
    let id = profile.id();
    let due_at = profile.next_backup();
    store.save_profile(profile).await.unwrap();

    let event = wait_for_event(
        &handler,
        |e| matches!(e, Event::BackupDue { profile_id, .. } if *profile_id == id),
        EVENT_TIMEOUT,
    )
    .await;
    match event {
        Event::BackupDue { due_at: at, .. } => assert_eq!(at, due_at),
        _ => unreachable!(),
    }

    wait_for_event(
        &handler,
        |e| matches!(e, Event::ProfileRescheduled { profile_id, .. } if *profile_id == id),
        EVENT_TIMEOUT,
    )
    .await;

    // The reschedule reached disk, not just memory.
    let stored = store.get_profile(id).await.unwrap();
    assert!(stored.next_backup() > due_at);

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn test_paused_scheduler_stays_quiet() {
    let dir = tempdir().unwrap();
    let (store, handler, handle, task) = started_scheduler(&dir).await;

    handle.pause().await.unwrap();
    assert_eq!(handle.state().await, SchedulerState::Paused);

    store.save_profile(overdue_profile("docs")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(handler.is_empty().await);

    handle.resume().await.unwrap();
    wait_for_event(
        &handler,
        |e| matches!(e, Event::BackupDue { .. }),
        EVENT_TIMEOUT,
    )
    .await;

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn test_trigger_runs_early_and_persists() {
    let dir = tempdir().unwrap();
    let (store, handler, handle, task) = started_scheduler(&dir).await;

    let profile = idle_profile("docs");
    let id = profile.id();
    store.save_profile(profile).await.unwrap();

    let next = handle.trigger(id).await.unwrap();
    assert!(next > Utc::now());
    assert_eq!(store.get_profile(id).await.unwrap().next_backup(), next);

    let events = handler.events().await;
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::BackupDue { profile_id, .. } if *profile_id == id)));
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::ProfileRescheduled { profile_id, .. } if *profile_id == id)));

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn test_remove_deletes_file_and_announces() {
    let dir = tempdir().unwrap();
    let (store, handler, handle, task) = started_scheduler(&dir).await;

    let profile = idle_profile("docs");
    let id = profile.id();
    store.save_profile(profile).await.unwrap();
    assert!(dir.path().join(format!("{id}.json")).exists());

    handle.remove(id).await.unwrap();
    assert!(!dir.path().join(format!("{id}.json")).exists());

    wait_for_event(
        &handler,
        |e| matches!(e, Event::ProfileRemoved { profile_id, .. } if *profile_id == id),
        EVENT_TIMEOUT,
    )
    .await;

    let err = handle.trigger(id).await.unwrap_err();
    assert!(matches!(err, SchedulerError::ProfileNotFound(missing) if missing == id));

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn test_shutdown_is_clean() {
    let dir = tempdir().unwrap();
    let (_store, _handler, handle, task) = started_scheduler(&dir).await;

    handle.shutdown().await.unwrap();
    task.await.unwrap();
    assert_eq!(handle.state().await, SchedulerState::Stopped);
}
