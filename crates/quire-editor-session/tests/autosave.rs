mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{RecordingStore, markdown_patch};
use quire_common::DocumentKind;
use quire_editor_session::AutosaveCoordinator;
use tokio::time::sleep;

const DELAY: Duration = Duration::from_millis(30);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[tokio::test(start_paused = true)]
async fn test_burst_persists_once_after_last_edit() {
    let store = Arc::new(RecordingStore::new(Duration::ZERO));
    let id = store.seed(DocumentKind::Article, "Draft").await;
    let autosave = AutosaveCoordinator::new(store.clone(), id.clone(), DELAY);

    autosave.notify_change(markdown_patch("a"));
    sleep(ms(5)).await;
    autosave.notify_change(markdown_patch("ab"));
    sleep(ms(5)).await;
    autosave.notify_change(markdown_patch("abc"));
    assert!(autosave.is_pending());

    sleep(ms(100)).await;

    let updates = store.updates();
    assert_eq!(updates.len(), 1);
    // Timed from the last edit (t=10), not the first.
    assert!(updates[0].0 >= ms(40) && updates[0].0 < ms(41), "{updates:?}");
    assert_eq!(store.markdown(&id).await, "abc");
    assert!(!autosave.is_pending());
}

#[tokio::test(start_paused = true)]
async fn test_no_persist_while_typing_continues() {
    let store = Arc::new(RecordingStore::new(Duration::ZERO));
    let id = store.seed(DocumentKind::Article, "Draft").await;
    let autosave = AutosaveCoordinator::new(store.clone(), id, DELAY);

    for i in 0..20 {
        autosave.notify_change(markdown_patch(&"x".repeat(i)));
        sleep(ms(20)).await;
    }
    assert!(store.updates().is_empty());

    sleep(ms(30)).await;
    assert_eq!(store.updates().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_persists_do_not_overlap() {
    let store = Arc::new(RecordingStore::new(ms(50)));
    let id = store.seed(DocumentKind::Article, "Draft").await;
    let autosave = AutosaveCoordinator::new(store.clone(), id.clone(), DELAY);

    autosave.notify_change(markdown_patch("first"));
    // First persist runs from t=30 to t=80.
    sleep(ms(35)).await;
    autosave.notify_change(markdown_patch("second"));
    // Second timer fires at t=65 and must wait for the first persist.
    sleep(ms(200)).await;

    let updates = store.updates();
    assert_eq!(updates.len(), 2, "{updates:?}");
    assert!(updates[1].0 >= updates[0].1, "{updates:?}");
    assert_eq!(store.markdown(&id).await, "second");
}

#[tokio::test(start_paused = true)]
async fn test_background_failure_does_not_stop_later_saves() {
    let store = Arc::new(RecordingStore::new(Duration::ZERO));
    let id = store.seed(DocumentKind::Article, "Draft").await;
    let autosave = AutosaveCoordinator::new(store.clone(), id.clone(), DELAY);
    store.fail_next(1);

    autosave.notify_change(markdown_patch("lost?"));
    sleep(ms(50)).await;
    assert_eq!(store.updates().len(), 1);
    assert_eq!(store.markdown(&id).await, "");

    autosave.notify_change(markdown_patch("kept"));
    sleep(ms(50)).await;
    assert_eq!(store.updates().len(), 2);
    assert_eq!(store.markdown(&id).await, "kept");
}

#[tokio::test(start_paused = true)]
async fn test_save_now_bypasses_and_cancels_timer() {
    let store = Arc::new(RecordingStore::new(Duration::ZERO));
    let id = store.seed(DocumentKind::Article, "Draft").await;
    let autosave = AutosaveCoordinator::new(store.clone(), id.clone(), DELAY);

    autosave.notify_change(markdown_patch("typed"));
    sleep(ms(5)).await;
    let record = autosave.save_now(markdown_patch("explicit")).await.unwrap();
    assert_eq!(record.markdown_source, "explicit");
    assert_eq!(store.updates()[0].0, ms(5));

    sleep(ms(100)).await;
    assert_eq!(store.updates().len(), 1);
    assert_eq!(store.markdown(&id).await, "explicit");
}

#[tokio::test(start_paused = true)]
async fn test_save_now_failure_is_returned() {
    let store = Arc::new(RecordingStore::new(Duration::ZERO));
    let id = store.seed(DocumentKind::Article, "Draft").await;
    let autosave = AutosaveCoordinator::new(store.clone(), id, DELAY);
    store.fail_next(1);

    assert!(autosave.save_now(markdown_patch("x")).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_close_cancels_pending_timer() {
    let store = Arc::new(RecordingStore::new(Duration::ZERO));
    let id = store.seed(DocumentKind::Article, "Draft").await;
    let autosave = AutosaveCoordinator::new(store.clone(), id, DELAY);

    autosave.notify_change(markdown_patch("unsaved"));
    sleep(ms(5)).await;
    autosave.close();
    sleep(ms(100)).await;

    assert!(store.updates().is_empty());
    assert!(autosave.is_closed());

    // Changes after close are ignored.
    autosave.notify_change(markdown_patch("ignored"));
    sleep(ms(100)).await;
    assert!(store.updates().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_persist_completes_after_close() {
    let store = Arc::new(RecordingStore::new(ms(50)));
    let id = store.seed(DocumentKind::Article, "Draft").await;
    let autosave = AutosaveCoordinator::new(store.clone(), id.clone(), DELAY);

    autosave.notify_change(markdown_patch("in flight"));
    sleep(ms(40)).await;
    drop(autosave);
    sleep(ms(100)).await;

    assert_eq!(store.updates().len(), 1);
    assert_eq!(store.markdown(&id).await, "in flight");
}
