//! Error handling and edge case tests.

use squawker::contract::{messages_uri, ASSER_KEY};
use squawker::{
    AlertSlot, InboundPayload, IngestOutcome, Ingestor, NewSquawk, ObserverConfig, SortOrder,
    SquawkError, SquawkId, SquawkStore, SquawkUpdate, StoreConfig, Timestamp,
};
use std::sync::Arc;
use tempfile::TempDir;

fn test_store(dir: &TempDir) -> SquawkStore {
    SquawkStore::open(StoreConfig::at(dir.path().join("squawker.db"))).unwrap()
}

fn squawk(message: &str) -> NewSquawk {
    NewSquawk::new("Asser", ASSER_KEY, message, Timestamp(1))
}

// --- Zero-effect mutations ---

#[test]
fn test_update_missing_id_returns_zero_without_notification() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);
    let handle = store.observe(ObserverConfig::collection());

    let changed = store
        .update_by_id(SquawkId(404), &SquawkUpdate::default().with_message("x"))
        .unwrap();

    assert_eq!(changed, 0);
    assert!(handle.try_recv().is_err());
}

#[test]
fn test_delete_missing_id_returns_zero_without_notification() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);
    store.insert(squawk("keep me")).unwrap();
    let handle = store.observe(ObserverConfig::collection());

    assert_eq!(store.delete_by_id(SquawkId(404)).unwrap(), 0);
    assert!(handle.try_recv().is_err());
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_delete_twice() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);
    let id = store.insert(squawk("once")).unwrap();

    assert_eq!(store.delete_by_id(id).unwrap(), 1);
    assert_eq!(store.delete_by_id(id).unwrap(), 0);
    assert!(store.get(id).unwrap().is_none());
}

// --- Unsupported requests ---

#[test]
fn test_unknown_uri_is_unsupported() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);
    let uri = "content://com.alexbaryzhikov.squawker.provider/authors";

    assert!(matches!(
        store.insert_at(uri, squawk("x")),
        Err(SquawkError::UnsupportedRequest(u)) if u == uri
    ));
    assert!(matches!(
        store.query_at(uri, None, None),
        Err(SquawkError::UnsupportedRequest(_))
    ));
    assert!(matches!(
        store.content_type(uri),
        Err(SquawkError::UnsupportedRequest(_))
    ));
}

#[test]
fn test_wrong_route_for_operation_is_unsupported() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);
    let item = format!("{}/1", messages_uri());

    assert!(matches!(
        store.insert_at(&item, squawk("x")),
        Err(SquawkError::UnsupportedRequest(_))
    ));
    assert!(matches!(
        store.query_at(&item, None, None),
        Err(SquawkError::UnsupportedRequest(_))
    ));
    assert!(matches!(
        store.update_at(&messages_uri(), &SquawkUpdate::default().with_message("x")),
        Err(SquawkError::UnsupportedRequest(_))
    ));
    assert!(matches!(
        store.delete_at(&messages_uri()),
        Err(SquawkError::UnsupportedRequest(_))
    ));
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_bad_sort_order_is_validation_error() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    assert!(matches!(
        store.query_at(&messages_uri(), None, Some("date; DELETE FROM messages")),
        Err(SquawkError::Validation(_))
    ));
    assert_eq!(store.observer_count(), 0);
}

// --- Persistence failures ---

#[test]
fn test_insert_failure_names_target() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("squawker.db");
    let store = SquawkStore::open(StoreConfig::at(&path)).unwrap();

    let other = rusqlite::Connection::open(&path).unwrap();
    other.execute_batch("DROP TABLE messages;").unwrap();

    match store.insert(squawk("lost")) {
        Err(SquawkError::Persistence { target, .. }) => assert_eq!(target, messages_uri()),
        other => panic!("Expected persistence error, got {:?}", other),
    }
}

#[test]
fn test_alert_shown_when_persist_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("squawker.db");
    let store = Arc::new(SquawkStore::open(StoreConfig::at(&path)).unwrap());
    let slot = Arc::new(AlertSlot::new());
    let ingestor = Ingestor::new(Arc::clone(&store), slot.clone());

    let other = rusqlite::Connection::open(&path).unwrap();
    other.execute_batch("DROP TABLE messages;").unwrap();

    let payload: InboundPayload = [
        ("author", "Asser"),
        ("authorKey", ASSER_KEY),
        ("message", "still alerted"),
        ("date", "10"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    match ingestor.on_message_received(&payload).unwrap() {
        IngestOutcome::Delivered {
            stored,
            persist_error,
            alert,
        } => {
            assert!(stored.is_none());
            assert!(persist_error.is_some());
            assert_eq!(alert.body, "still alerted");
        }
        other => panic!("Expected delivery, got {:?}", other),
    }
    assert_eq!(slot.current().unwrap().body, "still alerted");
}

#[test]
fn test_failed_query_leaves_no_observer() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("squawker.db");
    let store = SquawkStore::open(StoreConfig::at(&path)).unwrap();

    let other = rusqlite::Connection::open(&path).unwrap();
    other.execute_batch("DROP TABLE messages;").unwrap();

    assert!(store.query(None, SortOrder::default()).is_err());
    assert_eq!(store.observer_count(), 0);
}
