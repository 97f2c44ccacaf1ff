use super::*;
use crate::store::Watcher;

/// Watcher that records every event it receives
#[derive(Default)]
struct RecordingWatcher {
    events: Mutex<Vec<WatchEvent>>,
}

impl RecordingWatcher {
    fn events(&self) -> Vec<WatchEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Watcher for RecordingWatcher {
    fn process(&self, event: WatchEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn path(p: &str) -> NodePath {
    NodePath::parse(p).unwrap()
}

#[tokio::test]
async fn create_if_absent_reports_created_once() {
    let store = MemoryStore::new();
    let barrier = path("/round1");

    let first = store.create(&barrier, CreateMode::Persistent).await.unwrap();
    let second = store.create(&barrier, CreateMode::Persistent).await.unwrap();

    assert_eq!(first, CreateOutcome::Created(barrier.clone()));
    assert_eq!(second, CreateOutcome::AlreadyExists);
    assert_eq!(store.snapshot(), vec![barrier]);
}

#[tokio::test]
async fn concurrent_sessions_see_one_creator() {
    let store = MemoryStore::new();
    let other = store.connect();
    let barrier = path("/round1");

    let a = store.create(&barrier, CreateMode::Persistent).await.unwrap();
    let b = other.create(&barrier, CreateMode::Persistent).await.unwrap();

    assert!(a.is_created());
    assert!(!b.is_created());
    assert_eq!(
        store.node_info(&barrier),
        Some((CreateMode::Persistent, store.session_id()))
    );
}

#[tokio::test]
async fn create_without_parent_fails() {
    let store = MemoryStore::new();
    let err = store
        .create(&path("/missing/child"), CreateMode::Ephemeral)
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::NoNode(path("/missing")));
}

#[tokio::test]
async fn delete_if_empty_outcomes() {
    let store = MemoryStore::new();
    store.create(&path("/r"), CreateMode::Persistent).await.unwrap();
    store.create(&path("/r/a"), CreateMode::Ephemeral).await.unwrap();

    assert_eq!(
        store.delete_if_empty(&path("/r")).await.unwrap(),
        DeleteOutcome::NotEmpty
    );
    assert_eq!(
        store.delete_if_empty(&path("/r/a")).await.unwrap(),
        DeleteOutcome::Deleted
    );
    assert_eq!(
        store.delete_if_empty(&path("/r/a")).await.unwrap(),
        DeleteOutcome::NotFound
    );
    assert_eq!(store.snapshot(), vec![path("/r")]);
}

#[tokio::test]
async fn root_cannot_be_deleted() {
    let store = MemoryStore::new();
    let err = store.delete_if_empty(&NodePath::root()).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidPath(_)));
}

#[tokio::test]
async fn get_children_lists_sorted_names() {
    let store = MemoryStore::new();
    store.create(&path("/r"), CreateMode::Persistent).await.unwrap();
    for name in ["c", "a", "b"] {
        store
            .create(&path(&format!("/r/{name}")), CreateMode::Ephemeral)
            .await
            .unwrap();
    }

    let children = store.get_children(&path("/r"), None).await.unwrap();
    assert_eq!(children, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn get_children_of_missing_node_fails() {
    let store = MemoryStore::new();
    let err = store.get_children(&path("/nope"), None).await.unwrap_err();
    assert_eq!(err, StoreError::NoNode(path("/nope")));
}

#[tokio::test]
async fn children_watch_fires_once() {
    let store = MemoryStore::new();
    let watcher = Arc::new(RecordingWatcher::default());
    store.create(&path("/r"), CreateMode::Persistent).await.unwrap();

    store
        .get_children(&path("/r"), Some(watcher.clone()))
        .await
        .unwrap();
    store.create(&path("/r/a"), CreateMode::Ephemeral).await.unwrap();
    store.create(&path("/r/b"), CreateMode::Ephemeral).await.unwrap();

    assert_eq!(
        watcher.events(),
        vec![WatchEvent {
            kind: WatchEventKind::ChildrenChanged,
            path: path("/r"),
        }]
    );
}

#[tokio::test]
async fn same_watcher_registered_twice_is_notified_once() {
    let store = MemoryStore::new();
    let watcher = Arc::new(RecordingWatcher::default());
    store.create(&path("/r"), CreateMode::Persistent).await.unwrap();

    for _ in 0..3 {
        store
            .get_children(&path("/r"), Some(watcher.clone()))
            .await
            .unwrap();
    }
    store.create(&path("/r/a"), CreateMode::Ephemeral).await.unwrap();

    assert_eq!(watcher.events().len(), 1);
}

#[tokio::test]
async fn exists_watch_fires_on_creation_of_absent_node() {
    let store = MemoryStore::new();
    let other = store.connect();
    let watcher = Arc::new(RecordingWatcher::default());
    store.create(&path("/r"), CreateMode::Persistent).await.unwrap();

    let present = store
        .exists(&path("/r/AllClear"), Some(watcher.clone()))
        .await
        .unwrap();
    assert!(!present);

    other
        .create(&path("/r/AllClear"), CreateMode::Ephemeral)
        .await
        .unwrap();

    assert_eq!(
        watcher.events(),
        vec![WatchEvent {
            kind: WatchEventKind::NodeCreated,
            path: path("/r/AllClear"),
        }]
    );
}

#[tokio::test]
async fn closing_session_removes_its_ephemeral_nodes() {
    let store = MemoryStore::new();
    let member = store.connect();
    let watcher = Arc::new(RecordingWatcher::default());

    store.create(&path("/r"), CreateMode::Persistent).await.unwrap();
    member.create(&path("/r/m"), CreateMode::Ephemeral).await.unwrap();
    store
        .get_children(&path("/r"), Some(watcher.clone()))
        .await
        .unwrap();

    member.close();

    assert!(member.is_closed());
    assert_eq!(store.snapshot(), vec![path("/r")]);
    assert_eq!(watcher.events().len(), 1);
    assert_eq!(watcher.events()[0].kind, WatchEventKind::ChildrenChanged);

    let err = member
        .create(&path("/r/m"), CreateMode::Ephemeral)
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::SessionExpired);
}

#[tokio::test]
async fn closing_session_keeps_persistent_nodes() {
    let store = MemoryStore::new();
    let member = store.connect();
    member.create(&path("/r"), CreateMode::Persistent).await.unwrap();

    member.close();

    assert_eq!(store.snapshot(), vec![path("/r")]);
}

#[tokio::test]
async fn sibling_names_sharing_a_prefix_survive_subtree_removal() {
    let store = MemoryStore::new();
    let member = store.connect();
    store.create(&path("/r"), CreateMode::Persistent).await.unwrap();
    store.create(&path("/r-x"), CreateMode::Persistent).await.unwrap();
    member.create(&path("/r/m"), CreateMode::Ephemeral).await.unwrap();
    store.create(&path("/r/m/nested"), CreateMode::Persistent).await.unwrap();

    member.close();

    assert_eq!(store.snapshot(), vec![path("/r"), path("/r-x")]);
}

#[tokio::test]
async fn injected_fault_fails_only_the_next_call() {
    let store = MemoryStore::new();
    store.fail_next(StoreError::ConnectionLoss);

    let err = store
        .create(&path("/r"), CreateMode::Persistent)
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::ConnectionLoss);

    let ok = store.create(&path("/r"), CreateMode::Persistent).await.unwrap();
    assert!(ok.is_created());
}

#[tokio::test]
async fn injected_fault_is_scoped_to_its_session() {
    let store = MemoryStore::new();
    let other = store.connect();
    store.fail_next(StoreError::ConnectionLoss);

    assert!(other.exists(&path("/r"), None).await.is_ok());
    assert!(store.exists(&path("/r"), None).await.is_err());
}

#[tokio::test]
async fn suppressed_watches_are_consumed_without_delivery() {
    let store = MemoryStore::new();
    let watcher = Arc::new(RecordingWatcher::default());
    store.create(&path("/r"), CreateMode::Persistent).await.unwrap();
    store
        .get_children(&path("/r"), Some(watcher.clone()))
        .await
        .unwrap();

    store.suppress_watches(true);
    store.create(&path("/r/a"), CreateMode::Ephemeral).await.unwrap();
    store.suppress_watches(false);
    store.create(&path("/r/b"), CreateMode::Ephemeral).await.unwrap();

    // The registration was used up by the suppressed event
    assert!(watcher.events().is_empty());
}

#[tokio::test]
async fn calls_are_recorded_per_session() {
    let store = MemoryStore::new();
    let other = store.connect();

    store.create(&path("/r"), CreateMode::Persistent).await.unwrap();
    other.exists(&path("/r"), None).await.unwrap();

    assert_eq!(
        store.calls(),
        vec![StoreCall::Create {
            path: path("/r"),
            mode: CreateMode::Persistent,
        }]
    );
    assert_eq!(
        other.calls(),
        vec![StoreCall::Exists {
            path: path("/r"),
            watch: false,
        }]
    );
    assert_eq!(store.all_calls().len(), 2);
}

#[tokio::test]
async fn disabled_call_log_stays_empty() {
    let store = MemoryStore::new();
    store.create(&path("/r"), CreateMode::Persistent).await.unwrap();
    store.record_calls(false);
    assert!(store.all_calls().is_empty());

    let other = store.connect();
    for _ in 0..100 {
        other.get_children(&path("/r"), None).await.unwrap();
        other.exists(&path("/r/x"), None).await.unwrap();
    }
    assert!(store.all_calls().is_empty());
    assert!(other.calls().is_empty());

    store.record_calls(true);
    other.exists(&path("/r"), None).await.unwrap();
    assert_eq!(other.calls().len(), 1);
}
