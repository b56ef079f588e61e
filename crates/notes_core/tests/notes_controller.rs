use async_trait::async_trait;
use notes_core::{
    Draft, MirrorDocument, MirrorError, Navigation, Note, NoteId, NoteStore, NotesController,
    RemoteMirror, SqliteNoteStore, StoreError, StoreResult,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// SQLite store with switchable read/write failures.
#[derive(Clone)]
struct FlakyStore {
    inner: SqliteNoteStore,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyStore {
    async fn new() -> Self {
        Self {
            inner: SqliteNoteStore::open_in_memory().await.unwrap(),
            fail_reads: Arc::new(AtomicBool::new(false)),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    fn check(flag: &AtomicBool) -> StoreResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::StorageUnavailable("disk gone".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl NoteStore for FlakyStore {
    async fn get_all_notes(&self) -> StoreResult<Vec<Note>> {
        Self::check(&self.fail_reads)?;
        self.inner.get_all_notes().await
    }

    async fn get_note(&self, id: NoteId) -> StoreResult<Option<Note>> {
        Self::check(&self.fail_reads)?;
        self.inner.get_note(id).await
    }

    async fn insert(&self, note: &Note) -> StoreResult<Note> {
        Self::check(&self.fail_writes)?;
        self.inner.insert(note).await
    }

    async fn update(&self, note: &Note) -> StoreResult<()> {
        Self::check(&self.fail_writes)?;
        self.inner.update(note).await
    }

    async fn delete(&self, note: &Note) -> StoreResult<()> {
        Self::check(&self.fail_writes)?;
        self.inner.delete(note).await
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Recorded {
    Upsert(MirrorDocument),
    Remove(NoteId),
}

struct RecordingMirror {
    tx: UnboundedSender<Recorded>,
}

#[async_trait]
impl RemoteMirror for RecordingMirror {
    fn mirror_id(&self) -> &str {
        "recording"
    }

    async fn upsert(&self, document: MirrorDocument) -> Result<(), MirrorError> {
        let _ = self.tx.send(Recorded::Upsert(document));
        Ok(())
    }

    async fn remove(&self, id: NoteId) -> Result<(), MirrorError> {
        let _ = self.tx.send(Recorded::Remove(id));
        Ok(())
    }
}

struct FailingMirror;

#[async_trait]
impl RemoteMirror for FailingMirror {
    fn mirror_id(&self) -> &str {
        "failing"
    }

    async fn upsert(&self, _document: MirrorDocument) -> Result<(), MirrorError> {
        Err(MirrorError::new("remote rejected write"))
    }

    async fn remove(&self, _id: NoteId) -> Result<(), MirrorError> {
        Err(MirrorError::new("remote rejected delete"))
    }
}

fn recording_mirror() -> (Arc<dyn RemoteMirror>, UnboundedReceiver<Recorded>) {
    let (tx, rx) = unbounded_channel();
    (Arc::new(RecordingMirror { tx }), rx)
}

async fn next_recorded(rx: &mut UnboundedReceiver<Recorded>) -> Recorded {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn init_loads_existing_notes() {
    let store = FlakyStore::new().await;
    store
        .inner
        .insert(&Note::with_timestamp("seed", "", 1))
        .await
        .unwrap();

    let controller = NotesController::init(store, None).await;

    assert_eq!(controller.notes().len(), 1);
    assert_eq!(controller.notes()[0].title, "seed");
    assert!(controller.last_error().is_none());
}

#[tokio::test]
async fn init_failure_leaves_empty_snapshot_with_error() {
    let store = FlakyStore::new().await;
    store.fail_reads.store(true, Ordering::SeqCst);

    let controller = NotesController::init(store, None).await;

    assert!(controller.notes().is_empty());
    assert!(controller.last_error().unwrap().contains("disk gone"));
}

#[tokio::test]
async fn save_without_selection_inserts_one_note_and_shows_list() {
    let store = FlakyStore::new().await;
    let mut controller = NotesController::init(store.clone(), None).await;

    assert_eq!(controller.begin_create(), Navigation::ShowEdit(None));
    let nav = controller.save("A", "B").await.unwrap();

    assert_eq!(nav, Navigation::ShowList);
    assert_eq!(controller.notes().len(), 1);
    assert_eq!(store.get_all_notes().await.unwrap().len(), 1);
    let note = &controller.notes()[0];
    assert_eq!((note.title.as_str(), note.text.as_str()), ("A", "B"));
    assert!(note.timestamp > 0);
    assert!(controller.selected().is_none());
}

#[tokio::test]
async fn save_with_selection_updates_in_place_and_keeps_timestamp() {
    let store = FlakyStore::new().await;
    store
        .inner
        .insert(&Note::with_timestamp("old", "body", 42))
        .await
        .unwrap();
    store
        .inner
        .insert(&Note::with_timestamp("other", "x", 43))
        .await
        .unwrap();
    let mut controller = NotesController::init(store.clone(), None).await;

    let target = controller.notes()[0].clone();
    assert_eq!(
        controller.begin_edit(target.clone()),
        Navigation::ShowEdit(Some(target.clone()))
    );
    assert_eq!(controller.edit_fields().title, "old");

    let nav = controller.save("new", "body2").await.unwrap();

    assert_eq!(nav, Navigation::ShowList);
    assert_eq!(controller.notes().len(), 2);
    let updated = store.get_note(target.id).await.unwrap().unwrap();
    assert_eq!(updated.title, "new");
    assert_eq!(updated.text, "body2");
    assert_eq!(updated.timestamp, 42);
    assert_eq!(controller.notes()[1].title, "other");
}

#[tokio::test]
async fn failed_save_keeps_edit_session_and_draft() {
    let store = FlakyStore::new().await;
    let mut controller = NotesController::init(store.clone(), None).await;
    controller.begin_create();
    store.fail_writes.store(true, Ordering::SeqCst);

    let err = controller.save("unsaved", "input").await.unwrap_err();

    assert!(matches!(err, StoreError::StorageUnavailable(_)));
    assert!(controller.notes().is_empty());
    assert!(controller.selected().is_none());
    assert_eq!(
        controller.draft(),
        Some(&Draft {
            title: "unsaved".to_string(),
            text: "input".to_string(),
        })
    );
    assert_eq!(controller.edit_fields().title, "unsaved");
    assert!(controller.last_error().is_some());

    store.fail_writes.store(false, Ordering::SeqCst);
    assert_eq!(
        controller.save("unsaved", "input").await.unwrap(),
        Navigation::ShowList
    );
    assert!(controller.draft().is_none());
    assert!(controller.last_error().is_none());
    assert_eq!(controller.notes().len(), 1);
}

#[tokio::test]
async fn failed_refresh_after_insert_retries_as_update() {
    let store = FlakyStore::new().await;
    let mut controller = NotesController::init(store.clone(), None).await;
    controller.begin_create();
    store.fail_reads.store(true, Ordering::SeqCst);

    controller.save("once", "only").await.unwrap_err();

    assert!(controller.notes().is_empty());
    assert!(controller.selected().is_none());
    assert_eq!(controller.edit_fields().title, "once");
    let landed = store.inner.get_all_notes().await.unwrap();
    assert_eq!(landed.len(), 1);

    store.fail_reads.store(false, Ordering::SeqCst);
    controller.save("once", "again").await.unwrap();
    assert_eq!(controller.notes().len(), 1);
    assert_eq!(controller.notes()[0].id, landed[0].id);
    assert_eq!(controller.notes()[0].text, "again");
    assert_eq!(controller.notes()[0].timestamp, landed[0].timestamp);
}

#[tokio::test]
async fn failed_refresh_after_update_keeps_selection() {
    let store = FlakyStore::new().await;
    store
        .inner
        .insert(&Note::with_timestamp("before", "", 9))
        .await
        .unwrap();
    let mut controller = NotesController::init(store.clone(), None).await;
    let target = controller.notes()[0].clone();
    controller.begin_edit(target.clone());
    store.fail_reads.store(true, Ordering::SeqCst);

    controller.save("after", "").await.unwrap_err();

    assert_eq!(controller.selected(), Some(&target));
    assert_eq!(controller.notes(), &[target.clone()]);
}

#[tokio::test]
async fn go_back_after_failed_refresh_starts_fresh_insert() {
    let store = FlakyStore::new().await;
    let mut controller = NotesController::init(store.clone(), None).await;
    controller.begin_create();
    store.fail_reads.store(true, Ordering::SeqCst);
    controller.save("first", "").await.unwrap_err();
    store.fail_reads.store(false, Ordering::SeqCst);

    controller.go_back();
    controller.begin_create();
    controller.save("second", "").await.unwrap();

    let titles: Vec<_> = controller.notes().iter().map(|note| note.title.clone()).collect();
    assert_eq!(titles, vec!["first".to_string(), "second".to_string()]);
}

#[tokio::test]
async fn failed_load_keeps_previous_snapshot() {
    let store = FlakyStore::new().await;
    store
        .inner
        .insert(&Note::with_timestamp("kept", "", 1))
        .await
        .unwrap();
    let mut controller = NotesController::init(store.clone(), None).await;
    let before = controller.notes().to_vec();

    store.fail_reads.store(true, Ordering::SeqCst);
    controller.load_all().await.unwrap_err();

    assert_eq!(controller.notes(), before.as_slice());
    assert!(controller.last_error().is_some());
}

#[tokio::test]
async fn successful_reload_clears_previous_error() {
    let store = FlakyStore::new().await;
    store.fail_reads.store(true, Ordering::SeqCst);
    let mut controller = NotesController::init(store.clone(), None).await;
    assert!(controller.last_error().is_some());

    store.fail_reads.store(false, Ordering::SeqCst);
    controller.load_all().await.unwrap();

    assert!(controller.last_error().is_none());
}

#[tokio::test]
async fn successful_delete_clears_previous_error() {
    let store = FlakyStore::new().await;
    let mut controller = NotesController::init(store.clone(), None).await;
    controller.begin_create();
    controller.save("real", "").await.unwrap();
    let real = controller.notes()[0].clone();

    let ghost = Note {
        id: 999,
        ..Note::with_timestamp("ghost", "", 1)
    };
    assert_eq!(
        controller.delete(&ghost).await.unwrap_err(),
        StoreError::NotFound(999)
    );
    assert!(controller.last_error().is_some());

    controller.delete(&real).await.unwrap();

    assert!(controller.last_error().is_none());
    assert!(controller.notes().is_empty());
}

#[tokio::test]
async fn load_all_twice_yields_identical_snapshots() {
    let store = FlakyStore::new().await;
    store
        .inner
        .insert(&Note::with_timestamp("a", "b", 1))
        .await
        .unwrap();
    let mut controller = NotesController::new(store, None);

    controller.load_all().await.unwrap();
    let first = controller.notes().to_vec();
    controller.load_all().await.unwrap();

    assert_eq!(controller.notes(), first.as_slice());
}

#[tokio::test]
async fn go_back_discards_input_without_writing() {
    let store = FlakyStore::new().await;
    let mut controller = NotesController::init(store.clone(), None).await;
    controller.begin_create();
    store.fail_writes.store(true, Ordering::SeqCst);
    controller.save("lost", "draft").await.unwrap_err();
    store.fail_writes.store(false, Ordering::SeqCst);

    assert_eq!(controller.go_back(), Navigation::Back);

    assert!(controller.draft().is_none());
    assert!(controller.selected().is_none());
    assert!(controller.last_error().is_none());
    assert!(store.get_all_notes().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_removes_note_and_clears_matching_selection() {
    let store = FlakyStore::new().await;
    let mut controller = NotesController::init(store.clone(), None).await;
    controller.begin_create();
    controller.save("doomed", "").await.unwrap();
    let note = controller.notes()[0].clone();
    controller.begin_edit(note.clone());

    controller.delete(&note).await.unwrap();

    assert!(controller.notes().is_empty());
    assert!(controller.selected().is_none());
    assert_eq!(
        controller.delete(&note).await.unwrap_err(),
        StoreError::NotFound(note.id)
    );
}

#[tokio::test]
async fn mirror_receives_documents_with_local_identity() {
    let store = FlakyStore::new().await;
    let (mirror, mut rx) = recording_mirror();
    let mut controller = NotesController::init(store, Some(mirror)).await;

    controller.begin_create();
    controller.save("remote", "copy").await.unwrap();
    let created = controller.notes()[0].clone();
    assert_eq!(
        next_recorded(&mut rx).await,
        Recorded::Upsert(MirrorDocument::from(&created))
    );

    controller.begin_edit(created.clone());
    controller.save("remote2", "copy").await.unwrap();
    match next_recorded(&mut rx).await {
        Recorded::Upsert(document) => {
            assert_eq!(document.id, created.id);
            assert_eq!(document.title, "remote2");
            assert_eq!(document.timestamp, created.timestamp);
        }
        other => panic!("unexpected mirror call: {other:?}"),
    }

    let current = controller.notes()[0].clone();
    controller.delete(&current).await.unwrap();
    assert_eq!(next_recorded(&mut rx).await, Recorded::Remove(created.id));
}

#[tokio::test]
async fn mirror_is_not_called_when_local_write_fails() {
    let store = FlakyStore::new().await;
    let (mirror, mut rx) = recording_mirror();
    let mut controller = NotesController::init(store.clone(), Some(mirror)).await;
    controller.begin_create();
    store.fail_writes.store(true, Ordering::SeqCst);

    controller.save("nope", "").await.unwrap_err();

    drop(controller);
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn mirror_failure_does_not_affect_local_save() {
    let store = FlakyStore::new().await;
    let mut controller = NotesController::init(store.clone(), Some(Arc::new(FailingMirror))).await;
    controller.begin_create();

    let nav = controller.save("local", "wins").await.unwrap();

    assert_eq!(nav, Navigation::ShowList);
    assert!(controller.last_error().is_none());
    assert_eq!(store.get_all_notes().await.unwrap().len(), 1);
}

#[test]
fn mirror_document_serializes_with_local_identity_fields() {
    let document = MirrorDocument {
        id: 7,
        title: "t".to_string(),
        text: "x".to_string(),
        timestamp: 1_000,
    };
    let value = serde_json::to_value(&document).unwrap();
    assert_eq!(
        value,
        serde_json::json!({ "id": 7, "title": "t", "text": "x", "timestamp": 1_000 })
    );
}
