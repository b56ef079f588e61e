//! Application state controller for the list/edit flow.
//!
//! # Responsibility
//! - Hold the in-memory note snapshot and the selected note.
//! - Run write-then-refresh cycles against a [`NoteStore`].
//! - Hand navigation intents back to the presentation layer.
//!
//! # Invariants
//! - `notes` is only replaced by a successful `get_all_notes()` result.
//! - `save` returns `Navigation::ShowList` only after write and refresh both
//!   completed; on failure the edit session stays open with a `Draft`.
//! - Editing keeps the note's creation `timestamp`.
//! - Mirror notifications never influence the local result.

use crate::model::note::{Draft, Note};
use crate::store::{NoteStore, StoreError, StoreResult};
use crate::sync::mirror::{dispatch, MirrorDocument, MirrorEvent, RemoteMirror};
use log::{info, warn};
use std::sync::Arc;

/// Navigation intent for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Show the note list.
    ShowList,
    /// Show the edit view; `None` means a new note.
    ShowEdit(Option<Note>),
    /// Return to the previous view without persisting.
    Back,
}

/// Controller mediating between the presentation layer and the note store.
pub struct NotesController<S: NoteStore> {
    store: S,
    mirror: Option<Arc<dyn RemoteMirror>>,
    notes: Vec<Note>,
    selected: Option<Note>,
    /// Note whose write landed in a `save` whose refresh then failed.
    pending: Option<Note>,
    draft: Option<Draft>,
    last_error: Option<String>,
}

impl<S: NoteStore> NotesController<S> {
    /// Creates a controller with an empty snapshot. Call `load_all` next, or
    /// use [`NotesController::init`].
    pub fn new(store: S, mirror: Option<Arc<dyn RemoteMirror>>) -> Self {
        Self {
            store,
            mirror,
            notes: Vec::new(),
            selected: None,
            pending: None,
            draft: None,
            last_error: None,
        }
    }

    /// Creates a controller and performs the initial `load_all`.
    ///
    /// A failed initial load leaves an empty snapshot and sets `last_error`.
    pub async fn init(store: S, mirror: Option<Arc<dyn RemoteMirror>>) -> Self {
        let mut controller = Self::new(store, mirror);
        controller.load_all().await.ok();
        controller
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn selected(&self) -> Option<&Note> {
        self.selected.as_ref()
    }

    /// Unsaved input left behind by the last failed save.
    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    /// Error indicator for the presentation layer.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Field values the edit view should display.
    ///
    /// Prefers the preserved draft, then the selected note, then blanks.
    pub fn edit_fields(&self) -> Draft {
        if let Some(draft) = &self.draft {
            return draft.clone();
        }
        match &self.selected {
            Some(note) => Draft {
                title: note.title.clone(),
                text: note.text.clone(),
            },
            None => Draft::default(),
        }
    }

    /// Replaces the snapshot with the store's current notes.
    ///
    /// On failure the previous snapshot is kept.
    pub async fn load_all(&mut self) -> StoreResult<()> {
        match self.store.get_all_notes().await {
            Ok(notes) => {
                info!(
                    "event=notes_load module=controller status=ok count={}",
                    notes.len()
                );
                self.notes = notes;
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                warn!("event=notes_load module=controller status=error error={err}");
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Starts a new-note edit session.
    pub fn begin_create(&mut self) -> Navigation {
        self.selected = None;
        self.clear_edit_state();
        Navigation::ShowEdit(None)
    }

    /// Starts editing `note`.
    pub fn begin_edit(&mut self, note: Note) -> Navigation {
        self.selected = Some(note.clone());
        self.clear_edit_state();
        Navigation::ShowEdit(Some(note))
    }

    /// Persists the edit session and refreshes the snapshot.
    ///
    /// Inserts when no note is selected, otherwise updates the selected
    /// note's `title`/`text`. If the write lands but the refresh fails, the
    /// selection is left alone and the persisted note is remembered, so a
    /// retry updates it instead of inserting a duplicate.
    pub async fn save(
        &mut self,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> StoreResult<Navigation> {
        let title = title.into();
        let text = text.into();

        let target = self.pending.as_ref().or(self.selected.as_ref());
        let mode = if target.is_some() { "update" } else { "insert" };
        let written = match target {
            None => {
                let note = Note::new(title.clone(), text.clone());
                self.store.insert(&note).await
            }
            Some(existing) => {
                let note = Note {
                    id: existing.id,
                    title: title.clone(),
                    text: text.clone(),
                    timestamp: existing.timestamp,
                };
                self.store.update(&note).await.map(|()| note)
            }
        };

        let saved = match written {
            Ok(note) => note,
            Err(err) => return Err(self.fail_save(title, text, err)),
        };
        self.notify_mirror(MirrorEvent::Upsert(MirrorDocument::from(&saved)));

        match self.store.get_all_notes().await {
            Ok(notes) => {
                info!(
                    "event=note_save module=controller status=ok mode={mode} id={} count={}",
                    saved.id,
                    notes.len()
                );
                self.notes = notes;
                self.selected = None;
                self.clear_edit_state();
                Ok(Navigation::ShowList)
            }
            Err(err) => {
                self.pending = Some(saved);
                Err(self.fail_save(title, text, err))
            }
        }
    }

    /// Leaves the edit view and discards unsaved input.
    pub fn go_back(&mut self) -> Navigation {
        self.selected = None;
        self.clear_edit_state();
        Navigation::Back
    }

    /// Deletes `note` and refreshes the snapshot.
    pub async fn delete(&mut self, note: &Note) -> StoreResult<()> {
        if let Err(err) = self.store.delete(note).await {
            warn!(
                "event=note_delete module=controller status=error id={} error={err}",
                note.id
            );
            self.last_error = Some(err.to_string());
            return Err(err);
        }

        if self.selected.as_ref().map(|selected| selected.id) == Some(note.id) {
            self.selected = None;
        }
        if self.pending.as_ref().map(|pending| pending.id) == Some(note.id) {
            self.pending = None;
        }
        self.notify_mirror(MirrorEvent::Remove(note.id));
        info!("event=note_delete module=controller status=ok id={}", note.id);

        self.load_all().await
    }

    fn fail_save(&mut self, title: String, text: String, err: StoreError) -> StoreError {
        warn!("event=note_save module=controller status=error error={err}");
        self.draft = Some(Draft { title, text });
        self.last_error = Some(err.to_string());
        err
    }

    fn clear_edit_state(&mut self) {
        self.pending = None;
        self.draft = None;
        self.last_error = None;
    }

    fn notify_mirror(&self, event: MirrorEvent) {
        if let Some(mirror) = &self.mirror {
            drop(dispatch(Arc::clone(mirror), event));
        }
    }
}
