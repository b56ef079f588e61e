//! Remote mirror contract.
//!
//! # Responsibility
//! - Define the document shape and operations a remote collection adapter
//!   implements to receive copies of local notes.
//! - Dispatch mirror calls without blocking or failing local persistence.
//!
//! # Invariants
//! - Documents always carry the locally assigned `id` and `timestamp`, so
//!   remote copies are keyed by local identity and edits overwrite them.
//! - Mirror failures are logged and dropped; they never reach the caller.

use crate::model::note::{Note, NoteId};
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Remote copy of one note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorDocument {
    pub id: NoteId,
    pub title: String,
    pub text: String,
    pub timestamp: i64,
}

impl From<&Note> for MirrorDocument {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id,
            title: note.title.clone(),
            text: note.text.clone(),
            timestamp: note.timestamp,
        }
    }
}

/// Failure reported by a mirror adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorError {
    pub message: String,
}

impl MirrorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for MirrorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "mirror failed: {}", self.message)
    }
}

impl Error for MirrorError {}

/// Adapter for a remote document collection.
#[async_trait]
pub trait RemoteMirror: Send + Sync {
    /// Stable adapter name used in logs.
    fn mirror_id(&self) -> &str;
    /// Creates or replaces the remote document keyed by `document.id`.
    async fn upsert(&self, document: MirrorDocument) -> Result<(), MirrorError>;
    /// Removes the remote document for `id`.
    async fn remove(&self, id: NoteId) -> Result<(), MirrorError>;
}

/// Mirror operation dispatched after a successful local write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorEvent {
    Upsert(MirrorDocument),
    Remove(NoteId),
}

impl MirrorEvent {
    fn label(&self) -> &'static str {
        match self {
            Self::Upsert(_) => "upsert",
            Self::Remove(_) => "remove",
        }
    }

    fn note_id(&self) -> NoteId {
        match self {
            Self::Upsert(document) => document.id,
            Self::Remove(id) => *id,
        }
    }
}

/// Fires `event` at `mirror` on a detached task.
///
/// The returned handle may be awaited by tests; production callers drop it.
pub fn dispatch(mirror: Arc<dyn RemoteMirror>, event: MirrorEvent) -> JoinHandle<()> {
    tokio::spawn(async move {
        let op = event.label();
        let id = event.note_id();
        let result = match event {
            MirrorEvent::Upsert(document) => mirror.upsert(document).await,
            MirrorEvent::Remove(id) => mirror.remove(id).await,
        };

        match result {
            Ok(()) => debug!(
                "event=mirror_op module=mirror status=ok mirror={} op={op} id={id}",
                mirror.mirror_id()
            ),
            Err(err) => warn!(
                "event=mirror_op module=mirror status=error mirror={} op={op} id={id} error={err}",
                mirror.mirror_id()
            ),
        }
    })
}
