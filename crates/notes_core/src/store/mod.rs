//! Asynchronous note store.
//!
//! # Responsibility
//! - Expose note CRUD as futures so callers on the UI task never block.
//! - Map persistence failures into the store error taxonomy.
//!
//! # Invariants
//! - Failures are returned as `Err`, never replaced with default values.
//! - `update`/`delete` of an absent id return `StoreError::NotFound`.

use crate::model::note::{Note, NoteId, NoteValidationError};
use crate::repo::note_repo::RepoError;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sqlite_store;

pub use sqlite_store::SqliteNoteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error surfaced to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Storage medium cannot be opened, read or written.
    StorageUnavailable(String),
    /// Update/delete target does not exist.
    NotFound(NoteId),
    /// Note rejected by write-time validation.
    Validation(NoteValidationError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageUnavailable(details) => write!(f, "storage unavailable: {details}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Validation(err) => write!(f, "invalid note: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::StorageUnavailable(other.to_string()),
        }
    }
}

/// Async data-access contract consumed by the controller.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Returns every persisted note ordered by id.
    async fn get_all_notes(&self) -> StoreResult<Vec<Note>>;
    async fn get_note(&self, id: NoteId) -> StoreResult<Option<Note>>;
    /// Persists a new note under a fresh id and returns the stored record.
    async fn insert(&self, note: &Note) -> StoreResult<Note>;
    /// Persists new `title`/`text` for `note.id`. The stored timestamp is kept.
    async fn update(&self, note: &Note) -> StoreResult<()>;
    async fn delete(&self, note: &Note) -> StoreResult<()>;
}
