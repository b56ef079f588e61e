//! Core persistence and state logic for the notes app.
//! This crate is the single source of truth for note invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod sync;

pub use config::NotesConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{now_epoch_ms, Draft, Note, NoteId, NoteValidationError};
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult, SqliteNoteRepository};
pub use service::notes_controller::{Navigation, NotesController};
pub use store::{NoteStore, SqliteNoteStore, StoreError, StoreResult};
pub use sync::mirror::{MirrorDocument, MirrorError, MirrorEvent, RemoteMirror};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
