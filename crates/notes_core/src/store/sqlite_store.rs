//! SQLite-backed implementation of [`NoteStore`].
//!
//! Every operation is shipped to tokio's blocking pool together with a
//! handle to the shared connection; the caller's task only awaits the result.
//! The schema is checked once at open, not per operation.

use super::{NoteStore, StoreError, StoreResult};
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::{NoteRepository, RepoError, RepoResult, SqliteNoteRepository};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// Note store owning one migrated SQLite connection.
///
/// Clones share the same connection. Open once at startup, pass it to the
/// controller, and call [`SqliteNoteStore::close`] at shutdown.
#[derive(Clone)]
pub struct SqliteNoteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteNoteStore {
    /// Opens (creating if needed) the database file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();
        Self::open_with(move || open_db(path)).await
    }

    /// Opens a private in-memory database.
    pub async fn open_in_memory() -> StoreResult<Self> {
        Self::open_with(open_db_in_memory).await
    }

    async fn open_with<F>(open: F) -> StoreResult<Self>
    where
        F: FnOnce() -> DbResult<Connection> + Send + 'static,
    {
        let conn = tokio::task::spawn_blocking(move || -> StoreResult<Connection> {
            let conn = open().map_err(|err| StoreError::StorageUnavailable(err.to_string()))?;
            SqliteNoteRepository::try_new(&conn)?;
            Ok(conn)
        })
        .await
        .map_err(|err| StoreError::StorageUnavailable(format!("store worker failed: {err}")))??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Closes the underlying connection.
    ///
    /// When other clones are still alive the connection stays open until the
    /// last one is dropped.
    pub async fn close(self) -> StoreResult<()> {
        let conn = match Arc::try_unwrap(self.conn) {
            Ok(mutex) => mutex.into_inner(),
            Err(_) => {
                info!("event=store_close module=store status=deferred reason=shared_handle");
                return Ok(());
            }
        };

        tokio::task::spawn_blocking(move || conn.close().map_err(|(_, err)| err))
            .await
            .map_err(|err| StoreError::StorageUnavailable(format!("store worker failed: {err}")))?
            .map_err(|err| {
                error!("event=store_close module=store status=error error={err}");
                StoreError::StorageUnavailable(err.to_string())
            })?;

        info!("event=store_close module=store status=ok");
        Ok(())
    }

    async fn run<T, F>(&self, op: &'static str, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteNoteRepository<'_>) -> RepoResult<T> + Send + 'static,
    {
        let started_at = Instant::now();
        let conn = Arc::clone(&self.conn);

        let result = tokio::task::spawn_blocking(move || -> RepoResult<T> {
            let guard = conn.blocking_lock();
            f(&SqliteNoteRepository::new_unchecked(&guard))
        })
        .await
        .map_err(|err| StoreError::StorageUnavailable(format!("store worker failed: {err}")))?
        .map_err(StoreError::from);

        let duration_ms = started_at.elapsed().as_millis();
        match &result {
            Ok(_) => {
                debug!("event=store_op module=store status=ok op={op} duration_ms={duration_ms}")
            }
            Err(StoreError::NotFound(id)) => warn!(
                "event=store_op module=store status=error op={op} duration_ms={duration_ms} error_code=not_found id={id}"
            ),
            Err(err) => error!(
                "event=store_op module=store status=error op={op} duration_ms={duration_ms} error={err}"
            ),
        }

        result
    }
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn get_all_notes(&self) -> StoreResult<Vec<Note>> {
        self.run("get_all_notes", |repo| repo.list_notes()).await
    }

    async fn get_note(&self, id: NoteId) -> StoreResult<Option<Note>> {
        self.run("get_note", move |repo| repo.get_note(id)).await
    }

    async fn insert(&self, note: &Note) -> StoreResult<Note> {
        let note = note.clone();
        self.run("insert", move |repo| {
            let id = repo.create_note(&note)?;
            repo.get_note(id)?.ok_or_else(|| {
                RepoError::InvalidData(format!("inserted note {id} missing on read-back"))
            })
        })
        .await
    }

    async fn update(&self, note: &Note) -> StoreResult<()> {
        let note = note.clone();
        self.run("update", move |repo| repo.update_note(&note)).await
    }

    async fn delete(&self, note: &Note) -> StoreResult<()> {
        let id = note.id;
        self.run("delete", move |repo| repo.delete_note(id)).await
    }
}
