//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register schema migrations keyed by strictly increasing version.
//! - Apply pending migrations atomically, logging each step once committed.
//!
//! # Invariants
//! - `version` values must remain monotonic and start at 1.
//! - Migrations are additive only: they never drop tables, columns or rows.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - A database newer than `latest_version()` is rejected, never downgraded.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "init_notes",
        sql: include_str!("0001_init.sql"),
    },
    Migration {
        version: 2,
        name: "notes_timestamp_index",
        sql: include_str!("0002_notes_timestamp_index.sql"),
    },
];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    apply_migrations_to(conn, latest_version())?;
    Ok(())
}

/// Applies pending migrations up to and including `target_version`.
///
/// Lets callers stage a database at an older schema, e.g. to exercise one
/// upgrade step in isolation. Returns the versions applied by this call,
/// which is empty when the database was already at or past the target.
pub fn apply_migrations_to(conn: &mut Connection, target_version: u32) -> DbResult<Vec<u32>> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    let target = target_version.min(latest);
    if current_version >= target {
        return Ok(Vec::new());
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > current_version && migration.version <= target)
        .collect();

    let tx = conn.transaction()?;
    for migration in &pending {
        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    for migration in &pending {
        info!(
            "event=db_migrate module=db status=ok from={} to={} name={}",
            migration.version - 1,
            migration.version,
            migration.name
        );
    }

    Ok(pending.iter().map(|migration| migration.version).collect())
}

/// Reads the schema version stored in `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
