// Sqlite-backed note store.
//
// One `notes` table plus a `schema_migrations` ledger; WAL mode so point
// reads and writes from concurrent tasks do not block each other.

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use notula_common::note::{Note, NoteId};

use super::{LocalStore, StoreError, StoreResult};

const MIGRATION_V1_SQL: &str = r#"
CREATE TABLE notes (
    id          TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    body        TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    is_pinned   INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX notes_created_idx ON notes (created_at, id);
"#;

const MIGRATIONS: &[(i64, &str)] = &[(1, MIGRATION_V1_SQL)];

#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|error| {
                StoreError::backend(format!(
                    "failed to create notes.db parent directory `{}`: {error}",
                    parent.display()
                ))
            })?;
        }

        let mut conn = Connection::open(path).map_err(|error| {
            StoreError::backend(format!("failed to open notes.db at `{}`: {error}", path.display()))
        })?;

        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            ",
        )
        .map_err(|error| StoreError::backend(format!("failed to configure sqlite pragmas: {error}")))?;

        ensure_migration_table(&conn)?;
        apply_pending_migrations(&mut conn)?;

        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn schema_version(&self) -> StoreResult<i64> {
        current_schema_version(&*self.conn()?)
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Backend("sqlite connection lock poisoned".to_string()))
    }
}

#[async_trait]
impl LocalStore for SqliteStore {
    async fn get(&self, id: &NoteId) -> StoreResult<Option<Note>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id, title, body, created_at, is_pinned FROM notes WHERE id = ?1")
            .map_err(|error| StoreError::backend(format!("failed to prepare note lookup: {error}")))?;

        let mut rows = stmt
            .query_map(params![id.as_str()], row_to_note)
            .map_err(|error| StoreError::backend(format!("failed to query note by id: {error}")))?;

        match rows.next() {
            Some(row) => Ok(Some(row.map_err(|error| {
                StoreError::backend(format!("failed to decode note row: {error}"))
            })?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> StoreResult<Vec<Note>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, title, body, created_at, is_pinned FROM notes \
                 ORDER BY created_at ASC, id ASC",
            )
            .map_err(|error| StoreError::backend(format!("failed to prepare note scan: {error}")))?;

        let rows = stmt
            .query_map([], row_to_note)
            .map_err(|error| StoreError::backend(format!("failed to scan notes: {error}")))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|error| StoreError::backend(format!("failed to collect note rows: {error}")))
    }

    async fn insert_or_replace(&self, note: Note) -> StoreResult<()> {
        let conn = self.conn()?;
        insert_or_replace_row(&conn, &note)
    }

    async fn insert_or_replace_all(&self, notes: Vec<Note>) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|error| StoreError::backend(format!("failed to start merge transaction: {error}")))?;
        for note in &notes {
            insert_or_replace_row(&tx, note)?;
        }
        tx.commit()
            .map_err(|error| StoreError::backend(format!("failed to commit merge transaction: {error}")))
    }

    async fn update_fields(&self, id: &NoteId, title: &str, body: &str) -> StoreResult<()> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE notes SET title = ?1, body = ?2 WHERE id = ?3",
                params![title, body, id.as_str()],
            )
            .map_err(|error| StoreError::backend(format!("failed to update note fields: {error}")))?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn update_pin(&self, id: &NoteId, pinned: bool) -> StoreResult<()> {
        let conn = self.conn()?;
        let changed = conn
            .execute("UPDATE notes SET is_pinned = ?1 WHERE id = ?2", params![pinned, id.as_str()])
            .map_err(|error| StoreError::backend(format!("failed to update pin flag: {error}")))?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn rekey(&self, old_id: &NoteId, new_id: &NoteId) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|error| StoreError::backend(format!("failed to start rekey transaction: {error}")))?;

        // Drop any record already sitting under the new ID first, so the
        // primary key swap cannot conflict.
        tx.execute("DELETE FROM notes WHERE id = ?1", params![new_id.as_str()])
            .map_err(|error| StoreError::backend(format!("failed to clear rekey target: {error}")))?;

        let changed = tx
            .execute("UPDATE notes SET id = ?1 WHERE id = ?2", params![new_id.as_str(), old_id.as_str()])
            .map_err(|error| StoreError::backend(format!("failed to rekey note: {error}")))?;
        if changed == 0 {
            return Err(StoreError::NotFound(old_id.clone()));
        }

        tx.commit()
            .map_err(|error| StoreError::backend(format!("failed to commit rekey transaction: {error}")))
    }

    async fn delete(&self, id: &NoteId) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM notes WHERE id = ?1", params![id.as_str()])
            .map_err(|error| StoreError::backend(format!("failed to delete note: {error}")))?;
        Ok(())
    }

    async fn delete_all(&self) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM notes", [])
            .map_err(|error| StoreError::backend(format!("failed to clear notes: {error}")))?;
        Ok(())
    }
}

fn insert_or_replace_row(conn: &Connection, note: &Note) -> StoreResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO notes (id, title, body, created_at, is_pinned) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            note.id.as_str(),
            note.title,
            note.body,
            note.created_at.to_rfc3339(),
            note.is_pinned,
        ],
    )
    .map_err(|error| StoreError::backend(format!("failed to upsert note row: {error}")))?;
    Ok(())
}

fn row_to_note(row: &rusqlite::Row<'_>) -> rusqlite::Result<Note> {
    let id: String = row.get(0)?;
    let created_str: String = row.get(3)?;
    let created_at = created_str.parse::<DateTime<Utc>>().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(Note {
        id: NoteId::from(id),
        title: row.get(1)?,
        body: row.get(2)?,
        created_at,
        is_pinned: row.get(4)?,
    })
}

fn ensure_migration_table(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY,
            applied_at  TEXT NOT NULL
        );
        ",
    )
    .map_err(|error| StoreError::backend(format!("failed to ensure schema_migrations table: {error}")))
}

fn current_schema_version(conn: &Connection) -> StoreResult<i64> {
    conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_migrations", [], |row| row.get(0))
        .map_err(|error| StoreError::backend(format!("failed to read schema version: {error}")))
}

fn apply_pending_migrations(conn: &mut Connection) -> StoreResult<()> {
    let mut current_version = current_schema_version(conn)?;

    for (version, sql) in MIGRATIONS {
        if *version <= current_version {
            continue;
        }

        let tx = conn
            .transaction()
            .map_err(|error| StoreError::backend(format!("failed to start migration transaction: {error}")))?;
        tx.execute_batch(sql)
            .map_err(|error| StoreError::backend(format!("failed to apply migration v{version}: {error}")))?;
        tx.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, datetime('now'))",
            params![version],
        )
        .map_err(|error| StoreError::backend(format!("failed to record migration v{version}: {error}")))?;
        tx.commit()
            .map_err(|error| StoreError::backend(format!("failed to commit migration v{version}: {error}")))?;
        current_version = *version;
    }

    Ok(())
}
