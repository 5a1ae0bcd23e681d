//! SQLite-backed note store

use super::{Note, NoteStore};
use crate::error::{Result, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Note store backed by an embedded SQLite database.
///
/// Queries are short single-row operations; the connection is guarded by
/// an async mutex so callers serialize at the await point.
pub struct SqliteNoteStore {
    conn: Mutex<Connection>,
}

impl SqliteNoteStore {
    /// Open (or create) the database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path).map_err(StoreError::from)?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database, for tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StoreError::from)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS notes (
                id         TEXT PRIMARY KEY,
                owner_id   TEXT NOT NULL,
                text       TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_notes_owner ON notes (owner_id, created_at);",
        )
        .map_err(StoreError::from)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
        let created_at: String = row.get(3)?;
        let updated_at: String = row.get(4)?;
        Ok(Note {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            text: row.get(2)?,
            created_at: parse_timestamp(&created_at),
            updated_at: parse_timestamp(&updated_at),
        })
    }
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn find_by_id(&self, id: &str, owner_id: &str) -> Result<Option<Note>> {
        let conn = self.conn.lock().await;
        let note = conn
            .query_row(
                "SELECT id, owner_id, text, created_at, updated_at
                 FROM notes WHERE id = ?1 AND owner_id = ?2",
                params![id, owner_id],
                Self::note_from_row,
            )
            .optional()
            .map_err(StoreError::from)?;
        Ok(note)
    }

    async fn create(&self, owner_id: &str, text: &str) -> Result<Note> {
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            text: text.to_string(),
            created_at: now,
            updated_at: now,
        };

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO notes (id, owner_id, text, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                note.id,
                note.owner_id,
                note.text,
                note.created_at.to_rfc3339(),
                note.updated_at.to_rfc3339()
            ],
        )
        .map_err(StoreError::from)?;
        Ok(note)
    }

    async fn update_text(&self, id: &str, owner_id: &str, text: &str) -> Result<Note> {
        let now = Utc::now();
        let conn = self.conn.lock().await;

        // Ownership-scoped conditional write: at most one row can match.
        let changed = conn
            .execute(
                "UPDATE notes SET text = ?1, updated_at = ?2
                 WHERE id = ?3 AND owner_id = ?4",
                params![text, now.to_rfc3339(), id, owner_id],
            )
            .map_err(StoreError::from)?;
        if changed == 0 {
            return Err(StoreError::NotFound { id: id.to_string() }.into());
        }

        let note = conn
            .query_row(
                "SELECT id, owner_id, text, created_at, updated_at
                 FROM notes WHERE id = ?1 AND owner_id = ?2",
                params![id, owner_id],
                Self::note_from_row,
            )
            .map_err(StoreError::from)?;
        Ok(note)
    }

    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Note>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT id, owner_id, text, created_at, updated_at
                 FROM notes WHERE owner_id = ?1 ORDER BY created_at ASC",
            )
            .map_err(StoreError::from)?;
        let notes = stmt
            .query_map(params![owner_id], Self::note_from_row)
            .map_err(StoreError::from)?
            .collect::<rusqlite::Result<Vec<Note>>>()
            .map_err(StoreError::from)?;
        Ok(notes)
    }
}
