//! Note store collaborator: entity, trait, and storage backends

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryNoteStore;
pub use sqlite::SqliteNoteStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note owned by a user. The engine never constructs or deletes this
/// type directly; all mutation goes through a [`NoteStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Unique note id
    pub id: String,

    /// Id of the owning user
    pub owner_id: String,

    /// Note body
    pub text: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Storage collaborator for notes.
///
/// `update_text` takes the owner id so the backend can enforce the
/// ownership check and the write as one conditional operation; at most one
/// write per note id can succeed for a given update.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Find a note scoped to `(id, owner_id)`; `None` when absent or not
    /// owned by the given user
    async fn find_by_id(&self, id: &str, owner_id: &str) -> Result<Option<Note>>;

    /// Create a note for the given owner
    async fn create(&self, owner_id: &str, text: &str) -> Result<Note>;

    /// Replace a note's text, conditional on ownership
    async fn update_text(&self, id: &str, owner_id: &str, text: &str) -> Result<Note>;

    /// All notes of the given owner, oldest first
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Note>>;
}
