//! In-memory note store, used by tests and the CLI host

use super::{Note, NoteStore};
use crate::error::{Result, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Note store backed by a process-local map
#[derive(Default)]
pub struct InMemoryNoteStore {
    notes: Mutex<HashMap<String, Note>>,
}

impl InMemoryNoteStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a note with a fixed id, for tests and demos
    pub async fn insert(&self, note: Note) {
        self.notes.lock().await.insert(note.id.clone(), note);
    }
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn find_by_id(&self, id: &str, owner_id: &str) -> Result<Option<Note>> {
        let notes = self.notes.lock().await;
        Ok(notes
            .get(id)
            .filter(|note| note.owner_id == owner_id)
            .cloned())
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
        self.notes
            .lock()
            .await
            .insert(note.id.clone(), note.clone());
        Ok(note)
    }

    async fn update_text(&self, id: &str, owner_id: &str, text: &str) -> Result<Note> {
        let mut notes = self.notes.lock().await;
        let note = notes
            .get_mut(id)
            .filter(|note| note.owner_id == owner_id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        note.text = text.to_string();
        note.updated_at = Utc::now();
        Ok(note.clone())
    }

    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Note>> {
        let notes = self.notes.lock().await;
        let mut owned: Vec<Note> = notes
            .values()
            .filter(|note| note.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(owned)
    }
}
