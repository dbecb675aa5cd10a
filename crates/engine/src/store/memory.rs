// In-memory store: a HashMap mirror of the sqlite adapter, for tests and
// ephemeral runs.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use notula_common::note::{Note, NoteId};

use super::{LocalStore, StoreError, StoreResult};

#[derive(Debug, Default)]
pub struct MemoryStore {
    notes: Mutex<HashMap<NoteId, Note>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<NoteId, Note>>> {
        self.notes.lock().map_err(|_| StoreError::Backend("note map lock poisoned".to_string()))
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn get(&self, id: &NoteId) -> StoreResult<Option<Note>> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn get_all(&self) -> StoreResult<Vec<Note>> {
        let mut notes: Vec<Note> = self.lock()?.values().cloned().collect();
        notes.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(notes)
    }

    async fn insert_or_replace(&self, note: Note) -> StoreResult<()> {
        self.lock()?.insert(note.id.clone(), note);
        Ok(())
    }

    async fn insert_or_replace_all(&self, notes: Vec<Note>) -> StoreResult<()> {
        let mut map = self.lock()?;
        for note in notes {
            map.insert(note.id.clone(), note);
        }
        Ok(())
    }

    async fn update_fields(&self, id: &NoteId, title: &str, body: &str) -> StoreResult<()> {
        let mut map = self.lock()?;
        let note = map.get_mut(id).ok_or_else(|| StoreError::NotFound(id.clone()))?;
        note.title = title.to_string();
        note.body = body.to_string();
        Ok(())
    }

    async fn update_pin(&self, id: &NoteId, pinned: bool) -> StoreResult<()> {
        let mut map = self.lock()?;
        let note = map.get_mut(id).ok_or_else(|| StoreError::NotFound(id.clone()))?;
        note.is_pinned = pinned;
        Ok(())
    }

    async fn rekey(&self, old_id: &NoteId, new_id: &NoteId) -> StoreResult<()> {
        let mut map = self.lock()?;
        let note = map.remove(old_id).ok_or_else(|| StoreError::NotFound(old_id.clone()))?;
        map.insert(new_id.clone(), note.with_id(new_id.clone()));
        Ok(())
    }

    async fn delete(&self, id: &NoteId) -> StoreResult<()> {
        self.lock()?.remove(id);
        Ok(())
    }

    async fn delete_all(&self) -> StoreResult<()> {
        self.lock()?.clear();
        Ok(())
    }
}
