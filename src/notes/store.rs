//! In-memory note storage.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A stored note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsertError {
    #[error("A note with this title already exists")]
    DuplicateTitle,
}

/// A thread-safe note store, shared by cloning.
#[derive(Debug, Clone, Default)]
pub struct NoteStore {
    inner: Arc<DashMap<Uuid, Note>>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a note; titles are unique (case-insensitive).
    pub fn insert(&self, title: String, body: String, tags: Vec<String>) -> Result<Note, InsertError> {
        let taken = self
            .inner
            .iter()
            .any(|entry| entry.title.eq_ignore_ascii_case(&title));
        if taken {
            return Err(InsertError::DuplicateTitle);
        }

        let note = Note {
            id: Uuid::new_v4(),
            title,
            body,
            tags,
            created_at: Utc::now(),
        };
        self.inner.insert(note.id, note.clone());
        Ok(note)
    }

    pub fn get(&self, id: &Uuid) -> Option<Note> {
        self.inner.get(id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, id: &Uuid) -> Option<Note> {
        self.inner.remove(id).map(|(_, note)| note)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// One page of notes, oldest first, optionally filtered by a title
    /// substring. Returns the page and the filtered total.
    pub fn page(&self, search: Option<&str>, offset: usize, limit: usize) -> (Vec<Note>, usize) {
        let needle = search.map(str::to_lowercase);
        let mut notes: Vec<Note> = self
            .inner
            .iter()
            .filter(|entry| match &needle {
                Some(needle) => entry.title.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .map(|entry| entry.value().clone())
            .collect();
        notes.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let total = notes.len();
        let page = notes.into_iter().skip(offset).take(limit).collect();
        (page, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_remove() {
        let store = NoteStore::new();
        let note = store.insert("First".into(), "body".into(), vec![]).unwrap();

        assert_eq!(store.get(&note.id), Some(note.clone()));
        assert_eq!(store.remove(&note.id), Some(note.clone()));
        assert!(store.get(&note.id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_duplicate_title_rejected() {
        let store = NoteStore::new();
        store.insert("Groceries".into(), String::new(), vec![]).unwrap();
        assert_eq!(
            store.insert("groceries".into(), String::new(), vec![]),
            Err(InsertError::DuplicateTitle)
        );
    }

    #[test]
    fn test_page_and_search() {
        let store = NoteStore::new();
        for i in 0..5 {
            store.insert(format!("note {}", i), String::new(), vec![]).unwrap();
        }
        store.insert("Other".into(), String::new(), vec![]).unwrap();

        let (page, total) = store.page(None, 2, 2);
        assert_eq!(total, 6);
        assert_eq!(page.len(), 2);

        let (page, total) = store.page(Some("NOTE"), 0, 10);
        assert_eq!(total, 5);
        assert!(page.iter().all(|n| n.title.starts_with("note")));
    }
}
