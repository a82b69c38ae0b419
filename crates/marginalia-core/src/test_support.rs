//! Deterministic in-memory fakes for testing
//!
//! [`MemoryNoteStore`] implements [`NoteStore`] over a sorted in-memory map:
//! no I/O, stable listing order, and helpers for driving the index lifecycle
//! (put, remove, rename, mtime control) from tests.

use crate::error::{CoreError, CoreResult};
use crate::store::{NotePath, NoteStore};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
struct MemoryNote {
    frontmatter: HashMap<String, Value>,
    inline_tags: Vec<String>,
    mtime: DateTime<Utc>,
}

/// In-memory note store fake with deterministic listing order.
#[derive(Debug, Default, Clone)]
pub struct MemoryNoteStore {
    notes: BTreeMap<NotePath, MemoryNote>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a note. `frontmatter` must be a JSON object; its
    /// entries become the note's frontmatter map.
    pub fn put_note(&mut self, path: impl Into<NotePath>, frontmatter: Value) {
        let map = match frontmatter {
            Value::Object(entries) => entries.into_iter().collect(),
            _ => HashMap::new(),
        };
        self.notes.insert(
            path.into(),
            MemoryNote {
                frontmatter: map,
                inline_tags: Vec::new(),
                mtime: Utc.timestamp_opt(0, 0).unwrap(),
            },
        );
    }

    /// Set the inline tags the host would have parsed from the note body.
    pub fn set_inline_tags(&mut self, path: impl Into<NotePath>, tags: &[&str]) {
        if let Some(note) = self.notes.get_mut(&path.into()) {
            note.inline_tags = tags.iter().map(|t| t.to_string()).collect();
        }
    }

    /// Set a note's last-modified time from a unix timestamp in seconds.
    pub fn set_mtime(&mut self, path: impl Into<NotePath>, unix_secs: i64) {
        if let Some(note) = self.notes.get_mut(&path.into()) {
            note.mtime = Utc.timestamp_opt(unix_secs, 0).unwrap();
        }
    }

    /// Remove a note, as the host would on deletion.
    pub fn remove_note(&mut self, path: impl Into<NotePath>) {
        self.notes.remove(&path.into());
    }

    /// Rename a note, keeping its frontmatter, tags and mtime.
    pub fn rename_note(&mut self, old: impl Into<NotePath>, new: impl Into<NotePath>) {
        if let Some(note) = self.notes.remove(&old.into()) {
            self.notes.insert(new.into(), note);
        }
    }

    fn get(&self, path: &NotePath) -> CoreResult<&MemoryNote> {
        self.notes
            .get(path)
            .ok_or_else(|| CoreError::NoteNotFound(path.to_string()))
    }
}

impl NoteStore for MemoryNoteStore {
    fn list_notes(&self) -> Vec<NotePath> {
        self.notes.keys().cloned().collect()
    }

    fn frontmatter(&self, note: &NotePath) -> CoreResult<HashMap<String, Value>> {
        Ok(self.get(note)?.frontmatter.clone())
    }

    fn inline_tags(&self, note: &NotePath) -> CoreResult<Vec<String>> {
        Ok(self.get(note)?.inline_tags.clone())
    }

    fn mtime(&self, note: &NotePath) -> CoreResult<DateTime<Utc>> {
        Ok(self.get(note)?.mtime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_listing_order_is_stable() {
        let mut store = MemoryNoteStore::new();
        store.put_note("b.md", json!({}));
        store.put_note("a.md", json!({}));
        let listed: Vec<String> = store.list_notes().iter().map(|p| p.to_string()).collect();
        assert_eq!(listed, ["a.md", "b.md"]);
    }

    #[test]
    fn test_missing_note_is_not_found() {
        let store = MemoryNoteStore::new();
        let err = store.frontmatter(&NotePath::from("ghost.md")).unwrap_err();
        assert!(matches!(err, CoreError::NoteNotFound(_)));
    }

    #[test]
    fn test_rename_keeps_metadata() {
        let mut store = MemoryNoteStore::new();
        store.put_note("a.md", json!({ "url": "https://a.com" }));
        store.set_mtime("a.md", 42);
        store.rename_note("a.md", "b.md");

        let fm = store.frontmatter(&NotePath::from("b.md")).unwrap();
        assert_eq!(fm.get("url"), Some(&json!("https://a.com")));
        assert_eq!(
            store.mtime(&NotePath::from("b.md")).unwrap().timestamp(),
            42
        );
    }
}
