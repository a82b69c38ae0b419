//! Host note-store abstraction
//!
//! The core never touches files itself. The host (editor, vault, test fake)
//! implements [`NoteStore`], a narrow read-only capability set, and the core
//! holds only [`NotePath`] identifiers — never copies of note content. Change
//! notifications flow the other way: the host calls the lifecycle methods on
//! [`crate::index::UrlIndex`] when notes are created, modified, deleted or
//! renamed.

use crate::error::CoreResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Stable opaque note identity.
///
/// A path string owned by the host. Using a value type instead of a host
/// object handle keeps the index decoupled from any concrete editor type and
/// makes it trivially testable with fakes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NotePath(String);

impl NotePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotePath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl From<String> for NotePath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// Read-only capability set the host note store provides.
///
/// All methods take a snapshot view; the core never mutates the store.
/// Methods addressing a single note return
/// [`CoreError::NoteNotFound`](crate::CoreError::NoteNotFound) when the host
/// is asked about a note it no longer knows — the one contract violation
/// this subsystem surfaces as an error.
pub trait NoteStore {
    /// Every note in the collection, in the host's listing order.
    fn list_notes(&self) -> Vec<NotePath>;

    /// The note's frontmatter as raw key/value metadata.
    fn frontmatter(&self, note: &NotePath) -> CoreResult<HashMap<String, Value>>;

    /// Tags appearing inline in the note body, as the host parsed them.
    fn inline_tags(&self, note: &NotePath) -> CoreResult<Vec<String>>;

    /// Last-modified timestamp of the note.
    fn mtime(&self, note: &NotePath) -> CoreResult<DateTime<Utc>>;
}
