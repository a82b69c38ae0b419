//! Unified error handling for the matching core
//!
//! Almost everything in this crate degrades instead of failing: malformed
//! URLs, non-string frontmatter values, and unknown index keys all produce
//! empty results. The only genuine error is a host-store contract violation,
//! e.g. asking for the frontmatter of a note the store no longer knows about.

use thiserror::Error;

/// Common result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Core operation errors
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Store error: {0}")]
    Store(String),
}
