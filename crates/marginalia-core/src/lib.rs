//! # marginalia-core
//!
//! URL-aware note matching for knowledge-management hosts: given a web
//! page's URL, find every note whose frontmatter references the same page,
//! the same domain, or the same community — fast enough to run on every
//! render tick across a large note collection.
//!
//! ## Architecture
//!
//! - [`url_utils`]: pure URL normalization and classification primitives
//! - [`index`]: incrementally maintained reverse index (domain → notes,
//!   canonical URL → notes), kept in sync via host lifecycle notifications
//! - [`matcher`]: the tiered match engine (exact / same-domain / community)
//! - [`aggregate`]: grouping queries (recent, by community, by channel,
//!   by tag) over the same primitives
//! - [`store`]: the read-only [`NoteStore`] capability trait the host
//!   implements
//! - [`settings`]: the user-configurable [`MatchSettings`] snapshot
//!
//! The index is strictly an optimization: every query produces identical
//! results with or without it. Malformed input degrades to empty results;
//! the only surfaced error is a host-store contract violation
//! ([`CoreError::NoteNotFound`]).
//!
//! ## Quick start
//!
//! ```rust
//! use marginalia_core::{find_matching_notes, MatchSettings, UrlIndex};
//! use marginalia_core::test_support::MemoryNoteStore;
//! use serde_json::json;
//!
//! # fn main() -> marginalia_core::CoreResult<()> {
//! let mut store = MemoryNoteStore::new();
//! store.put_note("reading/rust-book.md", json!({ "url": "https://doc.rust-lang.org/book/" }));
//!
//! let settings = MatchSettings::default();
//! let index = UrlIndex::build(&store, settings.url_properties.clone())?;
//!
//! let result = find_matching_notes(
//!     &store,
//!     "https://doc.rust-lang.org/book",
//!     &settings,
//!     Some(&index),
//! )?;
//! assert_eq!(result.exact_matches.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod error;
pub mod index;
pub mod matcher;
pub mod properties;
pub mod settings;
pub mod store;
pub mod test_support;
pub mod url_utils;

pub use aggregate::{
    all_channel_notes, all_community_notes, notes_grouped_by_tags, recent_notes_with_urls,
    RecentNote,
};
pub use error::{CoreError, CoreResult};
pub use index::UrlIndex;
pub use matcher::{
    find_matching_notes, MatchAccumulator, MatchResult, MatchTier, MatchedNote,
};
pub use properties::{property_map, PropertyMap, PropertyValue};
pub use settings::{normalize_tag, MatchSettings};
pub use store::{NotePath, NoteStore};
