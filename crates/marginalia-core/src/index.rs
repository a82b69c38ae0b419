//! Reverse URL index over the note collection
//!
//! Maintains three entry sets so queries never have to scan every note:
//!
//! - domain → notes referencing that domain
//! - canonical URL → notes referencing exactly that page
//! - the set of all notes referencing any URL at all
//!
//! The index is a pure optimization: narrowing a query through it must
//! produce the same result as a full scan. Two details make that hold:
//!
//! - YouTube-family URLs (`youtu.be`, `m.youtube.com`, …) are additionally
//!   indexed under the coalesced key `youtube.com`, because the match engine
//!   treats any two YouTube URLs as same-domain candidates.
//! - Reddit subdomains (`old.reddit.com`, …) are additionally indexed under
//!   `reddit.com`, which the community aggregator queries directly.
//!
//! Updates are remove-then-insert against a per-note reverse map of the keys
//! the note contributed, so a reconciling update can never leave orphan
//! entries. `&mut self` on every mutator serializes updates against queries;
//! the [`generation`](UrlIndex::generation) token lets a host that rebuilds
//! off-thread detect stale snapshots instead.

use crate::error::CoreResult;
use crate::properties::PropertyValue;
use crate::store::{NotePath, NoteStore};
use crate::url_utils::{canonicalize, extract_domain, is_valid_url, is_youtube_domain};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, trace};

/// Coalesced domain key for the YouTube domain family.
const YOUTUBE_KEY: &str = "youtube.com";
/// Coalesced domain key for Reddit subdomains.
const REDDIT_KEY: &str = "reddit.com";

/// Keys a single note currently contributes to the index.
#[derive(Debug, Clone, Default)]
struct NoteKeys {
    domains: BTreeSet<String>,
    urls: BTreeSet<String>,
}

impl NoteKeys {
    fn is_empty(&self) -> bool {
        self.domains.is_empty() && self.urls.is_empty()
    }
}

/// Incrementally maintained reverse index from domain and canonical URL to
/// the notes referencing them.
#[derive(Debug, Default)]
pub struct UrlIndex {
    /// URL property fields captured at build time; updates re-extract
    /// against the same field set.
    url_properties: Vec<String>,
    domain_to_notes: HashMap<String, BTreeSet<NotePath>>,
    url_to_notes: HashMap<String, BTreeSet<NotePath>>,
    notes_with_urls: BTreeSet<NotePath>,
    note_keys: HashMap<NotePath, NoteKeys>,
    generation: u64,
}

impl UrlIndex {
    /// Cold-start build over every note in the store.
    pub fn build(store: &dyn NoteStore, url_properties: Vec<String>) -> CoreResult<Self> {
        let mut index = UrlIndex {
            url_properties,
            ..Default::default()
        };
        for path in store.list_notes() {
            index.insert_note(store, &path)?;
        }
        index.generation = 1;
        debug!(
            notes = index.notes_with_urls.len(),
            domains = index.domain_to_notes.len(),
            urls = index.url_to_notes.len(),
            "built url index"
        );
        Ok(index)
    }

    /// Reconcile one note after the host reports it created or modified.
    ///
    /// Remove-then-insert: every entry the note previously contributed is
    /// dropped before its current frontmatter is re-extracted, so a diverged
    /// note fully self-heals here.
    pub fn note_created_or_modified(
        &mut self,
        store: &dyn NoteStore,
        path: &NotePath,
    ) -> CoreResult<()> {
        self.remove_note(path);
        self.insert_note(store, path)?;
        self.generation += 1;
        trace!(note = %path, generation = self.generation, "reconciled note");
        Ok(())
    }

    /// Drop every entry keyed to a deleted note.
    pub fn note_deleted(&mut self, path: &NotePath) {
        self.remove_note(path);
        self.generation += 1;
        trace!(note = %path, generation = self.generation, "removed deleted note");
    }

    /// Move a note's entries from its old path to its new one.
    ///
    /// Frontmatter is unchanged by a rename; the entries are re-extracted
    /// under the new path.
    pub fn note_renamed(
        &mut self,
        store: &dyn NoteStore,
        old_path: &NotePath,
        new_path: &NotePath,
    ) -> CoreResult<()> {
        self.remove_note(old_path);
        self.insert_note(store, new_path)?;
        self.generation += 1;
        trace!(old = %old_path, new = %new_path, "renamed note in index");
        Ok(())
    }

    /// Notes referencing the given domain. Empty when the domain is unknown.
    pub fn files_for_domain(&self, domain: &str) -> Vec<NotePath> {
        self.domain_to_notes
            .get(&domain.to_lowercase())
            .map(|notes| notes.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Notes whose canonical URL equals the given URL's canonical form.
    pub fn files_for_canonical_url(&self, url: &str) -> Vec<NotePath> {
        self.url_to_notes
            .get(&canonicalize(url))
            .map(|notes| notes.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Every note referencing at least one URL.
    pub fn all_files_with_any_url(&self) -> Vec<NotePath> {
        self.notes_with_urls.iter().cloned().collect()
    }

    /// Consistency token, bumped once per reconciling mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of notes currently referencing any URL.
    pub fn len(&self) -> usize {
        self.notes_with_urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes_with_urls.is_empty()
    }

    /// The URL property fields this index was built against.
    pub fn url_properties(&self) -> &[String] {
        &self.url_properties
    }

    fn insert_note(&mut self, store: &dyn NoteStore, path: &NotePath) -> CoreResult<()> {
        let frontmatter = store.frontmatter(path)?;

        let mut keys = NoteKeys::default();
        for field in &self.url_properties {
            let Some(raw) = frontmatter.get(field) else {
                continue;
            };
            for value in PropertyValue::from_json(raw).strings() {
                if !is_valid_url(value) {
                    continue;
                }
                let canonical = canonicalize(value);
                if !canonical.is_empty() {
                    keys.urls.insert(canonical);
                }
                if let Some(domain) = extract_domain(value) {
                    for key in coalesced_domain_keys(&domain, value) {
                        keys.domains.insert(key);
                    }
                }
            }
        }

        if keys.is_empty() {
            return Ok(());
        }

        for domain in &keys.domains {
            self.domain_to_notes
                .entry(domain.clone())
                .or_default()
                .insert(path.clone());
        }
        for url in &keys.urls {
            self.url_to_notes
                .entry(url.clone())
                .or_default()
                .insert(path.clone());
        }
        self.notes_with_urls.insert(path.clone());
        self.note_keys.insert(path.clone(), keys);
        Ok(())
    }

    fn remove_note(&mut self, path: &NotePath) {
        let Some(keys) = self.note_keys.remove(path) else {
            return;
        };
        for domain in &keys.domains {
            if let Some(notes) = self.domain_to_notes.get_mut(domain) {
                notes.remove(path);
                if notes.is_empty() {
                    self.domain_to_notes.remove(domain);
                }
            }
        }
        for url in &keys.urls {
            if let Some(notes) = self.url_to_notes.get_mut(url) {
                notes.remove(path);
                if notes.is_empty() {
                    self.url_to_notes.remove(url);
                }
            }
        }
        self.notes_with_urls.remove(path);
    }
}

/// Domain keys a URL is indexed under: its own domain, plus the coalesced
/// family key when the URL belongs to the YouTube or Reddit families.
fn coalesced_domain_keys(domain: &str, url: &str) -> Vec<String> {
    let mut keys = vec![domain.to_string()];
    if is_youtube_domain(url) && domain != YOUTUBE_KEY {
        keys.push(YOUTUBE_KEY.to_string());
    }
    if domain != REDDIT_KEY && domain.ends_with(".reddit.com") {
        keys.push(REDDIT_KEY.to_string());
    }
    keys
}
