//! Index-driven grouping queries
//!
//! Stateless transformations over the current store/index snapshot:
//!
//! - [`recent_notes_with_urls`]: newest URL-bearing notes first
//! - [`all_community_notes`]: Reddit notes grouped by community
//! - [`all_channel_notes`]: YouTube notes grouped by channel
//! - [`notes_grouped_by_tags`]: URL-bearing notes grouped by tag
//!
//! Each uses the same per-note URL extraction as the match engine; the index
//! only narrows candidates, a full scan yields the same results. Group
//! members are sorted by modification time, newest first, with path
//! tie-breaks for determinism.

use crate::error::CoreResult;
use crate::index::UrlIndex;
use crate::matcher::resolve_channel;
use crate::properties::PropertyValue;
use crate::settings::{normalize_tag, MatchSettings};
use crate::store::{NotePath, NoteStore};
use crate::url_utils::{extract_community, is_valid_url, is_youtube_domain};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// One URL-bearing note with the first URL found in its frontmatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentNote {
    pub path: NotePath,
    /// First valid URL value, scanning fields in settings order.
    pub url: String,
    /// The frontmatter field that held it.
    pub property: String,
    pub mtime: DateTime<Utc>,
}

/// The most recently modified notes referencing any URL, newest first,
/// truncated to `limit`.
pub fn recent_notes_with_urls(
    store: &dyn NoteStore,
    settings: &MatchSettings,
    limit: usize,
    index: Option<&UrlIndex>,
) -> CoreResult<Vec<RecentNote>> {
    let mut records = Vec::new();
    for path in candidate_notes(store, index, |index| index.all_files_with_any_url()) {
        let frontmatter = store.frontmatter(&path)?;
        let Some((property, url)) = first_url_value(&frontmatter, &settings.url_properties) else {
            continue;
        };
        let mtime = store.mtime(&path)?;
        records.push(RecentNote {
            path,
            url,
            property,
            mtime,
        });
    }
    records.sort_by(|a, b| b.mtime.cmp(&a.mtime).then_with(|| a.path.cmp(&b.path)));
    records.truncate(limit);
    Ok(records)
}

/// Every Reddit-referencing note, grouped by community id (`r/<name>`).
///
/// A note is registered once per community it references; members are
/// sorted by modification time, newest first.
pub fn all_community_notes(
    store: &dyn NoteStore,
    settings: &MatchSettings,
    index: Option<&UrlIndex>,
) -> CoreResult<BTreeMap<String, Vec<NotePath>>> {
    let mut groups: BTreeMap<String, Vec<Stamped>> = BTreeMap::new();
    for path in candidate_notes(store, index, |index| index.files_for_domain("reddit.com")) {
        let frontmatter = store.frontmatter(&path)?;
        let mut communities = BTreeSet::new();
        for field in &settings.url_properties {
            let Some(raw) = frontmatter.get(field) else {
                continue;
            };
            for value in PropertyValue::from_json(raw).strings() {
                if !is_valid_url(value) || !value.to_lowercase().contains("reddit.com") {
                    continue;
                }
                if let Some(community) = extract_community(value) {
                    communities.insert(community);
                }
            }
        }
        if communities.is_empty() {
            continue;
        }
        let mtime = store.mtime(&path)?;
        for community in communities {
            groups.entry(community).or_default().push(Stamped {
                path: path.clone(),
                mtime,
            });
        }
    }
    debug!(communities = groups.len(), "aggregated community notes");
    Ok(sort_groups(groups))
}

/// Every YouTube-referencing note with a resolvable channel, grouped by
/// channel name. Empty when no channel fields are configured.
pub fn all_channel_notes(
    store: &dyn NoteStore,
    settings: &MatchSettings,
    index: Option<&UrlIndex>,
) -> CoreResult<BTreeMap<String, Vec<NotePath>>> {
    if settings.channel_properties.is_empty() {
        return Ok(BTreeMap::new());
    }

    let mut groups: BTreeMap<String, Vec<Stamped>> = BTreeMap::new();
    for path in candidate_notes(store, index, |index| index.all_files_with_any_url()) {
        let frontmatter = store.frontmatter(&path)?;
        let references_youtube = settings.url_properties.iter().any(|field| {
            frontmatter
                .get(field)
                .map(|raw| {
                    PropertyValue::from_json(raw)
                        .strings()
                        .iter()
                        .any(|value| is_valid_url(value) && is_youtube_domain(value))
                })
                .unwrap_or(false)
        });
        if !references_youtube {
            continue;
        }
        let Some(channel) = resolve_channel(&frontmatter, &settings.channel_properties) else {
            continue;
        };
        let mtime = store.mtime(&path)?;
        groups
            .entry(channel)
            .or_default()
            .push(Stamped { path, mtime });
    }
    Ok(sort_groups(groups))
}

/// URL-bearing notes grouped by tag.
///
/// A note's tag set is its frontmatter `tags` (scalar or list) unioned with
/// the host-parsed inline tags, every tag normalized to carry a leading
/// `#`. With an allow-list, only listed tags are kept.
pub fn notes_grouped_by_tags(
    store: &dyn NoteStore,
    settings: &MatchSettings,
    allowlist: Option<&BTreeSet<String>>,
    index: Option<&UrlIndex>,
) -> CoreResult<BTreeMap<String, Vec<NotePath>>> {
    let mut groups: BTreeMap<String, Vec<Stamped>> = BTreeMap::new();
    for path in candidate_notes(store, index, |index| index.all_files_with_any_url()) {
        let frontmatter = store.frontmatter(&path)?;
        if first_url_value(&frontmatter, &settings.url_properties).is_none() {
            continue;
        }

        let mut tags = BTreeSet::new();
        if let Some(raw) = frontmatter.get("tags") {
            for value in PropertyValue::from_json(raw).strings() {
                tags.extend(normalize_tag(value));
            }
        }
        for tag in store.inline_tags(&path)? {
            tags.extend(normalize_tag(&tag));
        }

        let mtime = store.mtime(&path)?;
        for tag in tags {
            if let Some(allowed) = allowlist {
                if !allowed.contains(&tag) {
                    continue;
                }
            }
            groups.entry(tag).or_default().push(Stamped {
                path: path.clone(),
                mtime,
            });
        }
    }
    Ok(sort_groups(groups))
}

#[derive(Debug, Clone)]
struct Stamped {
    path: NotePath,
    mtime: DateTime<Utc>,
}

fn candidate_notes(
    store: &dyn NoteStore,
    index: Option<&UrlIndex>,
    narrow: impl Fn(&UrlIndex) -> Vec<NotePath>,
) -> Vec<NotePath> {
    match index {
        Some(index) => narrow(index),
        None => store.list_notes(),
    }
}

/// First valid URL value found scanning fields in order (first field, first
/// element), with the field it came from.
fn first_url_value(
    frontmatter: &HashMap<String, Value>,
    url_properties: &[String],
) -> Option<(String, String)> {
    for field in url_properties {
        let Some(raw) = frontmatter.get(field) else {
            continue;
        };
        for value in PropertyValue::from_json(raw).strings() {
            if is_valid_url(value) {
                return Some((field.clone(), value.clone()));
            }
        }
    }
    None
}

fn sort_groups(groups: BTreeMap<String, Vec<Stamped>>) -> BTreeMap<String, Vec<NotePath>> {
    groups
        .into_iter()
        .map(|(key, mut members)| {
            members.sort_by(|a, b| b.mtime.cmp(&a.mtime).then_with(|| a.path.cmp(&b.path)));
            (key, members.into_iter().map(|m| m.path).collect())
        })
        .collect()
}
