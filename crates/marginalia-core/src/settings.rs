//! Match settings snapshot
//!
//! A plain data snapshot of everything user-configurable that the match
//! engine and aggregators consult. The host owns persistence and the
//! settings UI; the core only reads a snapshot per query.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// User-configurable matching behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    /// Frontmatter fields scanned for URLs, in priority order.
    pub url_properties: Vec<String>,
    /// Frontmatter fields scanned for a channel name, in priority order.
    pub channel_properties: Vec<String>,
    /// Include same-domain (and YouTube-family) notes as a second tier.
    pub expand_domain_matches: bool,
    /// Cluster domain-tier matches by community (e.g. Reddit `r/<name>`).
    pub group_communities: bool,
    /// When the target URL itself resolves to a community, restrict the flat
    /// domain tier to notes of that same community.
    pub filter_communities: bool,
    /// For YouTube targets with an exact match, restrict the domain tier to
    /// notes of the exact match's channel.
    pub filter_channels: bool,
    /// Group URL-bearing notes by their tags.
    pub group_by_tags: bool,
    /// Restrict tag grouping to [`selected_tags`](Self::selected_tags).
    pub group_by_selected_tags: bool,
    /// Comma-separated tag allow-list, with or without leading `#`.
    pub selected_tags: String,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            url_properties: vec!["url".to_string(), "source".to_string()],
            channel_properties: vec!["channel".to_string()],
            expand_domain_matches: true,
            group_communities: false,
            filter_communities: false,
            filter_channels: false,
            group_by_tags: false,
            group_by_selected_tags: false,
            selected_tags: String::new(),
        }
    }
}

impl MatchSettings {
    /// The parsed tag allow-list: trimmed, `#`-normalized, empties dropped.
    ///
    /// One parser shared by the tag aggregator and any host settings UI.
    pub fn selected_tag_set(&self) -> BTreeSet<String> {
        self.selected_tags
            .split(',')
            .filter_map(|raw| normalize_tag(raw))
            .collect()
    }
}

/// Normalize a tag to carry exactly one leading `#`.
///
/// Returns `None` for blank input.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('#');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("#{trimmed}"))
    }
}
