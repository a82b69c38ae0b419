//! Tiered matching of notes against a target URL
//!
//! Given a target URL, produce a fresh [`MatchResult`] with up to three
//! precision tiers:
//!
//! - **Exact**: a note's URL property canonicalizes to the same string
//! - **Domain**: same domain as the target (or both in the YouTube family)
//! - **Community**: domain-tier matches clustered by community (`r/<name>`)
//!
//! Exact always wins — a note never appears in two tiers. Every tier
//! deduplicates per note before that reconciliation, so a note with several
//! qualifying frontmatter values still appears at most once per tier.
//!
//! The engine is an accumulator: [`MatchAccumulator::push_note`] folds one
//! candidate at a time, so a host can spread a large full scan across UI
//! ticks; [`find_matching_notes`] is the one-call driver over it.

use crate::error::CoreResult;
use crate::index::UrlIndex;
use crate::properties::PropertyValue;
use crate::settings::MatchSettings;
use crate::store::{NotePath, NoteStore};
use crate::url_utils::{
    canonicalize, extract_community, extract_domain, is_same_domain, is_youtube_domain, urls_match,
};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Which tier a matched note landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Canonical URL equality.
    Exact,
    /// Same domain, or both URLs in the YouTube family.
    Domain,
}

/// One matched note, attributed to the frontmatter field and value that
/// produced the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedNote {
    pub path: NotePath,
    /// The frontmatter field that matched.
    pub property: String,
    /// The raw frontmatter value that matched.
    pub value: String,
    pub tier: MatchTier,
}

/// Result of one match query. Constructed fresh per query, never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchResult {
    /// Notes whose URL canonicalizes to the target's canonical form.
    pub exact_matches: Vec<MatchedNote>,
    /// Flat domain-tier matches, disjoint from `exact_matches`.
    pub tld_matches: Vec<MatchedNote>,
    /// Domain-tier matches clustered by community, present only when
    /// community grouping is enabled. Disjoint from `exact_matches`.
    pub community_matches: Option<BTreeMap<String, Vec<MatchedNote>>>,
    /// Channel the domain tier was filtered to, when the channel filter ran.
    pub matched_channel: Option<String>,
}

/// Incremental fold of candidate notes into a [`MatchResult`].
pub struct MatchAccumulator<'a> {
    settings: &'a MatchSettings,
    target_url: String,
    target_canonical: String,
    target_community: Option<String>,
    target_is_youtube: bool,
    exact: Vec<MatchedNote>,
    domain_tier: Vec<MatchedNote>,
    communities: BTreeMap<String, Vec<MatchedNote>>,
}

impl<'a> MatchAccumulator<'a> {
    pub fn new(target_url: &str, settings: &'a MatchSettings) -> Self {
        Self {
            settings,
            target_url: target_url.to_string(),
            target_canonical: canonicalize(target_url),
            target_community: extract_community(target_url),
            target_is_youtube: is_youtube_domain(target_url),
            exact: Vec::new(),
            domain_tier: Vec::new(),
            communities: BTreeMap::new(),
        }
    }

    /// Evaluate one candidate note's frontmatter.
    ///
    /// Fields are scanned in settings order; the first exact-matching value
    /// wins and stops evaluation for this note. Malformed values are
    /// skipped, never errors.
    pub fn push_note(&mut self, path: NotePath, frontmatter: &HashMap<String, Value>) {
        if self.target_canonical.is_empty() {
            return;
        }

        let mut exact_hit: Option<MatchedNote> = None;
        let mut domain_hit: Option<MatchedNote> = None;
        let mut community_hits: BTreeMap<String, MatchedNote> = BTreeMap::new();

        'fields: for field in &self.settings.url_properties {
            let Some(raw) = frontmatter.get(field) else {
                continue;
            };
            for value in PropertyValue::from_json(raw).strings() {
                if !crate::url_utils::is_valid_url(value) {
                    continue;
                }

                if urls_match(value, &self.target_url) {
                    exact_hit = Some(MatchedNote {
                        path: path.clone(),
                        property: field.clone(),
                        value: value.clone(),
                        tier: MatchTier::Exact,
                    });
                    break 'fields;
                }

                if !self.settings.expand_domain_matches {
                    continue;
                }
                let same_family = is_same_domain(value, &self.target_url)
                    || (self.target_is_youtube && is_youtube_domain(value));
                if !same_family {
                    continue;
                }

                let matched = MatchedNote {
                    path: path.clone(),
                    property: field.clone(),
                    value: value.clone(),
                    tier: MatchTier::Domain,
                };

                if self.settings.group_communities {
                    if let Some(community) = extract_community(value) {
                        community_hits.entry(community).or_insert_with(|| matched.clone());
                    }
                }

                if domain_hit.is_none() {
                    let include = if self.settings.filter_communities {
                        match &self.target_community {
                            Some(target) => extract_community(value).as_deref() == Some(target),
                            None => true,
                        }
                    } else {
                        true
                    };
                    if include {
                        domain_hit = Some(matched);
                    }
                }
            }
        }

        // Exact wins: the note's domain-tier and community hits are dropped,
        // which is the priority reconciliation applied per note.
        if let Some(exact) = exact_hit {
            self.exact.push(exact);
            return;
        }
        if let Some(hit) = domain_hit {
            self.domain_tier.push(hit);
        }
        for (community, hit) in community_hits {
            self.communities.entry(community).or_default().push(hit);
        }
    }

    /// Apply the channel filter and assemble the final result.
    pub fn finish(mut self, store: &dyn NoteStore) -> CoreResult<MatchResult> {
        if self.target_canonical.is_empty() {
            return Ok(MatchResult::default());
        }

        let mut matched_channel = None;
        if self.settings.filter_channels
            && self.target_is_youtube
            && !self.exact.is_empty()
            && !self.settings.channel_properties.is_empty()
        {
            let frontmatter = store.frontmatter(&self.exact[0].path)?;
            if let Some(channel) = resolve_channel(&frontmatter, &self.settings.channel_properties)
            {
                let mut kept = Vec::new();
                for hit in self.domain_tier.drain(..) {
                    let frontmatter = store.frontmatter(&hit.path)?;
                    let own = resolve_channel(&frontmatter, &self.settings.channel_properties);
                    if own.as_deref() == Some(channel.as_str()) {
                        kept.push(hit);
                    }
                }
                self.domain_tier = kept;
                matched_channel = Some(channel);
            }
        }

        let community_matches = if self.settings.group_communities {
            // Groups only ever contain non-exact notes, but a note can land
            // in a group and then match exactly on a later field; prune.
            let exact_paths: HashSet<&NotePath> = self.exact.iter().map(|m| &m.path).collect();
            let mut groups = self.communities;
            for members in groups.values_mut() {
                members.retain(|m| !exact_paths.contains(&m.path));
            }
            groups.retain(|_, members| !members.is_empty());
            Some(groups)
        } else {
            None
        };

        let exact_paths: HashSet<&NotePath> = self.exact.iter().map(|m| &m.path).collect();
        self.domain_tier.retain(|m| !exact_paths.contains(&m.path));

        Ok(MatchResult {
            exact_matches: self.exact,
            tld_matches: self.domain_tier,
            community_matches,
            matched_channel,
        })
    }
}

/// Find every note matching the target URL, at all enabled tiers.
///
/// With an index, candidates are narrowed to the union of the target
/// domain's bucket (plus the coalesced `youtube.com` bucket for YouTube
/// targets) and the canonical-URL bucket; candidates are always visited in
/// `list_notes()` order so the narrowed and full-scan paths produce
/// identical results. When the target's domain cannot be extracted the
/// index is ignored and the engine full-scans — narrowing cannot be
/// guaranteed safe for such input.
pub fn find_matching_notes(
    store: &dyn NoteStore,
    target_url: &str,
    settings: &MatchSettings,
    index: Option<&UrlIndex>,
) -> CoreResult<MatchResult> {
    let mut accumulator = MatchAccumulator::new(target_url, settings);
    if accumulator.target_canonical.is_empty() {
        return Ok(MatchResult::default());
    }

    let candidate_filter: Option<HashSet<NotePath>> = match (index, extract_domain(target_url)) {
        (Some(index), Some(domain)) => {
            let mut candidates: HashSet<NotePath> =
                index.files_for_domain(&domain).into_iter().collect();
            if is_youtube_domain(target_url) {
                candidates.extend(index.files_for_domain("youtube.com"));
            }
            candidates.extend(index.files_for_canonical_url(target_url));
            Some(candidates)
        }
        _ => None,
    };

    for path in store.list_notes() {
        if let Some(filter) = &candidate_filter {
            if !filter.contains(&path) {
                continue;
            }
        }
        let frontmatter = store.frontmatter(&path)?;
        accumulator.push_note(path, &frontmatter);
    }

    let result = accumulator.finish(store)?;
    debug!(
        target = %target_url,
        exact = result.exact_matches.len(),
        domain = result.tld_matches.len(),
        narrowed = candidate_filter.is_some(),
        "matched notes"
    );
    Ok(result)
}

/// Resolve a note's channel: the first non-empty value among the ordered
/// channel fields, scalar or first list element, with `[[...]]` wikilink
/// brackets stripped.
pub fn resolve_channel(
    frontmatter: &HashMap<String, Value>,
    channel_properties: &[String],
) -> Option<String> {
    for field in channel_properties {
        let Some(raw) = frontmatter.get(field) else {
            continue;
        };
        if let Some(value) = PropertyValue::from_json(raw).first_string() {
            let cleaned = strip_wikilink(value);
            if !cleaned.is_empty() {
                return Some(cleaned);
            }
        }
    }
    None
}

fn strip_wikilink(value: &str) -> String {
    let trimmed = value.trim();
    trimmed
        .strip_prefix("[[")
        .and_then(|inner| inner.strip_suffix("]]"))
        .map(|inner| inner.trim().to_string())
        .unwrap_or_else(|| trimmed.to_string())
}
