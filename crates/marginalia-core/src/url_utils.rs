//! URL normalization and classification primitives
//!
//! Pure, total string functions — bad input degrades to an empty string or
//! `None`, it never errors. Everything else in the crate (index keys, match
//! tiers, community grouping) is defined in terms of these:
//!
//! - [`canonicalize`]: the string form used for exact-match comparison
//! - [`extract_domain`]: lower-cased hostname with `www.` stripped
//! - [`is_valid_url`]: cheap shape check before anything is indexed
//! - [`is_youtube_domain`] / [`extract_community`]: site-specific grouping

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static VALID_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(https?://)?([a-z0-9][a-z0-9-]*\.)+[a-z]{2,}(/\S*)?$")
        .expect("valid-url regex")
});

static YOUTUBE_DOMAIN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://((www|m|mobile)\.)?(youtube(-nocookie)?\.[a-z]{2,}|youtu\.be)([/?#]|$)")
        .expect("youtube-domain regex")
});

static REDDIT_COMMUNITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(https?://)?((www|old|new)\.)?reddit\.com/r/([a-z0-9_][a-z0-9_-]*)")
        .expect("reddit-community regex")
});

/// Reduce a URL to the form used for exact-match comparison.
///
/// Lower-cases, strips a leading `http://`/`https://`, strips a leading
/// `www.`, strips the fragment, then trims trailing slashes. The fragment is
/// removed before the slash trim so the function is idempotent. Empty input
/// yields an empty string.
pub fn canonicalize(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    let mut s = url.to_lowercase();
    if let Some(rest) = s.strip_prefix("https://") {
        s = rest.to_string();
    } else if let Some(rest) = s.strip_prefix("http://") {
        s = rest.to_string();
    }
    if let Some(rest) = s.strip_prefix("www.") {
        s = rest.to_string();
    }
    if let Some(pos) = s.find('#') {
        s.truncate(pos);
    }
    while s.ends_with('/') {
        s.pop();
    }
    s
}

/// Extract the lower-cased hostname with any `www.` prefix stripped.
///
/// Parses with the `url` crate, prepending `https://` when no scheme is
/// present. When parsing fails, falls back to the canonical form up to the
/// first `/`. Returns `None` when nothing host-like is left.
pub fn extract_domain(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }

    let with_scheme = if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{url}")
    };

    if let Ok(parsed) = Url::parse(&with_scheme) {
        if let Some(host) = parsed.host_str() {
            let lower = host.to_lowercase();
            let trimmed = lower.strip_prefix("www.").unwrap_or(&lower);
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }

    let canonical = canonicalize(url);
    let domain = canonical.split('/').next().unwrap_or("");
    if domain.is_empty() {
        None
    } else {
        Some(domain.to_string())
    }
}

/// Cheap shape check: optional scheme, dotted labels, TLD of at least two
/// letters, optional path. Case-insensitive.
pub fn is_valid_url(candidate: &str) -> bool {
    VALID_URL_REGEX.is_match(candidate)
}

/// Two URLs are the same page iff their canonical forms are equal.
pub fn urls_match(a: &str, b: &str) -> bool {
    canonicalize(a) == canonicalize(b)
}

/// Both URLs resolve to the same domain.
pub fn is_same_domain(a: &str, b: &str) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(da), Some(db)) => da == db,
        _ => false,
    }
}

/// Recognizes the YouTube domain family: `youtube.<tld>`,
/// `youtube-nocookie.<tld>`, `youtu.be`, with optional `www.`/`m.`/`mobile.`
/// prefixes. A scheme is required.
pub fn is_youtube_domain(url: &str) -> bool {
    YOUTUBE_DOMAIN_REGEX.is_match(url)
}

/// Extract a Reddit community id (`r/<name>`) from a URL.
///
/// Matches `reddit.com/r/<name>` with optional scheme and optional
/// `www.`/`old.`/`new.` prefix, case-insensitively, preserving the
/// community name's original casing. Returns `None` for anything else.
pub fn extract_community(url: &str) -> Option<String> {
    REDDIT_COMMUNITY_REGEX
        .captures(url)
        .map(|caps| format!("r/{}", &caps[4]))
}
