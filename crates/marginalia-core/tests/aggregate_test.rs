//! Aggregator tests: recent listing, community/channel/tag grouping, and
//! index/full-scan agreement for each.

use marginalia_core::test_support::MemoryNoteStore;
use marginalia_core::{
    all_channel_notes, all_community_notes, notes_grouped_by_tags, recent_notes_with_urls,
    MatchSettings, NotePath, UrlIndex,
};
use serde_json::json;
use std::collections::BTreeMap;

fn settings() -> MatchSettings {
    MatchSettings {
        url_properties: vec!["url".to_string()],
        channel_properties: vec!["channel".to_string()],
        ..Default::default()
    }
}

fn index_for(store: &MemoryNoteStore, settings: &MatchSettings) -> UrlIndex {
    UrlIndex::build(store, settings.url_properties.clone()).unwrap()
}

fn group_paths(groups: &BTreeMap<String, Vec<NotePath>>) -> BTreeMap<String, Vec<String>> {
    groups
        .iter()
        .map(|(k, v)| (k.clone(), v.iter().map(|p| p.to_string()).collect()))
        .collect()
}

// Scenario B: limit 1 returns only the newest note.
#[test]
fn test_recent_notes_sorted_by_mtime_and_truncated() {
    let mut store = MemoryNoteStore::new();
    store.put_note("old.md", json!({ "url": "https://example.com/old" }));
    store.set_mtime("old.md", 100);
    store.put_note("new.md", json!({ "url": "https://example.com/new" }));
    store.set_mtime("new.md", 200);
    store.put_note("no-url.md", json!({ "title": "nothing" }));

    let settings = settings();
    let index = index_for(&store, &settings);

    let with_index = recent_notes_with_urls(&store, &settings, 1, Some(&index)).unwrap();
    let full_scan = recent_notes_with_urls(&store, &settings, 1, None).unwrap();
    assert_eq!(with_index, full_scan);

    assert_eq!(with_index.len(), 1);
    assert_eq!(with_index[0].path.as_str(), "new.md");
    assert_eq!(with_index[0].url, "https://example.com/new");
    assert_eq!(with_index[0].property, "url");
}

#[test]
fn test_recent_notes_takes_first_field_first_element() {
    let mut store = MemoryNoteStore::new();
    store.put_note(
        "multi.md",
        json!({
            "url": ["https://example.com/first", "https://example.com/second"],
            "source": "https://example.com/third"
        }),
    );

    let settings = MatchSettings {
        url_properties: vec!["url".to_string(), "source".to_string()],
        ..Default::default()
    };
    let records = recent_notes_with_urls(&store, &settings, 10, None).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, "https://example.com/first");
}

#[test]
fn test_community_notes_grouped_and_sorted() {
    let mut store = MemoryNoteStore::new();
    store.put_note("a.md", json!({ "url": "https://old.reddit.com/r/rust/one" }));
    store.set_mtime("a.md", 100);
    store.put_note("b.md", json!({ "url": "https://www.reddit.com/r/rust/two" }));
    store.set_mtime("b.md", 300);
    store.put_note(
        "c.md",
        json!({ "url": ["https://reddit.com/r/rust/three", "https://reddit.com/r/cpp/four"] }),
    );
    store.set_mtime("c.md", 200);
    store.put_note("d.md", json!({ "url": "https://example.com/not-reddit" }));

    let settings = settings();
    let index = index_for(&store, &settings);

    let with_index = all_community_notes(&store, &settings, Some(&index)).unwrap();
    let full_scan = all_community_notes(&store, &settings, None).unwrap();
    assert_eq!(with_index, full_scan);

    let groups = group_paths(&with_index);
    assert_eq!(groups["r/rust"], ["b.md", "c.md", "a.md"]);
    assert_eq!(groups["r/cpp"], ["c.md"]);
    assert_eq!(groups.len(), 2);
}

#[test]
fn test_channel_notes_grouped_by_resolved_channel() {
    let mut store = MemoryNoteStore::new();
    store.put_note(
        "x1.md",
        json!({ "url": "https://youtube.com/watch?v=1", "channel": "Channel X" }),
    );
    store.set_mtime("x1.md", 100);
    store.put_note(
        "x2.md",
        json!({ "url": "https://youtu.be/2", "channel": "[[Channel X]]" }),
    );
    store.set_mtime("x2.md", 200);
    store.put_note(
        "y.md",
        json!({ "url": "https://m.youtube.com/watch?v=3", "channel": "Channel Y" }),
    );
    store.put_note(
        "not-youtube.md",
        json!({ "url": "https://vimeo.com/4", "channel": "Channel X" }),
    );
    store.put_note("no-channel.md", json!({ "url": "https://youtube.com/watch?v=5" }));

    let settings = settings();
    let index = index_for(&store, &settings);

    let with_index = all_channel_notes(&store, &settings, Some(&index)).unwrap();
    let full_scan = all_channel_notes(&store, &settings, None).unwrap();
    assert_eq!(with_index, full_scan);

    let groups = group_paths(&with_index);
    assert_eq!(groups["Channel X"], ["x2.md", "x1.md"]);
    assert_eq!(groups["Channel Y"], ["y.md"]);
    assert_eq!(groups.len(), 2);
}

#[test]
fn test_channel_notes_empty_without_channel_fields() {
    let mut store = MemoryNoteStore::new();
    store.put_note(
        "x.md",
        json!({ "url": "https://youtube.com/watch?v=1", "channel": "Channel X" }),
    );

    let settings = MatchSettings {
        url_properties: vec!["url".to_string()],
        channel_properties: Vec::new(),
        ..Default::default()
    };
    let groups = all_channel_notes(&store, &settings, None).unwrap();
    assert!(groups.is_empty());
}

// Scenario D: frontmatter tags with and without `#`, plus an inline tag.
#[test]
fn test_tag_grouping_normalizes_and_unions_inline_tags() {
    let mut store = MemoryNoteStore::new();
    store.put_note(
        "t.md",
        json!({ "url": "https://example.com", "tags": ["foo", "#bar"] }),
    );
    store.set_inline_tags("t.md", &["#baz"]);
    store.put_note("untagged.md", json!({ "url": "https://example.com/2" }));
    store.put_note("no-url.md", json!({ "tags": ["foo"] }));

    let settings = settings();
    let index = index_for(&store, &settings);

    let with_index = notes_grouped_by_tags(&store, &settings, None, Some(&index)).unwrap();
    let full_scan = notes_grouped_by_tags(&store, &settings, None, None).unwrap();
    assert_eq!(with_index, full_scan);

    let groups = group_paths(&with_index);
    assert_eq!(groups["#foo"], ["t.md"]);
    assert_eq!(groups["#bar"], ["t.md"]);
    assert_eq!(groups["#baz"], ["t.md"]);
    assert_eq!(groups.len(), 3);
}

#[test]
fn test_tag_grouping_with_allowlist() {
    let mut store = MemoryNoteStore::new();
    store.put_note(
        "t.md",
        json!({ "url": "https://example.com", "tags": ["foo", "#bar"] }),
    );
    store.set_inline_tags("t.md", &["#baz"]);

    let settings = MatchSettings {
        url_properties: vec!["url".to_string()],
        selected_tags: "bar".to_string(),
        ..Default::default()
    };
    let allowlist = settings.selected_tag_set();
    let groups = notes_grouped_by_tags(&store, &settings, Some(&allowlist), None).unwrap();

    let groups = group_paths(&groups);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups["#bar"], ["t.md"]);
}

#[test]
fn test_scalar_tags_frontmatter() {
    let mut store = MemoryNoteStore::new();
    store.put_note("t.md", json!({ "url": "https://example.com", "tags": "solo" }));

    let groups = notes_grouped_by_tags(&store, &settings(), None, None).unwrap();
    assert_eq!(group_paths(&groups)["#solo"], ["t.md"]);
}
