//! Index lifecycle integration: host events drive the index and queries
//! always observe a fully reconciled state.

use marginalia_core::test_support::MemoryNoteStore;
use marginalia_core::{find_matching_notes, MatchSettings, NotePath, UrlIndex};
use serde_json::json;

fn settings() -> MatchSettings {
    MatchSettings {
        url_properties: vec!["url".to_string()],
        ..Default::default()
    }
}

#[test]
fn test_modified_note_is_reconciled_before_next_query() {
    let mut store = MemoryNoteStore::new();
    store.put_note("a.md", json!({ "url": "https://first.com/page" }));

    let settings = settings();
    let mut index = UrlIndex::build(&store, settings.url_properties.clone()).unwrap();

    let result =
        find_matching_notes(&store, "https://first.com/page", &settings, Some(&index)).unwrap();
    assert_eq!(result.exact_matches.len(), 1);

    // Host edits the note to point somewhere else, then notifies.
    store.put_note("a.md", json!({ "url": "https://second.com/page" }));
    index
        .note_created_or_modified(&store, &NotePath::from("a.md"))
        .unwrap();

    let stale =
        find_matching_notes(&store, "https://first.com/page", &settings, Some(&index)).unwrap();
    assert!(stale.exact_matches.is_empty());
    assert!(stale.tld_matches.is_empty());

    let fresh =
        find_matching_notes(&store, "https://second.com/page", &settings, Some(&index)).unwrap();
    assert_eq!(fresh.exact_matches.len(), 1);
}

#[test]
fn test_create_delete_rename_event_sequence() {
    let mut store = MemoryNoteStore::new();
    let settings = settings();
    let mut index = UrlIndex::build(&store, settings.url_properties.clone()).unwrap();
    assert!(index.is_empty());

    store.put_note("new.md", json!({ "url": "https://example.com" }));
    index
        .note_created_or_modified(&store, &NotePath::from("new.md"))
        .unwrap();
    assert_eq!(index.files_for_domain("example.com").len(), 1);

    store.rename_note("new.md", "renamed.md");
    index
        .note_renamed(&store, &NotePath::from("new.md"), &NotePath::from("renamed.md"))
        .unwrap();
    assert_eq!(
        index.files_for_domain("example.com"),
        vec![NotePath::from("renamed.md")]
    );
    assert!(index
        .files_for_canonical_url("https://example.com")
        .contains(&NotePath::from("renamed.md")));

    store.remove_note("renamed.md");
    index.note_deleted(&NotePath::from("renamed.md"));
    assert!(index.is_empty());
    assert!(index.files_for_domain("example.com").is_empty());
}

#[test]
fn test_generation_advances_monotonically_across_events() {
    let mut store = MemoryNoteStore::new();
    store.put_note("a.md", json!({ "url": "https://example.com" }));

    let settings = settings();
    let mut index = UrlIndex::build(&store, settings.url_properties.clone()).unwrap();
    let mut last = index.generation();

    store.put_note("b.md", json!({ "url": "https://example.com/b" }));
    index
        .note_created_or_modified(&store, &NotePath::from("b.md"))
        .unwrap();
    assert!(index.generation() > last);
    last = index.generation();

    index.note_deleted(&NotePath::from("a.md"));
    assert!(index.generation() > last);
}

#[test]
fn test_index_equivalence_survives_update_churn() {
    let mut store = MemoryNoteStore::new();
    store.put_note("a.md", json!({ "url": "https://site.com/a" }));
    store.put_note("b.md", json!({ "url": "https://site.com/b" }));

    let settings = MatchSettings {
        url_properties: vec!["url".to_string()],
        expand_domain_matches: true,
        ..Default::default()
    };
    let mut index = UrlIndex::build(&store, settings.url_properties.clone()).unwrap();

    // Churn: retarget a.md, delete b.md, add c.md.
    store.put_note("a.md", json!({ "url": "https://other.org/a" }));
    index
        .note_created_or_modified(&store, &NotePath::from("a.md"))
        .unwrap();
    store.remove_note("b.md");
    index.note_deleted(&NotePath::from("b.md"));
    store.put_note("c.md", json!({ "url": "https://site.com/c" }));
    index
        .note_created_or_modified(&store, &NotePath::from("c.md"))
        .unwrap();

    for target in [
        "https://site.com/a",
        "https://site.com/c",
        "https://other.org/zzz",
    ] {
        let with_index = find_matching_notes(&store, target, &settings, Some(&index)).unwrap();
        let full_scan = find_matching_notes(&store, target, &settings, None).unwrap();
        assert_eq!(with_index, full_scan, "diverged for {target}");
    }
}
