use std::fs;

use senti_core::ResultsEnvelope;
use senti_engine::{ensure_dir, write_atomically, ArtifactCache, ArtifactKind};
use tempfile::TempDir;

fn summaries(google: &str, comments: &str) -> ResultsEnvelope {
    ResultsEnvelope {
        status: Some("ready".to_string()),
        google_summary: Some(google.to_string()),
        comment_summary: Some(comments.to_string()),
        ..ResultsEnvelope::default()
    }
}

#[test]
fn artifacts_are_keyed_by_product() {
    let mut cache = ArtifactCache::in_memory();
    cache.store_from_results("Apple IPhone 15", &summaries("great", "loved"));

    assert_eq!(
        cache.get("Apple IPhone 15", ArtifactKind::GoogleSummary),
        Some("great")
    );
    // Same product with different spacing and case.
    assert_eq!(
        cache.get("  apple iphone 15 ", ArtifactKind::CommentSummary),
        Some("loved")
    );
    assert_eq!(cache.get("Dell XPS 13", ArtifactKind::GoogleSummary), None);
}

#[test]
fn invalidate_drops_both_keys() {
    let mut cache = ArtifactCache::in_memory();
    cache.put("Dell XPS 13", ArtifactKind::GoogleSummary, "fast");
    cache.put("Dell XPS 13", ArtifactKind::CommentSummary, "hot");
    cache.put("Sony WH-1000XM5", ArtifactKind::GoogleSummary, "quiet");

    assert!(cache.invalidate("Dell XPS 13"));
    for kind in ArtifactKind::ALL {
        assert_eq!(cache.get("Dell XPS 13", kind), None);
    }
    assert_eq!(
        cache.get("Sony WH-1000XM5", ArtifactKind::GoogleSummary),
        Some("quiet")
    );
    assert!(!cache.invalidate("Dell XPS 13"));
}

#[test]
fn results_without_summaries_store_nothing() {
    let mut cache = ArtifactCache::in_memory();
    cache.store_from_results("Dell XPS 13", &ResultsEnvelope::default());
    assert!(cache.is_empty());
}

#[test]
fn storage_keys_match_display_names() {
    assert_eq!(ArtifactKind::GoogleSummary.key(), "googleSummary");
    assert_eq!(ArtifactKind::CommentSummary.key(), "commentSummary");
}

#[test]
fn file_cache_survives_reload_and_invalidation() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("cache").join("artifacts.ron");

    let mut cache = ArtifactCache::with_file(&path);
    assert!(cache.is_empty());
    cache.store_from_results("Apple IPhone 15", &summaries("great", "loved"));
    assert!(path.is_file());

    let mut reloaded = ArtifactCache::with_file(&path);
    assert_eq!(
        reloaded.get("Apple IPhone 15", ArtifactKind::GoogleSummary),
        Some("great")
    );

    reloaded.invalidate("Apple IPhone 15");
    let after = ArtifactCache::with_file(&path);
    assert!(after.is_empty());
}

#[test]
fn corrupt_cache_file_starts_empty() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("artifacts.ron");
    fs::write(&path, "this is not ron (").unwrap();

    let cache = ArtifactCache::with_file(&path);
    assert!(cache.is_empty());
}

#[test]
fn creates_missing_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("doc.ron");

    write_atomically(&target, "hello").unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "hello");

    write_atomically(&target, "world").unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "world");
}

#[test]
fn no_partial_file_when_parent_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let result = write_atomically(&file_path.join("doc.ron"), "data");
    assert!(result.is_err());
    assert_eq!(fs::read_to_string(&file_path).unwrap(), "x");
}
