//! Lifecycle Scenario Tests
//!
//! End-to-end behavior of save and delete through [`RecordLifecycle`]:
//! - first upload of a new record
//! - replacement of an existing asset
//! - non-binary values never clear a stored asset
//! - deleting an event removes its contact persons and images

mod common;

use std::sync::Arc;

use assetkeeper::asset_store::{AssetStore, InMemoryAssetStore};
use assetkeeper::records::{Record, RecordStore};
use assetkeeper::{AssetUpload, PendingAssets};
use common::{lifecycle_over, FailingAssetStore};
use regex::Regex;
use serde_json::Value;

// =============================================================================
// Save Scenarios
// =============================================================================

/// New record, no prior asset: one key is written and referenced.
#[test]
fn test_first_upload_allocates_pattern_key() {
    let store = Arc::new(InMemoryAssetStore::new());
    let (lifecycle, _) = lifecycle_over(Arc::clone(&store));

    let saved = lifecycle
        .save(
            Record::new("contact").with_field("name", "Ada"),
            PendingAssets::new().upload("photo", AssetUpload::new("photo.png", b"png".to_vec())),
        )
        .unwrap();

    let key = saved.asset_key("photo").unwrap();
    let pattern = Regex::new(r"^photo-\d+-[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[0-9a-f]{4}-[0-9a-f]{12}\.png$").unwrap();
    assert!(pattern.is_match(key), "unexpected key {}", key);
    assert_eq!(store.list("").unwrap(), vec![key.to_string()]);
}

/// Per-type base name wins over the uploaded file's stem.
#[test]
fn test_base_name_from_schema() {
    let store = Arc::new(InMemoryAssetStore::new());
    let (lifecycle, _) = lifecycle_over(Arc::clone(&store));

    let saved = lifecycle
        .save(
            Record::new("event"),
            PendingAssets::new().upload("event_image", AssetUpload::new("IMG_2041.JPG", b"jpg".to_vec())),
        )
        .unwrap();

    let pattern = Regex::new(r"^event-\d+-[0-9a-f-]{36}\.JPG$").unwrap();
    assert!(pattern.is_match(saved.asset_key("event_image").unwrap()));
}

/// Existing record with a prior key and a new payload: the old key is
/// replaced and gone afterwards.
#[test]
fn test_replacement_removes_old_key() {
    let store = Arc::new(InMemoryAssetStore::new());
    let (lifecycle, records) = lifecycle_over(Arc::clone(&store));
    store.write("old-1-a.png", b"old").unwrap();
    let existing = records
        .commit(Record::new("contact").with_field("photo", "old-1-a.png"))
        .unwrap();

    let saved = lifecycle
        .save(
            existing,
            PendingAssets::new().upload("photo", AssetUpload::new("new.png", b"new".to_vec())),
        )
        .unwrap();

    let key = saved.asset_key("photo").unwrap();
    assert_ne!(key, "old-1-a.png");
    assert_eq!(store.read(key).unwrap(), b"new");
    assert!(!store.exists("old-1-a.png").unwrap());
}

/// Existing record with a prior key and the "null" marker: unchanged.
#[test]
fn test_null_marker_keeps_prior_key() {
    let store = Arc::new(InMemoryAssetStore::new());
    let (lifecycle, records) = lifecycle_over(Arc::clone(&store));
    store.write("old-1-a.png", b"old").unwrap();
    let existing = records
        .commit(Record::new("contact").with_field("photo", "old-1-a.png"))
        .unwrap();

    for marker in [Value::from("null"), Value::from("None"), Value::from("undefined"), Value::Null] {
        let saved = lifecycle
            .save(existing.clone().with_field("photo", marker), PendingAssets::new())
            .unwrap();
        assert_eq!(saved.asset_key("photo"), Some("old-1-a.png"));
    }
    assert!(store.exists("old-1-a.png").unwrap());

    let persisted = records.load("contact", existing.id.as_ref().unwrap()).unwrap().unwrap();
    assert_eq!(persisted.asset_key("photo"), Some("old-1-a.png"));
}

/// Scalar edits alone never touch stored assets.
#[test]
fn test_scalar_only_save_keeps_assets() {
    let store = Arc::new(InMemoryAssetStore::new());
    let (lifecycle, _) = lifecycle_over(Arc::clone(&store));

    let saved = lifecycle
        .save(
            Record::new("event").with_field("title", "Draft"),
            PendingAssets::new().upload("event_image", AssetUpload::new("a.png", b"a".to_vec())),
        )
        .unwrap();
    let key = saved.asset_key("event_image").unwrap().to_string();

    let mut edited = saved.clone();
    edited.fields.remove("event_image");
    let edited = lifecycle.save(edited.with_field("title", "Final"), PendingAssets::new()).unwrap();

    assert_eq!(edited.asset_key("event_image"), Some(key.as_str()));
    assert_eq!(store.len(), 1);
}

// =============================================================================
// Delete Scenarios
// =============================================================================

fn seed_event_with_contacts<S: AssetStore>(lifecycle: &common::Lifecycle<S>) -> Record {
    let event = lifecycle
        .save(
            Record::new("event").with_field("title", "Meetup"),
            PendingAssets::new().upload("event_image", AssetUpload::new("poster.png", b"poster".to_vec())),
        )
        .unwrap();
    let event_id = event.id.clone().unwrap();

    for name in ["Ada", "Grace"] {
        lifecycle
            .save(
                Record::new("contact")
                    .with_field("name", name)
                    .with_field("event", event_id.as_str()),
                PendingAssets::new(),
            )
            .unwrap();
    }
    event
}

/// Event with two contact persons and an image: everything goes.
#[test]
fn test_delete_event_with_contacts() {
    let store = Arc::new(InMemoryAssetStore::new());
    let (lifecycle, records) = lifecycle_over(Arc::clone(&store));
    let event = seed_event_with_contacts(&lifecycle);
    assert_eq!(records.count("contact"), 2);

    let report = lifecycle.delete(&event).unwrap();

    assert_eq!(report.records_removed.len(), 3);
    assert_eq!(report.records_removed.last().unwrap().0, "event");
    assert_eq!(report.assets_deleted, vec![event.asset_key("event_image").unwrap().to_string()]);
    assert_eq!(records.count("contact"), 0);
    assert_eq!(records.count("event"), 0);
    assert!(store.is_empty());
}

/// Same event, but the image cannot be deleted: the records still go.
#[test]
fn test_delete_event_survives_storage_failure() {
    let store = Arc::new(FailingAssetStore::new());
    let (lifecycle, records) = lifecycle_over(Arc::clone(&store));
    let event = seed_event_with_contacts(&lifecycle);

    store.fail_deletes(true);
    let report = lifecycle.delete(&event).unwrap();

    assert_eq!(report.asset_failures.len(), 1);
    assert_eq!(records.count("contact"), 0);
    assert_eq!(records.count("event"), 0);
    assert_eq!(lifecycle.metrics().snapshot().cleanup_failures, 1);
}

/// Contact photos go with their contacts.
#[test]
fn test_delete_removes_member_assets() {
    let store = Arc::new(InMemoryAssetStore::new());
    let (lifecycle, _) = lifecycle_over(Arc::clone(&store));
    let event = lifecycle.save(Record::new("event"), PendingAssets::new()).unwrap();

    lifecycle
        .save(
            Record::new("contact").with_field("event", event.id.clone().unwrap().as_str()),
            PendingAssets::new().upload("photo", AssetUpload::new("face.jpg", b"face".to_vec())),
        )
        .unwrap();
    assert_eq!(store.len(), 1);

    let report = lifecycle.delete(&event).unwrap();
    assert_eq!(report.assets_deleted.len(), 1);
    assert!(store.is_empty());
}
