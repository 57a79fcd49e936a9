// crates/http-fixtures-core/tests/store.rs
// ============================================================================
// Module: Fixture Store Tests
// Description: Tests for loading, ordering, and persisting fixture files.
// Purpose: Validate round-trips, deletion cleanup, and corrupt-file handling.
// ============================================================================

//! ## Overview
//! Exercises [`http_fixtures_core::FixtureStore`] against temporary
//! directories.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::fs;

use http_fixtures_core::FixtureLocation;
use http_fixtures_core::FixtureStore;
use http_fixtures_core::Interaction;
use http_fixtures_core::LoadStatus;
use http_fixtures_core::PersistOutcome;
use http_fixtures_core::RecordedResponse;
use http_fixtures_core::TestIdentity;
use serde_json::json;

fn sample(href: &str) -> Vec<Interaction> {
    vec![
        Interaction::new("post", href, RecordedResponse::new(201, Some(json!({"id": 7}))))
            .with_body(json!({"name": "widget"}))
            .with_header("content-type", "application/json"),
    ]
}

fn no_order() -> Vec<&'static TestIdentity> {
    Vec::new()
}

// ============================================================================
// SECTION: Loading
// ============================================================================

#[test]
fn missing_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let (store, status) = FixtureStore::load(&dir.path().join("absent.json")).unwrap();
    assert!(store.is_empty());
    assert_eq!(status, LoadStatus::Missing);
}

#[test]
fn corrupt_file_is_reported_separately() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, "[1, 2, 3]").unwrap();
    let (store, status) = FixtureStore::load(&path).unwrap();
    assert!(store.is_empty());
    assert!(matches!(status, LoadStatus::Corrupt { .. }));
}

#[test]
fn unknown_interaction_fields_survive_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("extra.json");
    let raw = r#"{"t 1": [{"method": "GET", "href": "http://x/", "rawHeaders": ["a", "b"]}]}"#;
    fs::write(&path, raw).unwrap();
    let (store, _) = FixtureStore::load(&path).unwrap();
    let entry = &store.get("t 1")[0];
    assert_eq!(entry.extra.get("rawHeaders"), Some(&json!(["a", "b"])));
    assert_eq!(entry.response.status, 200);

    let order = [TestIdentity::new("t 1")];
    store.persist(&path, &order).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"rawHeaders\""));
}

#[test]
fn absent_identity_reads_as_empty() {
    let store = FixtureStore::new();
    assert!(store.get("nobody 1").is_empty());
}

// ============================================================================
// SECTION: Persisting
// ============================================================================

#[test]
fn persist_round_trips_and_follows_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("__nocks__").join("api_test.rs.json");
    let second = TestIdentity::new("b 1");
    let first = TestIdentity::new("a 1");
    let mut store = FixtureStore::new();
    store.set(&first, sample("http://x/a"));
    store.set(&second, sample("http://x/b"));

    let outcome = store.persist(&path, &[second.clone(), first.clone()]).unwrap();
    assert_eq!(
        outcome,
        PersistOutcome::Written {
            entries: 2
        }
    );
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.find("\"b 1\"").unwrap() < text.find("\"a 1\"").unwrap());
    assert!(text.starts_with("{\n  \""));
    assert!(text.ends_with("}\n"));

    let (loaded, status) = FixtureStore::load(&path).unwrap();
    assert_eq!(
        status,
        LoadStatus::Loaded {
            entries: 2
        }
    );
    assert_eq!(loaded, store);
    assert_eq!(loaded.get("a 1")[0].method, "POST");
}

#[test]
fn persisting_same_store_twice_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("same.json");
    let id = TestIdentity::new("only 1");
    let mut store = FixtureStore::new();
    store.set(&id, sample("http://x/"));
    store.persist(&path, [&id]).unwrap();
    let first = fs::read(&path).unwrap();
    store.persist(&path, [&id]).unwrap();
    assert_eq!(first, fs::read(&path).unwrap());
}

#[test]
fn persist_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clean.json");
    let id = TestIdentity::new("t 1");
    let mut store = FixtureStore::new();
    store.set(&id, sample("http://x/"));
    store.persist(&path, [&id]).unwrap();
    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["clean.json".to_string()]);
}

#[test]
fn empty_store_deletes_file_and_empty_folder() {
    let dir = tempfile::tempdir().unwrap();
    let location = FixtureLocation::resolve(&dir.path().join("api_test.rs"), "__nocks__");
    fs::create_dir_all(location.dir()).unwrap();
    fs::write(location.path(), "{}").unwrap();

    let outcome = FixtureStore::new().persist(location.path(), no_order()).unwrap();
    assert_eq!(
        outcome,
        PersistOutcome::Deleted {
            dir_removed: true
        }
    );
    assert!(!location.dir().exists());
}

#[test]
fn empty_store_keeps_shared_folder() {
    let dir = tempfile::tempdir().unwrap();
    let location = FixtureLocation::resolve(&dir.path().join("api_test.rs"), "__nocks__");
    fs::create_dir_all(location.dir()).unwrap();
    fs::write(location.path(), "{}").unwrap();
    fs::write(location.dir().join("other_test.rs.json"), "{}").unwrap();

    let outcome = FixtureStore::new().persist(location.path(), no_order()).unwrap();
    assert_eq!(
        outcome,
        PersistOutcome::Deleted {
            dir_removed: false
        }
    );
    assert!(location.dir().join("other_test.rs.json").exists());
}

#[test]
fn empty_store_without_file_is_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = FixtureStore::new().persist(&dir.path().join("none.json"), no_order()).unwrap();
    assert_eq!(outcome, PersistOutcome::Unchanged);
}

#[test]
fn location_uses_sibling_folder() {
    let location = FixtureLocation::resolve(std::path::Path::new("tests/api_test.rs"), "__nocks__");
    assert_eq!(location.dir(), std::path::Path::new("tests/__nocks__"));
    assert_eq!(location.path(), std::path::Path::new("tests/__nocks__/api_test.rs.json"));
}
