//! Unit tests for the metadata projector.

use rstest::{fixture, rstest};
use serde_json::Value;
use tempfile::TempDir;

use super::*;

#[fixture]
fn metadata() -> PluginMetadata {
    PluginMetadata {
        id: String::from("acme.csv"),
        plugin_type: String::from("Connector"),
        version: String::from("1.2.3"),
        company_name: String::from("Acme"),
        description: Some(String::from("CSV connector")),
        authors: vec![String::from("Zoe"), String::from("Adam")],
        tags: vec![String::from("io"), String::from("csv")],
        category_id: String::from("Data"),
        ..PluginMetadata::default()
    }
}

#[rstest]
fn projection_is_indented_and_deterministic(metadata: PluginMetadata) {
    let first = project(&metadata).expect("project");
    let second = project(&metadata).expect("project");
    assert_eq!(first, second);

    let text = String::from_utf8(first).expect("utf-8");
    assert!(text.starts_with("{\n  \"id\": \"acme.csv\""), "got {text}");
}

#[rstest]
fn projection_preserves_sequence_order(metadata: PluginMetadata) {
    let bytes = project(&metadata).expect("project");
    let value: Value = serde_json::from_slice(&bytes).expect("parse");
    assert_eq!(value["authors"], serde_json::json!(["Zoe", "Adam"]));
    assert_eq!(value["tags"], serde_json::json!(["io", "csv"]));
    assert_eq!(value["type"], serde_json::json!("Connector"));
    assert_eq!(value["license"], Value::Null);
}

#[rstest]
fn save_overwrites_and_round_trips(metadata: PluginMetadata) {
    let dir = TempDir::new().expect("create temp dir");
    fs::write(dir.path().join(MANIFEST_FILE_NAME), "stale").expect("write stale manifest");

    let path = save(&metadata, dir.path()).expect("save");

    assert_eq!(path, dir.path().join(MANIFEST_FILE_NAME));
    assert_eq!(load(&path).expect("load"), metadata);
}

#[rstest]
fn load_reports_malformed_manifests() {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join(MANIFEST_FILE_NAME);
    fs::write(&path, "{\"id\": 3}").expect("write manifest");
    assert!(matches!(load(&path), Err(PackError::ParseManifest { .. })));
}
