//! Schema registry invariants:
//! - load followed by resolve returns exactly the loaded definition
//! - versionless resolve returns the highest registered version
//! - a load is all-or-nothing; a failed load never disturbs the
//!   serving snapshot
//! - sub-schema references are inlined at load time

use std::fs;
use std::path::Path;

use docgate::schema::{FieldKind, SchemaRegistry};
use tempfile::TempDir;

fn write_schema(dir: &Path, file: &str, body: &str) {
    fs::write(dir.join(file), body).unwrap();
}

fn user_schema_json(version: u32) -> String {
    format!(
        r#"{{
            "name": "user",
            "version": {},
            "fields": {{
                "name": {{ "type": "string", "required": true }},
                "age": {{ "type": "int", "minimum": 0, "required": false }}
            }}
        }}"#,
        version
    )
}

#[test]
fn load_then_resolve_returns_exact_definition() {
    let tmp = TempDir::new().unwrap();
    write_schema(tmp.path(), "user_v1.json", &user_schema_json(1));

    let registry = SchemaRegistry::new();
    assert_eq!(registry.load(tmp.path()).unwrap(), 1);

    let schema = registry.resolve("user", Some(1)).unwrap();
    assert_eq!(schema.key(), ("user", 1));
    assert!(schema.fields["name"].required);
}

#[test]
fn versionless_resolve_returns_highest_version() {
    let tmp = TempDir::new().unwrap();
    write_schema(tmp.path(), "user_v1.json", &user_schema_json(1));
    write_schema(tmp.path(), "user_v2.json", &user_schema_json(2));

    let registry = SchemaRegistry::new();
    registry.load(tmp.path()).unwrap();

    assert_eq!(registry.resolve("user", None).unwrap().version, 2);
    // Explicit versions still resolve.
    assert_eq!(registry.resolve("user", Some(1)).unwrap().version, 1);
}

#[test]
fn unknown_type_and_version_are_distinct_failures() {
    let tmp = TempDir::new().unwrap();
    write_schema(tmp.path(), "user_v1.json", &user_schema_json(1));

    let registry = SchemaRegistry::new();
    registry.load(tmp.path()).unwrap();

    let unknown_type = registry.resolve("order", None).unwrap_err();
    assert!(unknown_type.message().contains("order"));

    let unknown_version = registry.resolve("user", Some(7)).unwrap_err();
    assert!(unknown_version.message().contains("version 7"));
}

#[test]
fn duplicate_identity_discards_whole_load() {
    let tmp = TempDir::new().unwrap();
    write_schema(tmp.path(), "a.json", &user_schema_json(1));
    write_schema(tmp.path(), "b.json", &user_schema_json(1));

    let registry = SchemaRegistry::new();
    assert!(registry.load(tmp.path()).is_err());
    assert!(registry.snapshot().is_empty());
}

#[test]
fn failed_reload_keeps_previous_snapshot_serving() {
    let tmp = TempDir::new().unwrap();
    write_schema(tmp.path(), "user_v1.json", &user_schema_json(1));

    let registry = SchemaRegistry::new();
    registry.load(tmp.path()).unwrap();

    // Break the directory, then reload.
    write_schema(tmp.path(), "broken.json", "not json at all");
    assert!(registry.load(tmp.path()).is_err());

    // Readers still see the previous, consistent snapshot.
    assert!(registry.resolve("user", Some(1)).is_ok());
    assert_eq!(registry.snapshot().len(), 1);

    // A repaired directory replaces it wholesale.
    fs::remove_file(tmp.path().join("broken.json")).unwrap();
    write_schema(tmp.path(), "user_v2.json", &user_schema_json(2));
    assert_eq!(registry.load(tmp.path()).unwrap(), 2);
    assert_eq!(registry.resolve("user", None).unwrap().version, 2);
}

#[test]
fn snapshot_taken_before_reload_is_immutable() {
    let tmp = TempDir::new().unwrap();
    write_schema(tmp.path(), "user_v1.json", &user_schema_json(1));

    let registry = SchemaRegistry::new();
    registry.load(tmp.path()).unwrap();
    let snapshot = registry.snapshot();

    write_schema(tmp.path(), "user_v2.json", &user_schema_json(2));
    registry.load(tmp.path()).unwrap();

    // The earlier snapshot still answers as it did when taken.
    assert_eq!(snapshot.latest_version("user"), Some(1));
    assert_eq!(registry.snapshot().latest_version("user"), Some(2));
}

#[test]
fn sub_schema_references_inline_at_load_time() {
    let tmp = TempDir::new().unwrap();
    write_schema(
        tmp.path(),
        "order_v1.json",
        r#"{
            "name": "order",
            "version": 1,
            "fields": {
                "shipping": { "type": "ref", "name": "address", "required": true },
                "billing": { "type": "ref", "name": "address", "required": false }
            },
            "definitions": {
                "address": {
                    "city": { "type": "string", "required": true },
                    "zip": { "type": "string", "required": true }
                }
            }
        }"#,
    );

    let registry = SchemaRegistry::new();
    registry.load(tmp.path()).unwrap();

    let schema = registry.resolve("order", None).unwrap();
    match &schema.fields["shipping"].kind {
        FieldKind::Object { fields } => {
            assert!(fields.contains_key("city"));
            assert!(fields.contains_key("zip"));
        }
        other => panic!("expected inlined object, got {:?}", other),
    }
    assert!(schema.definitions.is_empty());
}

#[test]
fn dangling_reference_fails_the_load() {
    let tmp = TempDir::new().unwrap();
    write_schema(
        tmp.path(),
        "order_v1.json",
        r#"{
            "name": "order",
            "version": 1,
            "fields": {
                "shipping": { "type": "ref", "name": "address", "required": true }
            }
        }"#,
    );

    let registry = SchemaRegistry::new();
    let err = registry.load(tmp.path()).unwrap_err();
    assert!(err.message().contains("address"));
    assert!(registry.snapshot().is_empty());
}

#[test]
fn non_json_files_are_ignored() {
    let tmp = TempDir::new().unwrap();
    write_schema(tmp.path(), "user_v1.json", &user_schema_json(1));
    write_schema(tmp.path(), "README.md", "# schemas");
    write_schema(tmp.path(), "backup.json.bak", "garbage");

    let registry = SchemaRegistry::new();
    assert_eq!(registry.load(tmp.path()).unwrap(), 1);
}
