//! Integration tests for meridian-store
//!
//! These tests exercise load/save against a real directory tree.

use meridian_domain::{Domain, DocumentStore, FieldPath, ViolationCode};
use meridian_store::{StoreError, YamlStore};
use serde_yaml::Value;
use std::fs;
use std::path::Path;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

const ALUMINUM: &str = r#"id: aluminum-laser-cleaning
name: Aluminum
category: metal
schemaVersion: '2.0'
relationships:
  contaminated_by:
  - id: rust-contamination
    title: Rust
    url: /contaminants/rust-contamination
"#;

#[test]
fn test_load_domain_documents() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "materials/metal/aluminum.yaml", ALUMINUM);
    write(dir.path(), "materials/steel.yml", "id: steel\nname: Steel\n");
    write(dir.path(), "materials/notes.md", "not a document");

    let store = YamlStore::open(dir.path()).unwrap();
    let outcome = store.load(Domain::Materials).unwrap();

    assert_eq!(outcome.documents.len(), 2);
    assert!(outcome.rejected.is_empty());
    let ids: Vec<&str> = outcome.documents.iter().map(|d| d.entity_id.as_str()).collect();
    assert!(ids.contains(&"aluminum-laser-cleaning"));
    assert!(ids.contains(&"steel"));
}

#[test]
fn test_missing_domain_directory_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = YamlStore::open(dir.path()).unwrap();
    let outcome = store.load(Domain::Compounds).unwrap();
    assert!(outcome.documents.is_empty());
}

#[test]
fn test_invalid_yaml_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "materials/good.yaml", "id: good\n");
    write(dir.path(), "materials/bad.yaml", "id: [unclosed\n");

    let store = YamlStore::open(dir.path()).unwrap();
    let err = store.load(Domain::Materials).unwrap_err();
    assert!(matches!(err, StoreError::CorpusParse { .. }));
    assert!(err.is_read_error());
}

#[test]
fn test_structural_failures_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "settings/list.yaml", "- just\n- a list\n");
    write(dir.path(), "settings/empty.yaml", "");
    write(dir.path(), "settings/a.yaml", "id: shared\n");
    write(dir.path(), "settings/b.yaml", "id: shared\n");
    write(dir.path(), "settings/ok.yaml", "id: ok\n");

    let store = YamlStore::open(dir.path()).unwrap();
    let outcome = store.load(Domain::Settings).unwrap();

    let ids: Vec<&str> = outcome.documents.iter().map(|d| d.entity_id.as_str()).collect();
    assert_eq!(ids, vec!["shared", "ok"]);
    assert_eq!(outcome.rejected.len(), 3);
    assert!(outcome
        .rejected
        .iter()
        .all(|v| v.code() == ViolationCode::MalformedDocument));
    assert!(outcome.rejected.iter().any(|v| v.description.contains("duplicate")));
}

#[test]
fn test_roundtrip_preserves_order_and_values() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "materials/aluminum.yaml", ALUMINUM);
    let store = YamlStore::open(dir.path()).unwrap();

    let before = store.load(Domain::Materials).unwrap().documents.remove(0);
    store.save(&before).unwrap();
    let after = store.load(Domain::Materials).unwrap().documents.remove(0);

    assert_eq!(before.fields, after.fields);
    let keys: Vec<&str> = after.fields.keys().filter_map(Value::as_str).collect();
    assert_eq!(
        keys,
        vec!["id", "name", "category", "schemaVersion", "relationships"]
    );
}

#[test]
fn test_save_writes_change_atomically() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "materials/aluminum.yaml", ALUMINUM);
    let store = YamlStore::open(dir.path()).unwrap();

    let mut doc = store.load(Domain::Materials).unwrap().documents.remove(0);
    let slug_path = FieldPath::parse("relationships.contaminated_by[0].slug");
    doc.set(&slug_path, Value::String("rust-contamination".into()))
        .unwrap();
    store.save(&doc).unwrap();

    let reloaded = store.load(Domain::Materials).unwrap().documents.remove(0);
    assert_eq!(
        reloaded.get(&slug_path),
        Some(&Value::String("rust-contamination".into()))
    );

    // No temp files left behind
    let leftovers: Vec<_> = fs::read_dir(dir.path().join("materials"))
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name() != "aluminum.yaml")
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_legacy_tags_normalized_and_never_written_back() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "compounds/alumina.yaml",
        r#"id: alumina
name: Alumina
properties: !!python/object/apply:collections.OrderedDict
- - - formula
    - Al2O3
  - - hazard
    - low
"#,
    );
    let store = YamlStore::open(dir.path()).unwrap();

    let doc = store.load(Domain::Compounds).unwrap().documents.remove(0);
    assert!(doc.has_artifacts());
    assert_eq!(doc.artifacts[0].path.to_string(), "properties");
    assert_eq!(
        doc.get(&FieldPath::parse("properties.formula")),
        Some(&Value::String("Al2O3".into()))
    );

    store.save(&doc).unwrap();
    let raw = fs::read_to_string(dir.path().join("compounds/alumina.yaml")).unwrap();
    assert!(!raw.contains("python"));

    let reloaded = store.load(Domain::Compounds).unwrap().documents.remove(0);
    assert!(!reloaded.has_artifacts());
    assert_eq!(reloaded.fields, doc.fields);
}

#[test]
fn test_legacy_ordered_dict_at_top_level() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "materials/toplevel.yaml",
        "!!python/object/apply:collections.OrderedDict\n- - - id\n    - steel\n  - - name\n    - Steel\n",
    );
    let store = YamlStore::open(dir.path()).unwrap();

    let outcome = store.load(Domain::Materials).unwrap();
    assert!(outcome.rejected.is_empty());
    let doc = &outcome.documents[0];
    assert_eq!(doc.entity_id.as_str(), "steel");
    assert_eq!(doc.artifacts.len(), 1);
    assert!(doc.artifacts[0].path.is_root());

    store.save(doc).unwrap();
    let raw = fs::read_to_string(dir.path().join("materials/toplevel.yaml")).unwrap();
    assert_eq!(raw, "id: steel\nname: Steel\n");
}

#[test]
fn test_flow_collection_tags_are_detected() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "materials/steel.yaml",
        "id: steel\ncoords: [!!python/tuple [1, 2]]\npair: !!python/tuple [1, !!python/tuple [2, 3]]\n",
    );
    let store = YamlStore::open(dir.path()).unwrap();

    let doc = store.load(Domain::Materials).unwrap().documents.remove(0);
    let paths: Vec<String> = doc.artifacts.iter().map(|a| a.path.to_string()).collect();
    assert_eq!(paths, vec!["coords[0]", "pair", "pair[1]"]);
}

#[test]
fn test_sequential_matches_parallel() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..20 {
        write(
            dir.path(),
            &format!("contaminants/c{:02}.yaml", i),
            &format!("id: c{:02}\nname: C{}\n", i, i),
        );
    }
    let parallel = YamlStore::open(dir.path()).unwrap();
    let sequential = parallel.clone().sequential();

    let a = parallel.load(Domain::Contaminants).unwrap();
    let b = sequential.load(Domain::Contaminants).unwrap();
    let ids_a: Vec<_> = a.documents.iter().map(|d| d.entity_id.clone()).collect();
    let ids_b: Vec<_> = b.documents.iter().map(|d| d.entity_id.clone()).collect();
    assert_eq!(ids_a, ids_b);
    assert_eq!(ids_a.len(), 20);
}
