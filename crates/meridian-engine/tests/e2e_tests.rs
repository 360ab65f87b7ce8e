//! End-to-end tests for the Meridian engine
//!
//! Each test builds a small YAML corpus in a temporary directory and runs the
//! batch operations against it through `YamlStore`.

use meridian_domain::{Domain, FieldPath, Severity, ViolationCode};
use meridian_engine::{Engine, EngineError, ExitStatus, Scope, SeverityThresholds};
use meridian_gatekeeper::SchemaRegistry;
use meridian_janitor::RepairConfig;
use meridian_store::{StoreError, YamlStore};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ALUMINUM: &str = r#"id: aluminum
name: Aluminum
schemaVersion: '2.0'
category: metal
relationships:
  contaminated_by:
    - id: rust-contamination
      title: Rust
      url: /contaminants/rust-contamination
  related_materials:
    - id: aluminum-laser-cleaning
      slug: wrong-value
      title: Aluminum laser cleaning
      url: /materials/aluminum-laser-cleaning
"#;

const LASER_CLEANING: &str = r#"id: aluminum-laser-cleaning
name: Aluminum laser cleaning
schemaVersion: '2.0'
category: process
"#;

const RUST: &str = r#"id: rust-contamination
name: Rust
schemaVersion: '1.0'
category: oxide
"#;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn corpus() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "materials/aluminum.yaml", ALUMINUM);
    write(dir.path(), "materials/aluminum-laser-cleaning.yaml", LASER_CLEANING);
    write(dir.path(), "contaminants/rust-contamination.yaml", RUST);
    dir
}

fn engine(dir: &TempDir) -> Engine<YamlStore> {
    Engine::open(dir.path(), SchemaRegistry::builtin()).unwrap()
}

fn read(root: &Path, relative: &str) -> Mapping {
    serde_yaml::from_str(&fs::read_to_string(root.join(relative)).unwrap()).unwrap()
}

fn value_at<'a>(map: &'a Mapping, path: &str) -> Option<&'a Value> {
    let mut current: Option<&Value> = None;
    for segment in FieldPath::parse(path).segments() {
        current = match (segment, current) {
            (meridian_domain::Segment::Key(k), None) => map.get(k.as_str()),
            (meridian_domain::Segment::Key(k), Some(Value::Mapping(m))) => m.get(k.as_str()),
            (meridian_domain::Segment::Index(i), Some(Value::Sequence(s))) => s.get(*i),
            _ => return None,
        };
    }
    current
}

#[test]
fn test_validate_reports_slug_problems() {
    let dir = corpus();
    let report = engine(&dir).validate(Scope::All).unwrap();

    assert_eq!(report.documents_checked, 3);
    assert_eq!(report.count(ViolationCode::MissingSlug), 1);
    assert_eq!(report.count(ViolationCode::SlugUrlMismatch), 1);
    assert_eq!(report.count(ViolationCode::DanglingReference), 0);
    assert_eq!(report.count(ViolationCode::MissingRequiredField), 0);
    assert_eq!(report.exit_status(&SeverityThresholds::default()), ExitStatus::Clean);
}

#[test]
fn test_missing_slug_scenario() {
    let dir = corpus();
    let engine = engine(&dir);

    let outcome = engine.repair(Scope::All, false).unwrap();
    assert!(outcome.fixed_point);
    assert_eq!(outcome.after.count(ViolationCode::MissingSlug), 0);

    let aluminum = read(dir.path(), "materials/aluminum.yaml");
    assert_eq!(
        value_at(&aluminum, "relationships.contaminated_by[0].slug"),
        Some(&Value::String("rust-contamination".to_string()))
    );
}

#[test]
fn test_wrong_slug_scenario() {
    let dir = corpus();
    let outcome = engine(&dir).repair(Scope::All, false).unwrap();

    let aluminum = read(dir.path(), "materials/aluminum.yaml");
    assert_eq!(
        value_at(&aluminum, "relationships.related_materials[0].slug"),
        Some(&Value::String("aluminum-laser-cleaning".to_string()))
    );
    assert_eq!(outcome.result.discrepancies.len(), 1);
    assert_eq!(outcome.result.discrepancies[0].original, "wrong-value");
    assert_eq!(outcome.after.count(ViolationCode::SlugUrlMismatch), 0);
}

#[test]
fn test_padded_slug_is_repaired() {
    let dir = corpus();
    write(
        dir.path(),
        "materials/aluminum.yaml",
        &ALUMINUM.replace("slug: wrong-value", "slug: ' aluminum-laser-cleaning '"),
    );
    let engine = engine(&dir);

    let report = engine.validate(Scope::All).unwrap();
    assert_eq!(report.count(ViolationCode::SlugUrlMismatch), 1);

    let outcome = engine.repair(Scope::All, false).unwrap();
    let aluminum = read(dir.path(), "materials/aluminum.yaml");
    assert_eq!(
        value_at(&aluminum, "relationships.related_materials[0].slug"),
        Some(&Value::String("aluminum-laser-cleaning".to_string()))
    );
    assert_eq!(
        outcome.result.discrepancies[0].original,
        " aluminum-laser-cleaning "
    );
    assert_eq!(outcome.after.count(ViolationCode::SlugUrlMismatch), 0);
}

#[test]
fn test_repair_is_idempotent() {
    let dir = corpus();
    let engine = engine(&dir);

    let first = engine.repair(Scope::All, false).unwrap();
    assert_eq!(first.result.documents_changed, 1);
    let snapshot = fs::read_to_string(dir.path().join("materials/aluminum.yaml")).unwrap();

    let second = engine.repair(Scope::All, false).unwrap();
    assert!(second.result.is_noop());
    assert!(second.fixed_point);
    assert_eq!(
        fs::read_to_string(dir.path().join("materials/aluminum.yaml")).unwrap(),
        snapshot
    );
}

#[test]
fn test_repair_preserves_unrelated_fields() {
    let dir = corpus();
    engine(&dir).repair(Scope::All, false).unwrap();

    let aluminum = read(dir.path(), "materials/aluminum.yaml");
    let keys: Vec<_> = aluminum.keys().filter_map(Value::as_str).collect();
    assert_eq!(keys, vec!["id", "name", "schemaVersion", "category", "relationships"]);
    assert_eq!(
        value_at(&aluminum, "relationships.contaminated_by[0].title"),
        Some(&Value::String("Rust".to_string()))
    );

    // Documents without violations are never rewritten
    assert_eq!(
        fs::read_to_string(dir.path().join("contaminants/rust-contamination.yaml")).unwrap(),
        RUST
    );
}

#[test]
fn test_dry_run_matches_real_run_without_writing() {
    let dir = corpus();
    let engine = engine(&dir);

    let dry = engine.repair(Scope::All, true).unwrap();
    assert!(dry.result.dry_run);
    assert!(!dry.fixed_point);
    assert_eq!(
        fs::read_to_string(dir.path().join("materials/aluminum.yaml")).unwrap(),
        ALUMINUM
    );

    let real = engine.repair(Scope::All, false).unwrap();
    assert_eq!(dry.result.documents_changed, real.result.documents_changed);
    assert_eq!(dry.result.violations_fixed, real.result.violations_fixed);
}

#[test]
fn test_dangling_references_survive_repair() {
    let dir = corpus();
    write(
        dir.path(),
        "materials/steel.yaml",
        r#"id: steel
name: Steel
schemaVersion: '2.0'
category: metal
relationships:
  contaminated_by:
    - id: unobtainium
      title: Unobtainium
      url: /contaminants/unobtainium
"#,
    );
    let engine = engine(&dir);

    let before = engine.validate(Scope::All).unwrap();
    assert_eq!(before.count(ViolationCode::DanglingReference), 1);
    assert_eq!(
        before.exit_status(&SeverityThresholds::default()),
        ExitStatus::ViolationsFound
    );

    for _ in 0..3 {
        let outcome = engine.repair(Scope::All, false).unwrap();
        assert_eq!(outcome.after.count(ViolationCode::DanglingReference), 1);
        assert!(outcome.after.total <= outcome.before.total);
    }

    // The slug was filled in, but the target was never fabricated
    let steel = read(dir.path(), "materials/steel.yaml");
    assert_eq!(
        value_at(&steel, "relationships.contaminated_by[0].slug"),
        Some(&Value::String("unobtainium".to_string()))
    );
    assert!(!dir.path().join("contaminants/unobtainium.yaml").exists());
}

#[test]
fn test_scoped_validation_resolves_other_domains() {
    let dir = corpus();
    let report = engine(&dir)
        .validate(Scope::Domain(Domain::Materials))
        .unwrap();

    assert_eq!(report.documents_checked, 2);
    assert_eq!(report.count(ViolationCode::DanglingReference), 0);
    assert!(report.violations.iter().all(|v| v.domain == Domain::Materials));
}

#[test]
fn test_many_documents_scenario() {
    let dir = TempDir::new().unwrap();
    for j in 0..8 {
        write(
            dir.path(),
            &format!("contaminants/target-{}.yaml", j),
            &format!("id: target-{j}\nname: Target {j}\nschemaVersion: '1.0'\ncategory: oxide\n"),
        );
    }

    let mut affected = 0;
    for i in 0..153 {
        let entries = match i {
            0..=58 => 8,
            59..=119 => 7,
            _ => 0,
        };
        if entries > 0 {
            affected += 1;
        }
        let mut yaml = format!(
            "id: material-{i}\nname: Material {i}\nschemaVersion: '2.0'\ncategory: metal\nrelationships:\n  contaminated_by:\n"
        );
        for j in 0..entries {
            yaml.push_str(&format!(
                "    - id: target-{j}\n      title: Target {j}\n      url: /contaminants/target-{j}\n"
            ));
        }
        if entries == 0 {
            yaml.push_str(
                "    - id: target-0\n      slug: target-0\n      title: Target 0\n      url: /contaminants/target-0\n",
            );
        }
        write(dir.path(), &format!("materials/material-{}.yaml", i), &yaml);
    }

    let engine = Engine::open(dir.path(), SchemaRegistry::builtin())
        .unwrap()
        .with_repair_config(RepairConfig {
            workers: 4,
            ..RepairConfig::default()
        });

    let before = engine.validate(Scope::All).unwrap();
    assert_eq!(before.count(ViolationCode::MissingSlug), 899);

    let outcome = engine.repair(Scope::All, false).unwrap();
    assert_eq!(outcome.result.documents_changed, affected);
    assert_eq!(outcome.result.documents_changed, 120);
    assert_eq!(outcome.result.fixed(ViolationCode::MissingSlug), 899);
    assert_eq!(outcome.after.count(ViolationCode::MissingSlug), 0);
    assert!(outcome.fixed_point);
}

#[test]
fn test_malformed_document_is_isolated() {
    let dir = corpus();
    write(dir.path(), "materials/list.yaml", "- not\n- a mapping\n");

    let report = engine(&dir).validate(Scope::All).unwrap();
    assert_eq!(report.count(ViolationCode::MalformedDocument), 1);
    assert_eq!(report.documents_checked, 3);
    assert_eq!(report.count_severity(Severity::Critical), 1);
}

#[test]
fn test_unparseable_file_is_fatal() {
    let dir = corpus();
    write(dir.path(), "compounds/broken.yaml", "id: [unclosed\n");

    let err = engine(&dir).validate(Scope::All).unwrap_err();
    assert!(matches!(err, EngineError::Store(_)));
    assert!(err.is_read_error());
    assert!(matches!(
        err.store_error(),
        Some(StoreError::CorpusParse { .. })
    ));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = TempDir::new().unwrap();
    let result = Engine::open(dir.path().join("nope"), SchemaRegistry::builtin());
    let err = result.err().unwrap();
    assert!(matches!(err, EngineError::Open(_)));
    assert!(err.is_read_error());
}

#[test]
fn test_legacy_tags_are_rewritten_portably() {
    let dir = corpus();
    write(
        dir.path(),
        "compounds/iron-oxide.yaml",
        r#"id: iron-oxide
name: Iron oxide
schemaVersion: '1.0'
chemicalFormula: Fe2O3
hazards: !!python/object/apply:collections.OrderedDict
- - - inhalation
    - moderate
"#,
    );
    let engine = engine(&dir);

    let before = engine.validate(Scope::Domain(Domain::Compounds)).unwrap();
    assert_eq!(before.count(ViolationCode::SerializationArtifact), 1);

    let outcome = engine.repair(Scope::Domain(Domain::Compounds), false).unwrap();
    assert_eq!(outcome.after.count(ViolationCode::SerializationArtifact), 0);

    let written = fs::read_to_string(dir.path().join("compounds/iron-oxide.yaml")).unwrap();
    assert!(!written.contains("!!python"));
    let iron = read(dir.path(), "compounds/iron-oxide.yaml");
    assert_eq!(
        value_at(&iron, "hazards.inhalation"),
        Some(&Value::String("moderate".to_string()))
    );
}

#[test]
fn test_score_coverage_is_exact() {
    let dir = TempDir::new().unwrap();
    for i in 0..8 {
        let casing = if i < 3 { "casNumber: 7732-18-5\n" } else { "" };
        write(
            dir.path(),
            &format!("compounds/c{}.yaml", i),
            &format!("id: c{i}\nname: C{i}\nschemaVersion: '1.0'\nchemicalFormula: H2O\n{casing}"),
        );
    }

    let table = engine(&dir).score(Scope::Domain(Domain::Compounds)).unwrap();
    let row = table.row(Domain::Compounds, "casNumber").unwrap();
    assert_eq!(row.present_count, 3);
    assert_eq!(row.total_count, 8);
    assert!((row.coverage_ratio - 3.0 / 8.0).abs() < f64::EPSILON);
    assert_eq!(table.documents.len(), 8);
    assert_eq!(table.failing().count(), 0);
}

#[test]
fn test_missing_required_field_fails_completeness() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "compounds/full.yaml",
        "id: full\nname: Full\nschemaVersion: '1.0'\nchemicalFormula: CO2\n",
    );
    write(
        dir.path(),
        "compounds/partial.yaml",
        "id: partial\nname: Partial\nschemaVersion: '1.0'\n",
    );

    let table = engine(&dir).score(Scope::All).unwrap();
    let score = |id: &str| {
        table
            .documents
            .iter()
            .find(|s| s.key.entity_id.as_str() == id)
            .unwrap()
            .clone()
    };
    let full = score("full");
    let partial = score("partial");
    assert!(partial.missing_required_fields.contains("chemicalFormula"));
    assert!(partial.confidence_score < full.confidence_score);
    assert!(!partial.passed());
    assert_eq!(table.failing().count(), 1);
}

#[test]
fn test_report_serializes_to_json() {
    let dir = corpus();
    let report = engine(&dir).validate(Scope::All).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["scope"], "all");
    assert_eq!(json["total"], 2);
    assert_eq!(json["by_kind"]["MissingSlug"], 1);
    assert_eq!(json["by_domain"]["materials"]["SlugUrlMismatch"], 1);
    assert_eq!(json["violations"][0]["kind"], "MissingSlug");
}
