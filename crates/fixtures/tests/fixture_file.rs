/// Integration tests for parsing fixture files and building forges from them.

use std::fs;

use serde_json::json;
use tempfile::TempDir;

use forge_core::{CallbackRegistry, OverrideEngine, Query, SuppressionPolicy};
use forge_fixtures::{FixtureFile, Forge, ForgeKind, ForgeOptions, MemoryStore, StaticResolver};

const FIXTURE_YAML: &str = r#"
forges:
  - forge_id: projects
    dynamodb:
      table: { name: projects-table }
      primary_key_names: [PK]
      items:
        - tags: { type: project, tests: [test_1, test_2] }
          data: { PK: "", name: "{} project", members: [{ id: "" }, { id: "" }] }
        - tags: { type: archive }
          data: { PK: "", name: "{} archive", members: [] }
  - forge_id: reports
    s3:
      bucket: { name: reports-bucket }
      s3_objects:
        - key: summary.txt
          tags: { type: text }
          data: { text: hello }
overrides:
  - key_paths: [data.PK, data.members.id]
    override_type: CALL_FUNCTION
    override: uuid
    forge_id: projects
  - key_paths: data.name
    override_type: FORMAT_VALUE
    override: [Avengers]
    forge_id: projects
  - key_paths: key
    override_type: REPLACE_VALUE
    override: renamed.txt
    forge_id: reports
"#;

fn parse() -> FixtureFile {
    FixtureFile::parse(FIXTURE_YAML, &CallbackRegistry::with_builtins()).unwrap()
}

#[test]
fn parses_forges_and_overrides() {
    let fixture = parse();
    let ids: Vec<&str> = fixture.forge_ids().collect();
    assert_eq!(ids, ["projects", "reports"]);
    assert_eq!(fixture.overrides.len(), 3);
    assert!(matches!(fixture.forge("projects").unwrap().kind, ForgeKind::DynamoDb(_)));
    assert_eq!(fixture.forge("reports").unwrap().kind.name(), "s3");
    assert!(fixture.forge("missing").is_none());
}

#[test]
fn builds_table_forge_with_scoped_rules() {
    let fixture = parse();
    let resolver = StaticResolver::new();
    let options = ForgeOptions::new(&resolver)
        .with_engine(OverrideEngine::new(SuppressionPolicy::Raise))
        .with_overrides(&fixture.overrides);

    let forge = fixture.forge("projects").unwrap().build(&options).unwrap();
    let data = forge.get_data(None).unwrap();

    assert_eq!(data[0]["data"]["name"], json!("Avengers project"));
    assert_eq!(data[1]["data"]["name"], json!("Avengers archive"));

    let pk0 = data[0]["data"]["PK"].as_str().unwrap();
    let pk1 = data[1]["data"]["PK"].as_str().unwrap();
    assert_eq!(pk0.len(), 36);
    assert_ne!(pk0, pk1);

    let members = data[0]["data"]["members"].as_array().unwrap();
    assert_ne!(members[0]["id"], members[1]["id"]);

    let keys = forge.keys_value();
    assert_eq!(keys, json!([{"PK": pk0}, {"PK": pk1}]));

    let query = Query::from_value(&json!({"StringEquals": {"type": "project"}})).unwrap();
    assert_eq!(forge.get_data(Some(&query)).unwrap().len(), 1);
}

#[test]
fn builds_bucket_forge_and_loads() {
    let fixture = parse();
    let resolver = StaticResolver::new();
    let options = ForgeOptions::new(&resolver)
        .with_engine(OverrideEngine::new(SuppressionPolicy::Raise))
        .with_overrides(&fixture.overrides);

    let forge = fixture.forge("reports").unwrap().build(&options).unwrap();
    assert!(matches!(forge, Forge::S3(_)));
    assert_eq!(forge.forge_id(), "reports");
    assert_eq!(forge.keys_value(), json!(["renamed.txt"]));

    let mut store = MemoryStore::new();
    forge.load_data(&mut store).unwrap();
    assert_eq!(store.object("reports-bucket", "renamed.txt"), Some(&b"hello"[..]));
    forge.cleanup_data(&mut store).unwrap();
    assert_eq!(store.object_count("reports-bucket"), 0);
}

#[test]
fn loads_from_disk() {
    let dir = TempDir::new().expect("create tempdir");
    let path = dir.path().join("fixtures.yml");
    fs::write(&path, FIXTURE_YAML).unwrap();

    let fixture = FixtureFile::load(&path, &CallbackRegistry::with_builtins()).unwrap();
    assert_eq!(fixture.forges.len(), 2);
}

#[test]
fn entry_needs_exactly_one_kind() {
    let registry = CallbackRegistry::new();
    for yaml in [
        "forges:\n  - forge_id: a\n    invalid: {}\n",
        "forges:\n  - forge_id: a\n    s3: {}\n    dynamodb: {}\n",
    ] {
        let err = FixtureFile::parse(yaml, &registry).unwrap_err();
        assert!(
            err.to_string()
                .contains("can only have one of the following per config: dynamodb, s3"),
            "{err}"
        );
    }
}

#[test]
fn unknown_callback_in_file_fails() {
    let yaml = "overrides:\n  - key_paths: id\n    override_type: CALL_FUNCTION\n    override: nope\n";
    let err = FixtureFile::parse(yaml, &CallbackRegistry::with_builtins()).unwrap_err();
    assert_eq!(err.to_string(), "no callback registered under the name 'nope'");
}

#[test]
fn empty_document_sections_are_optional() {
    let fixture = FixtureFile::parse("forges: []\n", &CallbackRegistry::new()).unwrap();
    assert!(fixture.forges.is_empty());
    assert!(fixture.overrides.is_empty());
}
