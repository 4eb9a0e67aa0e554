use super::*;

use std::path::PathBuf;

use shared::error::ConfigErrorKind;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn missing_file_reports_not_found_and_empty_tree() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("Data").join("cmd.json");

    let err = load(&path).expect_err("missing");
    assert_eq!(err.kind, ConfigErrorKind::NotFound);
    assert_eq!(err.path, path);

    let report = ConfigLoader::default().load_lenient(&path);
    assert!(report.tree.is_empty());
    assert_eq!(
        report.warning.map(|w| w.kind),
        Some(ConfigErrorKind::NotFound)
    );
}

#[test]
fn empty_path_is_reported_before_touching_disk() {
    let err = load("").expect_err("empty path");
    assert_eq!(err.kind, ConfigErrorKind::EmptyPath);
}

#[test]
fn malformed_json_is_parse_failure_with_detail() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(&dir, "cmd.json", r#"{"Network": {"Enable WiFi": "#);

    let err = load(&path).expect_err("malformed");
    assert_eq!(err.kind, ConfigErrorKind::ParseFailure);
    assert!(err.detail.as_deref().is_some_and(|d| d.starts_with("json:")));

    let report = ConfigLoader::default().load_lenient(&path);
    assert!(report.tree.is_empty());
}

#[test]
fn shape_violation_discards_whole_tree() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(
        &dir,
        "cmd.json",
        r#"{"Good": {"a": "shell a"}, "Bad": {"b": 7}}"#,
    );

    let report = ConfigLoader::default().load_lenient(&path);
    assert!(report.tree.is_empty());
    assert_eq!(
        report.warning.map(|w| w.kind),
        Some(ConfigErrorKind::ParseFailure)
    );
}

#[test]
fn malformed_xml_is_parse_failure() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(&dir, "cmd.xml", "<root><tab name=\"x\"><a>ls</tab></root>");

    let err = load(&path).expect_err("malformed");
    assert_eq!(err.kind, ConfigErrorKind::ParseFailure);
}

#[test]
fn picks_schema_by_extension_then_content() {
    let dir = TempDir::new().expect("tempdir");
    let xml_path = write(&dir, "commands.cfg", "<r><t><a>ls</a></t></r>");
    let json_path = write(&dir, "commands.txt", r#"{"t": {"a": "ls"}}"#);

    assert_eq!(load(&xml_path).expect("xml").action_count(), 1);
    assert_eq!(load(&json_path).expect("json").action_count(), 1);

    let forced = ConfigLoader::new(SchemaHint::Json).load(&xml_path);
    assert_eq!(
        forced.expect_err("forced json").kind,
        ConfigErrorKind::ParseFailure
    );
}

#[test]
fn blank_file_is_a_parse_failure_with_empty_tree() {
    let dir = TempDir::new().expect("tempdir");
    let blank = write(&dir, "cmd.json", "  \n");
    let err = load(&blank).expect_err("blank");
    assert_eq!(err.kind, ConfigErrorKind::ParseFailure);
    assert_eq!(err.detail.as_deref(), Some("document is empty"));

    let zero = write(&dir, "cmd.xml", "");
    let report = ConfigLoader::default().load_lenient(&zero);
    assert!(report.tree.is_empty());
    assert_eq!(
        report.warning.map(|w| w.kind),
        Some(ConfigErrorKind::ParseFailure)
    );
}

#[test]
fn byte_order_mark_is_ignored() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(&dir, "cmd.json", "\u{feff}{\"t\": {\"a\": \"ls\"}}");
    assert_eq!(load(&path).expect("bom").action_count(), 1);
}

#[test]
fn directory_path_is_unreadable() {
    let dir = TempDir::new().expect("tempdir");
    let err = load(dir.path()).expect_err("directory");
    assert_eq!(err.kind, ConfigErrorKind::Unreadable);
}

#[test]
fn parses_schema_hints() {
    assert_eq!("XML".parse::<SchemaHint>(), Ok(SchemaHint::Xml));
    assert_eq!(" json ".parse::<SchemaHint>(), Ok(SchemaHint::Json));
    assert_eq!("".parse::<SchemaHint>(), Ok(SchemaHint::Auto));
    assert!("yaml".parse::<SchemaHint>().is_err());
}
