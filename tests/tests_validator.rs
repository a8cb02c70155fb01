#![allow(clippy::unwrap_used)]
use declxmi::{GeneratorConfig, ProfileTable, generate, parse_input, validate_file};

use std::fs;

#[test]
fn test_generated_document_validates_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("model.xmi");
    let layout_path = dir.path().join("layout.xml");

    let input = parse_input(
        r#"{"elements":[
            {"qualified_name":"app::Window","members":[
                {"name":"frames","type":"std::vector<app::Frame>"},
                {"name":"title","type":"std::string"}
            ]},
            {"qualified_name":"app::Frame","members":[{"name":"parent","type":"app::Window*"}]}
        ]}"#,
    )
    .unwrap();
    let profiles = ProfileTable::builtin();
    generate(
        &input,
        &profiles,
        &GeneratorConfig::default(),
        &model_path,
        &layout_path,
    )
    .unwrap();

    let unresolved = validate_file(&model_path).unwrap();
    assert!(unresolved.is_empty(), "dangling refs: {unresolved:?}");
}

#[test]
fn test_tampered_document_reports_each_dangling_reference() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("model.xmi");
    let layout_path = dir.path().join("layout.xml");

    let input = parse_input(
        r#"{"elements":[
            {"name":"A","members":[{"name":"b","type":"B"}]},
            {"name":"B"}
        ]}"#,
    )
    .unwrap();
    let profiles = ProfileTable::builtin();
    generate(
        &input,
        &profiles,
        &GeneratorConfig::default(),
        &model_path,
        &layout_path,
    )
    .unwrap();

    // Break one reference and confirm the validator pins it down.
    let doc = fs::read_to_string(&model_path).unwrap();
    let b_id = declxmi::model::stable_id(&["element", "B"]).to_string();
    let broken = doc.replacen(&format!("type=\"{b_id}\""), "type=\"id-gone\"", 1);
    assert_ne!(doc, broken, "expected a type reference to rewrite");
    fs::write(&model_path, broken).unwrap();

    let unresolved = validate_file(&model_path).unwrap();
    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].attribute, "type");
    assert_eq!(unresolved[0].value, "id-gone");
    assert!(unresolved[0].context.contains('b'));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = validate_file(std::path::Path::new("/nonexistent/never.xmi"));
    assert!(err.is_err());
}
