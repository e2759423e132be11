//! Template generation against files on disk

use pretty_assertions::assert_eq;
use sheetfill::prelude::*;
use sheetfill_xlsx::testing::TemplateBuilder;

fn write_template(dir: &std::path::Path) -> std::path::PathBuf {
    let template = TemplateBuilder::new()
        .sheet("Sheet1", r#"<row r="1"><c r="A1" s="1"/></row>"#)
        .defined_name("rngFirstName", "Sheet1!$B$3")
        .build()
        .unwrap();
    let path = dir.join("Templates").join("blank.xlsx");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, template).unwrap();
    path
}

#[test]
fn test_generate_persists_request_scoped_output() {
    let tmp = tempfile::tempdir().unwrap();
    let template = write_template(tmp.path());
    let template_before = std::fs::read(&template).unwrap();
    let output_dir = tmp.path().join("Generated_Excels");

    let generator =
        TemplateGenerator::new(GeneratorConfig::new(&template).with_output_dir(&output_dir));
    let bindings = FieldBindings::new()
        .with("rngFirstName", "Jane")
        .with("rngMissing", "ignored");

    let generated = generator.generate(&bindings, Some("req-7")).unwrap();

    assert_eq!(generated.request_id, "req-7");
    assert!(generated.file_name.starts_with("Excel_"));
    assert!(generated.file_name.ends_with("_req-7.xlsx"));
    // Excel_ + yyyyMMdd_HHmmss + _req-7.xlsx
    assert_eq!(generated.file_name.len(), "Excel_".len() + 15 + "_req-7.xlsx".len());

    let path = generated.output_path.clone().unwrap();
    assert_eq!(path, output_dir.join(&generated.file_name));
    assert_eq!(std::fs::read(&path).unwrap(), generated.bytes);

    assert_eq!(generated.report.written, vec!["rngFirstName"]);
    assert_eq!(generated.report.skipped.len(), 1);
    assert_eq!(generated.report.skipped[0].key, "rngMissing");

    // The template itself is never modified.
    assert_eq!(std::fs::read(&template).unwrap(), template_before);

    let mut doc = Document::open(&path).unwrap();
    assert_eq!(
        doc.cell_text(0, &CellAddress::parse("B3").unwrap())
            .unwrap()
            .as_deref(),
        Some("Jane")
    );
}

#[test]
fn test_generated_request_ids_are_unique() {
    let tmp = tempfile::tempdir().unwrap();
    let template = write_template(tmp.path());
    let generator =
        TemplateGenerator::new(GeneratorConfig::new(&template).with_output_dir(tmp.path()));
    let bindings = FieldBindings::new().with("A1", "x");

    let first = generator.generate(&bindings, None).unwrap();
    let second = generator.generate(&bindings, None).unwrap();

    assert_eq!(first.request_id.len(), 36);
    assert_ne!(first.request_id, second.request_id);
    assert_ne!(first.output_path, second.output_path);
    assert!(first.output_path.unwrap().exists());
    assert!(second.output_path.unwrap().exists());
}

#[test]
fn test_generate_in_memory() {
    let tmp = tempfile::tempdir().unwrap();
    let template = write_template(tmp.path());
    let generator = TemplateGenerator::new(GeneratorConfig::new(&template));

    let generated = generator
        .generate(&FieldBindings::new().with("A1", "x"), Some("mem"))
        .unwrap();

    assert_eq!(generated.output_path, None);
    let mut doc = Document::from_bytes(generated.bytes).unwrap();
    let a1 = CellAddress::parse("A1").unwrap();
    assert_eq!(doc.cell_text(0, &a1).unwrap().as_deref(), Some("x"));
    let cell = doc.worksheet_mut(0).unwrap().cell(&a1).unwrap();
    assert_eq!(cell.attribute("s"), Some("1"));
}

#[test]
fn test_rejects_unsafe_request_id() {
    let tmp = tempfile::tempdir().unwrap();
    let template = write_template(tmp.path());
    let generator =
        TemplateGenerator::new(GeneratorConfig::new(&template).with_output_dir(tmp.path()));

    assert!(matches!(
        generator.generate(&FieldBindings::new(), Some("../escape")),
        Err(Error::InvalidRequestId(_))
    ));
}

#[cfg(feature = "serde")]
#[test]
fn test_bindings_and_config_from_json() {
    let bindings: FieldBindings =
        serde_json::from_str(r#"{"rngFirstName": "Jane", "E7": null, "D5": 12}"#).unwrap();
    assert_eq!(bindings.get("rngfirstname"), Some(Some("Jane")));
    assert_eq!(bindings.get("E7"), Some(None));
    assert_eq!(bindings.get("D5"), Some(Some("12")));

    let config: GeneratorConfig = serde_json::from_str(
        r#"{"template": "t.xlsx", "options": {"layout": {"row_placement": "sorted"}}}"#,
    )
    .unwrap();
    assert_eq!(config.output_dir, None);
    assert_eq!(config.options.layout.row_placement, RowPlacement::Sorted);
    assert_eq!(config.options.layout.cell_ordering, CellOrdering::Lexical);
}
