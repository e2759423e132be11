//! End-to-end fills: bindings -> template -> saved package -> verify

mod common;

use common::sheet_xml;
use pretty_assertions::assert_eq;
use sheetfill::prelude::*;
use sheetfill::{fill_package, CoreError, SkipReason, SkippedBinding, XlsxError};
use sheetfill_xlsx::testing::{without_part, TemplateBuilder};

fn intake_template() -> Vec<u8> {
    TemplateBuilder::new()
        .sheet(
            "Intake",
            r#"<row r="5"><c r="A5" t="s"><v>0</v></c><c r="D5" t="s"><v>1</v></c></row><row r="11"><c r="F11" s="4"/></row>"#,
        )
        .sheet("Client Info", "")
        .shared_strings(&["Print area", "Keep me"])
        .defined_name("rngFirstName", "Intake!$F$11:$F$13")
        .defined_name("rngLastName", "Intake!$G$11")
        .defined_name("rngBirthdate", "'Client Info'!$C$4")
        .build()
        .unwrap()
}

fn text(package: &[u8], sheet: usize, cell: &str) -> Option<String> {
    let mut doc = Document::from_bytes(package.to_vec()).unwrap();
    doc.cell_text(sheet, &CellAddress::parse(cell).unwrap())
        .unwrap()
}

#[test]
fn test_direct_and_named_bindings() {
    let bindings = FieldBindings::new()
        .with("rngFirstName", "Jane")
        .with("rngLastName", "Doe")
        .with("E7", "Acme Health")
        .with("rngBirthdate", "1990-01-01");

    let (out, report) = fill_package(intake_template(), &bindings, &FillOptions::default()).unwrap();

    assert_eq!(
        report.written,
        vec!["rngFirstName", "rngLastName", "E7", "rngBirthdate"]
    );
    assert!(report.is_complete());

    // Range reference reduced to its first cell.
    assert_eq!(text(&out, 0, "F11").as_deref(), Some("Jane"));
    assert_eq!(text(&out, 0, "F12"), None);
    assert_eq!(text(&out, 0, "G11").as_deref(), Some("Doe"));
    // Direct cell tokens always land on the first sheet.
    assert_eq!(text(&out, 0, "E7").as_deref(), Some("Acme Health"));
    // Quoted sheet name in the reference.
    assert_eq!(text(&out, 1, "C4").as_deref(), Some("1990-01-01"));
}

#[test]
fn test_unknown_name_does_not_stop_later_bindings() {
    let bindings = FieldBindings::new().with("rngMissing", "x").with("E7", "y");

    let (out, report) = fill_package(intake_template(), &bindings, &FillOptions::default()).unwrap();

    assert_eq!(report.written, vec!["E7"]);
    assert_eq!(
        report.skipped,
        vec![SkippedBinding {
            key: "rngMissing".into(),
            reason: SkipReason::Unresolved(CoreError::NameNotFound(
                "rngMissing".into()
            )),
        }]
    );
    assert_eq!(text(&out, 0, "E7").as_deref(), Some("y"));
}

#[test]
fn test_name_lookup_ignores_case() {
    let bindings = FieldBindings::new().with("rngfirstname", "Jane");
    let (out, report) = fill_package(intake_template(), &bindings, &FillOptions::default()).unwrap();

    assert!(report.is_complete());
    assert_eq!(text(&out, 0, "F11").as_deref(), Some("Jane"));
}

#[test]
fn test_lowercase_cell_token_is_normalized() {
    let bindings = FieldBindings::new().with("e7", "lower");
    let (out, _) = fill_package(intake_template(), &bindings, &FillOptions::default()).unwrap();

    assert!(sheet_xml(&out, 1).contains(r#"<c r="E7" t="inlineStr">"#));
    assert_eq!(text(&out, 0, "E7").as_deref(), Some("lower"));
}

#[test]
fn test_blank_values_leave_template_untouched() {
    let template = intake_template();
    let mut bindings = FieldBindings::new();
    bindings.set("D5", Some(String::new()));
    bindings.set("rngLastName", Some("   ".into()));
    bindings.set("Z99", None);

    let (out, report) = fill_package(template.clone(), &bindings, &FillOptions::default()).unwrap();

    assert_eq!(report.blank, vec!["D5", "rngLastName", "Z99"]);
    assert!(report.written.is_empty());
    assert_eq!(text(&out, 0, "D5").as_deref(), Some("Keep me"));
    // Nothing modified, so the worksheet is copied as-is.
    assert_eq!(sheet_xml(&out, 1), sheet_xml(&template, 1));
}

#[test]
fn test_blank_value_does_not_load_sheet() {
    // The first sheet's relationship points at a part the package lacks.
    let template = TemplateBuilder::new()
        .sheet("Sheet1", "")
        .build()
        .unwrap();
    let template = without_part(&template, "xl/worksheets/sheet1.xml").unwrap();

    let mut bindings = FieldBindings::new();
    bindings.set("E7", Some(String::new()));
    bindings.set("B2", None);
    let (_, report) = fill_package(template.clone(), &bindings, &FillOptions::default()).unwrap();
    assert_eq!(report.blank, vec!["E7", "B2"]);
    assert!(report.written.is_empty());
    assert!(report.is_complete());

    // A real value still needs the sheet.
    let bindings = FieldBindings::new().with("E7", "x");
    assert!(matches!(
        fill_package(template, &bindings, &FillOptions::default()),
        Err(Error::Xlsx(XlsxError::MissingPart(_)))
    ));
}

#[test]
fn test_repeated_key_writes_one_cell() {
    let mut bindings = FieldBindings::new();
    bindings.set("E7", Some("first".into()));
    bindings.set("e7", Some("second".into()));
    assert_eq!(bindings.len(), 1);

    let mut doc = Document::from_bytes(intake_template()).unwrap();
    doc.fill(&bindings, &FillOptions::default()).unwrap();
    // A second pass over the same document must not duplicate anything.
    doc.fill(&bindings, &FillOptions::default()).unwrap();

    let out = doc.to_bytes().unwrap();
    let xml = sheet_xml(&out, 1);
    assert_eq!(xml.matches(r#"r="E7""#).count(), 1);
    assert_eq!(xml.matches(r#"<row r="7""#).count(), 1);
    assert_eq!(text(&out, 0, "E7").as_deref(), Some("second"));
}

#[test]
fn test_write_keeps_cell_style() {
    let bindings = FieldBindings::new().with("rngFirstName", "Jane");
    let (out, _) = fill_package(intake_template(), &bindings, &FillOptions::default()).unwrap();

    assert!(sheet_xml(&out, 1).contains(
        r#"<c r="F11" s="4" t="inlineStr"><is><t xml:space="preserve">Jane</t></is></c>"#
    ));
}

#[test]
fn test_unresolvable_bindings_are_reported() {
    let template = TemplateBuilder::new()
        .sheet("Sheet1", "")
        .defined_name("rngGone", "'Old Sheet'!$A$1")
        .defined_name("rngBroken", "#REF!")
        .build()
        .unwrap();
    let bindings = FieldBindings::new()
        .with("rngGone", "a")
        .with("rngBroken", "b")
        .with("A0", "c")
        .with("B2", "d");

    let (out, report) = fill_package(template, &bindings, &FillOptions::default()).unwrap();

    assert_eq!(report.written, vec!["B2"]);
    let reasons: Vec<_> = report
        .skipped
        .iter()
        .map(|s| (s.key.as_str(), &s.reason))
        .collect();
    assert_eq!(reasons.len(), 3);
    assert_eq!(reasons[0], ("rngGone", &SkipReason::SheetNotFound("Old Sheet".into())));
    assert!(matches!(
        reasons[1],
        ("rngBroken", SkipReason::Unresolved(CoreError::InvalidReference { .. }))
    ));
    assert!(matches!(
        reasons[2],
        ("A0", SkipReason::Unresolved(CoreError::InvalidAddress(_)))
    ));
    assert_eq!(text(&out, 0, "B2").as_deref(), Some("d"));
}

#[test]
fn test_direct_token_without_worksheets() {
    let template = TemplateBuilder::new().build().unwrap();
    let bindings = FieldBindings::new().with("E7", "y");

    let (_, report) = fill_package(template, &bindings, &FillOptions::default()).unwrap();
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].reason, SkipReason::NoWorksheet);
}

#[test]
fn test_layout_options() {
    let template = TemplateBuilder::new()
        .sheet("Sheet1", r#"<row r="2"><c r="B2"/></row><row r="9"/>"#)
        .build()
        .unwrap();
    let bindings = FieldBindings::new()
        .with("C5", "x")
        .with("AA2", "y");

    let (appended, _) =
        fill_package(template.clone(), &bindings, &FillOptions::default()).unwrap();
    let xml = sheet_xml(&appended, 1);
    // Appended after row 9, and AA2 ordered before B2 as text.
    assert!(xml.find(r#"<row r="9""#).unwrap() < xml.find(r#"<row r="5""#).unwrap());
    assert!(xml.find(r#"r="AA2""#).unwrap() < xml.find(r#"r="B2""#).unwrap());

    let ordered = FillOptions {
        layout: LayoutOptions::ordered(),
    };
    let (sorted, _) = fill_package(template, &bindings, &ordered).unwrap();
    let xml = sheet_xml(&sorted, 1);
    assert!(xml.find(r#"<row r="5""#).unwrap() < xml.find(r#"<row r="9""#).unwrap());
    assert!(xml.find(r#"r="B2""#).unwrap() < xml.find(r#"r="AA2""#).unwrap());
}
