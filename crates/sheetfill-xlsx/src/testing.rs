//! In-memory template packages for tests
//!
//! Enabled by the `test-util` feature.

use std::io::{Cursor, Read, Write};

use zip::result::ZipError;
use zip::write::SimpleFileOptions;

use crate::error::XlsxResult;

/// Builds a minimal but well-formed XLSX package
#[derive(Debug, Default)]
pub struct TemplateBuilder {
    sheets: Vec<(String, String)>,
    names: Vec<(String, String)>,
    shared_strings: Option<Vec<String>>,
    extra_parts: Vec<(String, Vec<u8>)>,
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a worksheet whose `<sheetData>` holds `rows` verbatim
    pub fn sheet(mut self, name: &str, rows: &str) -> Self {
        self.sheets.push((name.to_string(), rows.to_string()));
        self
    }

    pub fn defined_name(mut self, name: &str, refers_to: &str) -> Self {
        self.names.push((name.to_string(), refers_to.to_string()));
        self
    }

    pub fn shared_strings(mut self, strings: &[&str]) -> Self {
        self.shared_strings = Some(strings.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn part(mut self, name: &str, bytes: &[u8]) -> Self {
        self.extra_parts.push((name.to_string(), bytes.to_vec()));
        self
    }

    pub fn build(self) -> XlsxResult<Vec<u8>> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        let mut content_types = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
        );
        for i in 0..self.sheets.len() {
            content_types.push_str(&format!(
                r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i + 1
            ));
        }
        content_types.push_str("</Types>");
        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(content_types.as_bytes())?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
        )?;

        let mut workbook = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
        );
        for (i, (name, _)) in self.sheets.iter().enumerate() {
            workbook.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape(name),
                i + 1,
                i + 1
            ));
        }
        workbook.push_str("</sheets>");
        if !self.names.is_empty() {
            workbook.push_str("<definedNames>");
            for (name, refers_to) in &self.names {
                workbook.push_str(&format!(
                    r#"<definedName name="{}">{}</definedName>"#,
                    escape(name),
                    escape(refers_to)
                ));
            }
            workbook.push_str("</definedNames>");
        }
        workbook.push_str("</workbook>");
        zip.start_file("xl/workbook.xml", options)?;
        zip.write_all(workbook.as_bytes())?;

        let mut rels = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for i in 0..self.sheets.len() {
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            ));
        }
        if self.shared_strings.is_some() {
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
                self.sheets.len() + 1
            ));
        }
        rels.push_str("</Relationships>");
        zip.start_file("xl/_rels/workbook.xml.rels", options)?;
        zip.write_all(rels.as_bytes())?;

        for (i, (_, rows)) in self.sheets.iter().enumerate() {
            zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)?;
            zip.write_all(worksheet_xml(rows).as_bytes())?;
        }

        if let Some(strings) = &self.shared_strings {
            let mut sst = format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
                strings.len()
            );
            for s in strings {
                sst.push_str(&format!("<si><t>{}</t></si>", escape(s)));
            }
            sst.push_str("</sst>");
            zip.start_file("xl/sharedStrings.xml", options)?;
            zip.write_all(sst.as_bytes())?;
        }

        for (name, bytes) in &self.extra_parts {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(bytes)?;
        }

        Ok(zip.finish()?.into_inner())
    }
}

/// A worksheet part with `rows` as its `<sheetData>` content
pub fn worksheet_xml(rows: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><dimension ref="A1"/><sheetData>{}</sheetData><pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/></worksheet>"#,
        rows
    )
}

/// Read one part of a package back out, `None` when it is absent
pub fn read_part(package: &[u8], name: &str) -> XlsxResult<Option<Vec<u8>>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(package))?;
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(Some(bytes))
}

/// Copy a package without one of its parts; relationships are left as they are
pub fn without_part(package: &[u8], name: &str) -> XlsxResult<Vec<u8>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(package))?;
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for i in 0..archive.len() {
        let file = archive.by_index(i)?;
        if file.name() != name {
            zip.raw_copy_file(file)?;
        }
    }
    Ok(zip.finish()?.into_inner())
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
