//! Readers for the package-level parts a fill needs
//!
//! Only the parts that locate worksheets and defined names are parsed here:
//! `_rels/.rels`, the workbook part and its relationships. Worksheet bodies
//! are parsed on demand by [`crate::worksheet::Worksheet`].

use std::io::{Read, Seek};

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use sheetfill_core::{DefinedName, DefinedNames, NameScope};

use crate::error::{XlsxError, XlsxResult};

pub(crate) const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub(crate) const ROOT_RELS_PART: &str = "_rels/.rels";
pub(crate) const DEFAULT_WORKBOOK_PART: &str = "xl/workbook.xml";

const REL_OFFICE_DOCUMENT: &str = "/officeDocument";
const REL_WORKSHEET: &str = "/worksheet";
const REL_SHARED_STRINGS: &str = "/sharedStrings";

/// A `<sheet>` entry of the workbook part
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SheetInfo {
    pub name: String,
    pub r_id: String,
}

/// A single `<Relationship>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: String,
    /// Target resolved to a full part name inside the archive
    pub target: String,
}

impl Relationship {
    pub fn is_worksheet(&self) -> bool {
        self.rel_type.ends_with(REL_WORKSHEET)
    }

    pub fn is_shared_strings(&self) -> bool {
        self.rel_type.ends_with(REL_SHARED_STRINGS)
    }
}

/// Read a part into memory, `None` if the archive has no such entry
pub(crate) fn read_part_optional<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> XlsxResult<Option<Vec<u8>>> {
    let mut file = match archive.by_name(name) {
        Ok(f) => f,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut bytes = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut bytes)?;
    Ok(Some(bytes))
}

/// Read a part that must exist
pub(crate) fn read_part<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> XlsxResult<Vec<u8>> {
    read_part_optional(archive, name)?.ok_or_else(|| XlsxError::MissingPart(name.to_string()))
}

/// Name of the relationships part for `part` (`xl/workbook.xml` ->
/// `xl/_rels/workbook.xml.rels`)
pub(crate) fn rels_part_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Directory portion of a part name, without trailing slash
fn part_dir(part: &str) -> &str {
    part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Resolve a relationship target against the directory of its source part
pub(crate) fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Find the workbook part through the package relationships
///
/// Falls back to `xl/workbook.xml` when the package has no root
/// relationships part or it names no office document.
pub(crate) fn read_workbook_path<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> XlsxResult<String> {
    let Some(bytes) = read_part_optional(archive, ROOT_RELS_PART)? else {
        return Ok(DEFAULT_WORKBOOK_PART.to_string());
    };

    let path = read_relationships(&bytes, "")?
        .into_iter()
        .find(|rel| rel.rel_type.ends_with(REL_OFFICE_DOCUMENT))
        .map(|rel| rel.target)
        .unwrap_or_else(|| DEFAULT_WORKBOOK_PART.to_string());
    Ok(path)
}

/// Read a relationships part, resolving targets against `source_part`'s
/// directory
pub(crate) fn read_relationships_for(
    bytes: &[u8],
    source_part: &str,
) -> XlsxResult<Vec<Relationship>> {
    read_relationships(bytes, part_dir(source_part))
}

fn read_relationships(bytes: &[u8], base_dir: &str) -> XlsxResult<Vec<Relationship>> {
    let mut xml_reader = Reader::from_reader(bytes);
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut rels = Vec::new();

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                let mut rel_type = None;
                let mut external = false;

                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"Id" => id = Some(attr.unescape_value()?.into_owned()),
                        b"Target" => target = Some(attr.unescape_value()?.into_owned()),
                        b"Type" => rel_type = Some(attr.unescape_value()?.into_owned()),
                        b"TargetMode" => external = attr.value.as_ref() == b"External",
                        _ => {}
                    }
                }

                if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                    if !external {
                        rels.push(Relationship {
                            id,
                            rel_type,
                            target: resolve_target(base_dir, &target),
                        });
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

/// Sheets and defined names declared by the workbook part
#[derive(Debug, Default)]
pub(crate) struct WorkbookXml {
    pub sheets: Vec<SheetInfo>,
    pub defined_names: DefinedNames,
}

/// Read the workbook part for sheet names, rIds and defined names
pub(crate) fn read_workbook_xml(bytes: &[u8]) -> XlsxResult<WorkbookXml> {
    let mut xml_reader = Reader::from_reader(bytes);
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut workbook = WorkbookXml::default();

    // Defined name being read: (name, scope, hidden, text)
    let mut current_name: Option<(String, NameScope, bool, String)> = None;

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"sheet" => {
                let mut name = None;
                let mut r_id = None;

                for attr in e.attributes() {
                    let attr = attr?;
                    // The relationship id is namespaced (`r:id`); match by local name.
                    match attr.key.local_name().as_ref() {
                        b"name" => name = Some(attr.unescape_value()?.into_owned()),
                        b"id" => r_id = Some(attr.unescape_value()?.into_owned()),
                        _ => {}
                    }
                }

                if let (Some(name), Some(r_id)) = (name, r_id) {
                    workbook.sheets.push(SheetInfo { name, r_id });
                }
            }
            Event::Start(e) if e.local_name().as_ref() == b"definedName" => {
                let mut name = None;
                let mut scope = NameScope::Workbook;
                let mut hidden = false;

                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"name" => name = Some(attr.unescape_value()?.into_owned()),
                        b"localSheetId" => {
                            let raw = attr.unescape_value()?;
                            let index = raw.parse::<usize>().map_err(|_| {
                                XlsxError::Parse(format!("invalid localSheetId '{}'", raw))
                            })?;
                            scope = NameScope::Sheet(index);
                        }
                        b"hidden" => {
                            hidden = matches!(attr.value.as_ref(), b"1" | b"true");
                        }
                        _ => {}
                    }
                }

                if let Some(name) = name {
                    current_name = Some((name, scope, hidden, String::new()));
                }
            }
            Event::Text(t) => {
                if let Some((_, _, _, text)) = current_name.as_mut() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::CData(t) => {
                if let Some((_, _, _, text)) = current_name.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"definedName" => {
                if let Some((name, scope, hidden, text)) = current_name.take() {
                    let mut defined = DefinedName::new(name, text).with_scope(scope);
                    if hidden {
                        defined = defined.hidden();
                    }
                    workbook.defined_names.push(defined);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(workbook)
}
