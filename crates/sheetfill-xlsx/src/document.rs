//! An opened spreadsheet package
//!
//! A [`Document`] keeps the original package bytes and parses worksheets
//! only when a fill touches them. Saving rewrites the worksheets that were
//! modified and raw-copies every other ZIP entry, so charts, styles, shared
//! strings, images and anything else in the template survive untouched.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use sheetfill_core::{CellAddress, DefinedNames, SheetRef};

use crate::error::{XlsxError, XlsxResult};
use crate::reader::{self, CONTENT_TYPES_PART};
use crate::shared_strings::SharedStringTable;
use crate::worksheet::Worksheet;

/// A worksheet declared by the workbook part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    /// Tab name
    pub name: String,
    /// Part name inside the archive (`xl/worksheets/sheet1.xml`); `None`
    /// when the workbook relationships do not resolve the sheet's rId
    pub part: Option<String>,
}

/// An XLSX package opened for mutation
#[derive(Debug)]
pub struct Document {
    package: Vec<u8>,
    sheets: Vec<SheetEntry>,
    defined_names: DefinedNames,
    shared_strings_part: Option<String>,
    worksheets: HashMap<String, Worksheet>,
}

impl Document {
    /// Open a package from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes)
    }

    /// Open a package held in memory
    pub fn from_bytes(package: Vec<u8>) -> XlsxResult<Self> {
        let mut archive = zip::ZipArchive::new(Cursor::new(package.as_slice()))?;

        if archive.by_name(CONTENT_TYPES_PART).is_err() {
            return Err(XlsxError::InvalidFormat(format!(
                "Missing {}",
                CONTENT_TYPES_PART
            )));
        }

        let workbook_part = reader::read_workbook_path(&mut archive)?;
        let workbook_xml = reader::read_part(&mut archive, &workbook_part)?;
        let workbook = reader::read_workbook_xml(&workbook_xml)?;

        let rels_part = reader::rels_part_for(&workbook_part);
        let rels_xml = reader::read_part(&mut archive, &rels_part)?;
        let rels = reader::read_relationships_for(&rels_xml, &workbook_part)?;

        let sheets = workbook
            .sheets
            .into_iter()
            .map(|info| {
                let part = rels
                    .iter()
                    .find(|rel| rel.id == info.r_id && rel.is_worksheet())
                    .map(|rel| rel.target.clone());
                if part.is_none() {
                    log::warn!(
                        "sheet '{}' ({}) has no worksheet relationship",
                        info.name,
                        info.r_id
                    );
                }
                SheetEntry {
                    name: info.name,
                    part,
                }
            })
            .collect();

        let shared_strings_part = rels
            .iter()
            .find(|rel| rel.is_shared_strings())
            .map(|rel| rel.target.clone());

        drop(archive);
        Ok(Self {
            package,
            sheets,
            defined_names: workbook.defined_names,
            shared_strings_part,
            worksheets: HashMap::new(),
        })
    }

    /// Worksheets in declaration order
    pub fn sheets(&self) -> &[SheetEntry] {
        &self.sheets
    }

    /// Tab names in declaration order
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }

    /// The workbook's defined names
    pub fn defined_names(&self) -> &DefinedNames {
        &self.defined_names
    }

    /// Index of the sheet a [`SheetRef`] points at, if it exists
    ///
    /// Sheet names compare case-insensitively, as they do in Excel.
    pub fn sheet_index(&self, sheet: &SheetRef) -> Option<usize> {
        match sheet {
            SheetRef::First => (!self.sheets.is_empty()).then_some(0),
            SheetRef::Named(name) => {
                let wanted = name.to_lowercase();
                self.sheets
                    .iter()
                    .position(|s| s.name.to_lowercase() == wanted)
            }
        }
    }

    /// Load (once) and return the worksheet at `index`
    ///
    /// Fails when the sheet's part is unresolvable or missing from the
    /// archive; those are structural problems with the template.
    pub fn worksheet_mut(&mut self, index: usize) -> XlsxResult<&mut Worksheet> {
        let entry = self.sheets.get(index).ok_or_else(|| {
            XlsxError::InvalidFormat(format!(
                "sheet index {} out of range ({} sheets)",
                index,
                self.sheets.len()
            ))
        })?;
        let part = entry.part.clone().ok_or_else(|| {
            XlsxError::MissingPart(format!("worksheet part for sheet '{}'", entry.name))
        })?;

        match self.worksheets.entry(part) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                let mut archive = zip::ZipArchive::new(Cursor::new(self.package.as_slice()))?;
                let xml = reader::read_part(&mut archive, e.key())?;
                let worksheet = Worksheet::from_xml(&xml)?;
                log::debug!("loaded worksheet part {}", e.key());
                Ok(e.insert(worksheet))
            }
        }
    }

    /// Read the shared string table, empty when the package has none
    pub fn shared_strings(&self) -> XlsxResult<SharedStringTable> {
        let Some(part) = &self.shared_strings_part else {
            return Ok(SharedStringTable::default());
        };
        let mut archive = zip::ZipArchive::new(Cursor::new(self.package.as_slice()))?;
        match reader::read_part_optional(&mut archive, part)? {
            Some(xml) => SharedStringTable::parse(&xml),
            None => Ok(SharedStringTable::default()),
        }
    }

    /// Effective text of the cell at `address` on sheet `index`
    ///
    /// `None` when the cell does not exist. Shared-string cells are
    /// dereferenced through the package's shared string table.
    pub fn cell_text(&mut self, index: usize, address: &CellAddress) -> XlsxResult<Option<String>> {
        let shared = self.shared_strings()?;
        let worksheet = self.worksheet_mut(index)?;
        match worksheet.cell(address) {
            Some(cell) => cell.text(Some(&shared)).map(Some),
            None => Ok(None),
        }
    }

    /// Whether any worksheet has pending changes
    pub fn is_modified(&self) -> bool {
        self.worksheets.values().any(Worksheet::is_modified)
    }

    /// Write the package, rewriting modified worksheets only
    pub fn save<W: Write + Seek>(&self, writer: W) -> XlsxResult<()> {
        let mut archive = zip::ZipArchive::new(Cursor::new(self.package.as_slice()))?;
        let mut zip = zip::ZipWriter::new(writer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        for i in 0..archive.len() {
            let file = archive.by_index(i)?;
            let name = file.name().to_string();

            match self.worksheets.get(&name).filter(|ws| ws.is_modified()) {
                Some(worksheet) => {
                    drop(file);
                    zip.start_file(name.as_str(), options)?;
                    zip.write_all(&worksheet.to_xml()?)?;
                    log::debug!("rewrote worksheet part {}", name);
                }
                None => zip.raw_copy_file(file)?,
            }
        }

        zip.finish()?;
        Ok(())
    }

    /// Write the package to a byte vector
    pub fn to_bytes(&self) -> XlsxResult<Vec<u8>> {
        let mut out = Cursor::new(Vec::with_capacity(self.package.len()));
        self.save(&mut out)?;
        Ok(out.into_inner())
    }

    /// Write the package to a file
    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        self.save(file)
    }
}
