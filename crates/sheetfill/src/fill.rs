//! Filling an opened document from field bindings
//!
//! Every binding is classified, resolved to a sheet and cell, and written in
//! the order the caller supplied. A binding that cannot be resolved is
//! skipped and recorded in the [`FillReport`]; the remaining bindings are
//! still processed. Only structural problems with the package abort a fill.
//!
//! # Example
//!
//! ```rust,no_run
//! use sheetfill::prelude::*;
//!
//! let mut doc = Document::open("template.xlsx")?;
//! let bindings = FieldBindings::new()
//!     .with("rngFirstName", "Jane")
//!     .with("E7", "Acme Health");
//!
//! let report = doc.fill(&bindings, &FillOptions::default())?;
//! for skipped in &report.skipped {
//!     eprintln!("{}: {}", skipped.key, skipped.reason);
//! }
//! doc.save_file("filled.xlsx")?;
//! # Ok::<(), sheetfill::Error>(())
//! ```

use sheetfill_core::{FieldBindings, FieldKey, LayoutOptions, ResolvedTarget, SheetRef};
use sheetfill_xlsx::{is_blank, Document};
use thiserror::Error;

use crate::error::Result;

/// Options for a fill
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FillOptions {
    /// Where newly created rows and cells are placed
    pub layout: LayoutOptions,
}

/// Why a binding was left out of a fill
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// The key could not be turned into a cell: an out-of-range cell token,
    /// an unknown defined name, or a defined name whose reference is unusable
    #[error(transparent)]
    Unresolved(#[from] sheetfill_core::Error),

    /// A defined name points at a sheet the workbook does not have
    #[error("Worksheet not found: {0}")]
    SheetNotFound(String),

    /// A direct cell token was given but the workbook has no worksheets
    #[error("Workbook has no worksheets")]
    NoWorksheet,
}

/// A binding that was not written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBinding {
    pub key: String,
    pub reason: SkipReason,
}

/// Outcome of a fill
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    /// Keys whose value was written, in binding order
    pub written: Vec<String>,
    /// Keys with a blank value; nothing was created for them
    pub blank: Vec<String>,
    /// Keys that could not be resolved
    pub skipped: Vec<SkippedBinding>,
}

impl FillReport {
    /// `true` when no binding was skipped
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    fn skip(&mut self, key: &str, reason: SkipReason) {
        log::warn!("skipping field '{}': {}", key, reason);
        self.skipped.push(SkippedBinding {
            key: key.to_string(),
            reason,
        });
    }
}

/// Extension trait for [`Document`] to fill it from field bindings
pub trait DocumentFillExt {
    /// Write every binding into the document
    ///
    /// The document is only changed in memory; call one of its save methods
    /// to persist the result.
    fn fill(&mut self, bindings: &FieldBindings, options: &FillOptions) -> Result<FillReport>;
}

impl DocumentFillExt for Document {
    fn fill(&mut self, bindings: &FieldBindings, options: &FillOptions) -> Result<FillReport> {
        let mut report = FillReport::default();

        for (key, value) in bindings.iter() {
            let target = match resolve_key(self, key) {
                Ok(target) => target,
                Err(reason) => {
                    report.skip(key, reason);
                    continue;
                }
            };

            let Some(index) = self.sheet_index(&target.sheet) else {
                let reason = match target.sheet {
                    SheetRef::First => SkipReason::NoWorksheet,
                    SheetRef::Named(name) => SkipReason::SheetNotFound(name),
                };
                report.skip(key, reason);
                continue;
            };

            // Blank values never load the sheet.
            if is_blank(value) {
                log::debug!("field '{}' is blank, leaving {} untouched", key, target.address);
                report.blank.push(key.to_string());
                continue;
            }

            let worksheet = self.worksheet_mut(index)?;
            if worksheet.set_value(&target.address, value, options.layout) {
                log::debug!("wrote field '{}' to {}", key, target.address);
                report.written.push(key.to_string());
            }
        }

        Ok(report)
    }
}

fn resolve_key(doc: &Document, key: &str) -> std::result::Result<ResolvedTarget, SkipReason> {
    let field = FieldKey::classify(key)?;
    match &field {
        FieldKey::DirectAddress(address) => {
            log::debug!("field '{}' is a direct cell reference ({})", key, address)
        }
        FieldKey::NamedRange(_) => log::debug!("field '{}' is a named range", key),
    }
    Ok(field.resolve(doc.defined_names())?)
}

/// Fill a template held in memory and return the saved package
pub fn fill_package(
    template: Vec<u8>,
    bindings: &FieldBindings,
    options: &FillOptions,
) -> Result<(Vec<u8>, FillReport)> {
    let mut doc = Document::from_bytes(template)?;
    let report = doc.fill(bindings, options)?;
    let bytes = doc.to_bytes()?;
    Ok((bytes, report))
}
