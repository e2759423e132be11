//! # sheetfill
//!
//! Fill XLSX templates from a flat set of field bindings.
//!
//! A field key is either a literal cell token (`E7`, written to the first
//! worksheet) or the name of a workbook-level defined name (`rngFirstName`,
//! written to the first cell of the range it refers to). Values are written
//! as inline strings; blank values leave the template untouched. Everything
//! in the template that is not written to is saved back byte-for-byte.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sheetfill::prelude::*;
//!
//! let generator = TemplateGenerator::new(
//!     GeneratorConfig::new("Templates/intake.xlsx").with_output_dir("Generated_Excels"),
//! );
//!
//! let bindings = FieldBindings::new()
//!     .with("rngFirstName", "Jane")
//!     .with("rngLastName", "Doe")
//!     .with("E7", "Acme Health");
//!
//! let generated = generator.generate(&bindings, None)?;
//! println!("{} ({} bytes)", generated.file_name, generated.bytes.len());
//! # Ok::<(), sheetfill::Error>(())
//! ```

pub mod error;
pub mod fill;
pub mod generate;
pub mod prelude;

pub use error::{Error, Result};
pub use fill::{fill_package, DocumentFillExt, FillOptions, FillReport, SkipReason, SkippedBinding};
pub use generate::{output_file_name, Generated, GeneratorConfig, TemplateGenerator};

// Re-export core types
pub use sheetfill_core::{
    CellAddress, CellOrdering, DefinedName, DefinedNames, FieldBindings, FieldKey,
    LayoutOptions, NameReference, NameScope, ResolvedTarget, RowPlacement, SheetRef, MAX_COLS,
    MAX_ROWS,
};

/// Errors from classifying or resolving a field key
pub use sheetfill_core::Error as CoreError;

// Re-export package types
pub use sheetfill_xlsx::{Cell, CellType, Document, SheetEntry, Worksheet, XlsxError};
