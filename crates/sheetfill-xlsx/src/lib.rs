//! # sheetfill-xlsx
//!
//! In-place cell mutation for XLSX (Office Open XML) packages.
//!
//! ```rust,no_run
//! use sheetfill_core::{CellAddress, LayoutOptions};
//! use sheetfill_xlsx::Document;
//!
//! let mut doc = Document::open("template.xlsx")?;
//! let sheet = doc.worksheet_mut(0)?;
//! sheet.set_value(&CellAddress::parse("E7")?, Some("Acme"), LayoutOptions::default());
//! let bytes = doc.to_bytes()?;
//! # Ok::<(), sheetfill_xlsx::XlsxError>(())
//! ```

pub mod document;
pub mod error;
pub mod shared_strings;
pub mod worksheet;

#[cfg(feature = "test-util")]
pub mod testing;

mod reader;

pub use document::{Document, SheetEntry};
pub use error::{XlsxError, XlsxResult};
pub use shared_strings::SharedStringTable;
pub use worksheet::{is_blank, write_value, Cell, CellType, Row, Worksheet};
