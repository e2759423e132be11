//! # sheetfill-core
//!
//! Core types for the sheetfill template engine.
//!
//! This crate has no I/O. It provides:
//! - [`CellAddress`] - A1 cell tokens
//! - [`FieldKey`] and [`FieldBindings`] - what a caller asks to fill
//! - [`DefinedNames`] and [`NameReference`] - named-range resolution
//! - [`LayoutOptions`] - where new rows and cells are placed
//!
//! ## Example
//!
//! ```rust
//! use sheetfill_core::{DefinedName, DefinedNames, FieldKey, SheetRef};
//!
//! let names: DefinedNames = vec![DefinedName::new("rngFirstName", "Sheet1!$F$11:$F$13")]
//!     .into_iter()
//!     .collect();
//!
//! let target = FieldKey::classify("rngFirstName").unwrap().resolve(&names).unwrap();
//! assert_eq!(target.sheet, SheetRef::Named("Sheet1".into()));
//! assert_eq!(target.address.to_string(), "F11");
//! ```

pub mod address;
pub mod error;
pub mod field;
pub mod layout;
pub mod named_range;

pub use address::CellAddress;
pub use error::{Error, Result};
pub use field::{is_direct_address, FieldBindings, FieldKey, ResolvedTarget, SheetRef};
pub use layout::{CellOrdering, LayoutOptions, RowPlacement};
pub use named_range::{DefinedName, DefinedNames, NameReference, NameScope};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;
