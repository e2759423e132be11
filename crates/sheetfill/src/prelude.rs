//! Prelude module - common imports for sheetfill users
//!
//! ```rust
//! use sheetfill::prelude::*;
//! ```

pub use crate::{
    CellAddress,
    CellOrdering,
    Document,
    DocumentFillExt,
    Error,
    FieldBindings,
    FillOptions,
    FillReport,
    GeneratorConfig,
    LayoutOptions,
    Result,
    RowPlacement,
    TemplateGenerator,
};
