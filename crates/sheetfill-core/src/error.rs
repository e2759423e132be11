//! Error types for sheetfill-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while classifying or resolving a field key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Row number out of bounds
    #[error("Row number {0} out of bounds (max: {1})")]
    RowOutOfBounds(u64, u32),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u32, u16),

    /// No defined name matches the field key
    #[error("Named range not found: {0}")]
    NameNotFound(String),

    /// Defined-name reference text could not be reduced to a sheet and cell
    #[error("Invalid defined-name reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },
}

impl Error {
    pub(crate) fn invalid_reference(reference: &str, reason: impl Into<String>) -> Self {
        Error::InvalidReference {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }
}
