//! Error types for template generation

use std::path::PathBuf;

use sheetfill_xlsx::XlsxError;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort a whole fill
///
/// Problems with a single binding never end up here; they are collected in
/// the [`FillReport`](crate::FillReport) instead.
#[derive(Debug, Error)]
pub enum Error {
    /// The template file does not exist
    #[error("Template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    /// A caller-supplied request id cannot be used in a file name
    #[error("Invalid request id '{0}': only letters, digits, '-' and '_' are allowed")]
    InvalidRequestId(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The package could not be read or written
    #[error(transparent)]
    Xlsx(#[from] XlsxError),
}
