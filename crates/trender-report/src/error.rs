//! Report extraction error types

use thiserror::Error;

/// Result type for report extraction
pub type ReportResult<T> = std::result::Result<T, ReportError>;

/// Errors that can occur while extracting report content.
///
/// Only reference resolution is allowed to fail: a failed chart or series
/// is dropped and processing continues. The scanning heuristics never
/// error; absence is expressed as `None` in their return types.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A data reference names a sheet the workbook does not contain
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// A data reference is not of the `Sheet!A1:B2` form
    #[error("Invalid data reference: {0}")]
    InvalidReference(String),

    /// XML error in a chart part
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Core error (bad cell range, etc.)
    #[error("Core error: {0}")]
    Core(#[from] trender_core::Error),
}
