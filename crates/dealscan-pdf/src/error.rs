//! Error types for text extraction

use thiserror::Error;

/// Errors that can occur opening a PDF
///
/// Failures on individual pages are written into the extracted text
/// instead of being raised.
#[derive(Debug, Error)]
pub enum PdfError {
    /// The bytes could not be opened as a PDF document
    #[error("Unreadable document: {0}")]
    UnreadableDocument(String),
}
