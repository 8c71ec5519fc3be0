//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur setting up extraction
///
/// Failures during an extraction call never surface here; they are
/// reported inside [`ExtractionResult`](crate::ExtractionResult).
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
