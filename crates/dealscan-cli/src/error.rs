//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Token exchange error
    #[error("{0}")]
    Auth(#[from] dealscan_auth::AuthError),

    /// CRM access error
    #[error("{0}")]
    Crm(#[from] dealscan_crm::CrmError),

    /// PDF could not be opened
    #[error("{0}")]
    Pdf(#[from] dealscan_pdf::PdfError),

    /// Model provider setup error
    #[error("{0}")]
    Llm(#[from] dealscan_llm::LlmError),

    /// Extractor setup error
    #[error("{0}")]
    Extractor(#[from] dealscan_extractor::ExtractorError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Interactive prompt failed
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// A background task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(#[from] tokio::task::JoinError),
}
