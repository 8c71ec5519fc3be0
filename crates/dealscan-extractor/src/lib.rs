//! Dealscan Extractor
//!
//! Pulls structured contract fields out of a document using a language
//! model.
//!
//! # Overview
//!
//! The extractor sends a fixed prompt asking for the contract's effective
//! date and total amount (each with a confidence) and parses the first
//! JSON object out of the model's free-text reply.
//!
//! # Architecture
//!
//! ```text
//! ExtractionInput → prompt → ModelProvider → reply → parse_model_reply → ExtractionResult
//! ```
//!
//! Input is either pre-extracted text, which is appended to the prompt, or
//! raw PDF bytes, which are attached to the request for providers that
//! accept documents.
//!
//! [`ContractExtractor::extract_contract_info`] never fails: every failure
//! path is an [`ExtractionResult`] variant.
//!
//! # Example Usage
//!
//! ```no_run
//! use dealscan_extractor::{ContractExtractor, ExtractorConfig, ExtractionInput};
//! use dealscan_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"{"effective_date": "2024-01-15", "total_amount": 1500}"#);
//! let extractor = ContractExtractor::new(llm, ExtractorConfig::default())?;
//!
//! let result = extractor
//!     .extract_contract_info(ExtractionInput::Text("--- Page 1 ---\n...".to_string()))
//!     .await;
//!
//! if let Some(fields) = result.fields() {
//!     println!("Effective date: {:?}", fields.effective_date());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod parser;
mod prompt;
mod types;

pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::{ContractExtractor, DOCUMENT_NAME};
pub use parser::{parse_model_reply, NO_JSON_MESSAGE};
pub use prompt::{build_prompt, CONTRACT_PROMPT};
pub use types::{ContractFields, ExtractionInput, ExtractionResult};
