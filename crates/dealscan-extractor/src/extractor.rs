//! Contract extractor: prompt, model call, tolerant parse

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_model_reply;
use crate::prompt::build_prompt;
use crate::types::{ExtractionInput, ExtractionResult};
use dealscan_llm::{DocumentAttachment, ModelProvider, ModelRequest};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Name given to attached documents
pub const DOCUMENT_NAME: &str = "contract";

/// Pulls effective date and total amount out of a contract via a model
pub struct ContractExtractor<P> {
    provider: P,
    config: ExtractorConfig,
}

impl<P: ModelProvider> ContractExtractor<P> {
    /// Create a new extractor
    ///
    /// # Errors
    ///
    /// Returns [`ExtractorError::Config`] if `config` fails validation.
    pub fn new(provider: P, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate()?;
        Ok(Self { provider, config })
    }

    /// The model provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract contract fields from `input`
    ///
    /// Never fails: service, timeout and parse failures are returned as
    /// the corresponding [`ExtractionResult`] variant.
    pub async fn extract_contract_info(&self, input: ExtractionInput) -> ExtractionResult {
        let service = self.provider.name().to_string();
        if matches!(input, ExtractionInput::Document(_)) && !self.provider.supports_documents() {
            warn!(service = %service, "Provider cannot read attached documents");
            return ExtractionResult::ServiceError {
                service,
                message: "document attachments are not supported; send the extracted text instead"
                    .to_string(),
            };
        }
        let request = self.build_request(input);

        info!(
            service = %service,
            prompt_chars = request.prompt.len(),
            attached = request.document.is_some(),
            "Sending document to model for analysis"
        );

        let reply = match timeout(self.config.timeout(), self.provider.generate(&request)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                warn!(service = %service, "Model call failed: {}", e);
                return ExtractionResult::ServiceError {
                    service,
                    message: e.to_string(),
                };
            }
            Err(_) => {
                warn!(service = %service, "Model call timed out");
                return ExtractionResult::ServiceError {
                    service,
                    message: format!(
                        "request timed out after {}s",
                        self.config.timeout_secs
                    ),
                };
            }
        };

        debug!(reply_chars = reply.len(), "Model replied");
        let result = parse_model_reply(&reply);
        if result.is_extracted() {
            info!("Contract fields extracted");
        }
        result
    }

    /// Convenience for [`ExtractionInput::Text`]
    pub async fn extract_from_text(&self, text: impl Into<String>) -> ExtractionResult {
        self.extract_contract_info(ExtractionInput::Text(text.into()))
            .await
    }

    /// Convenience for [`ExtractionInput::Document`]
    pub async fn extract_from_document(&self, pdf_bytes: Vec<u8>) -> ExtractionResult {
        self.extract_contract_info(ExtractionInput::Document(pdf_bytes))
            .await
    }

    fn build_request(&self, input: ExtractionInput) -> ModelRequest {
        let input = match input {
            ExtractionInput::Text(text) => {
                ExtractionInput::Text(truncate_chars(text, self.config.max_text_chars))
            }
            document => document,
        };

        let request = ModelRequest::text(build_prompt(&input)).with_params(self.config.params());
        match input {
            ExtractionInput::Document(bytes) => {
                request.with_document(DocumentAttachment::new(DOCUMENT_NAME, bytes))
            }
            ExtractionInput::Text(_) => request,
        }
    }
}

/// Cut `text` to at most `max_chars` characters
fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => {
            warn!(
                chars = text.chars().count(),
                max_chars, "Document text too long, truncating"
            );
            let mut text = text;
            text.truncate(byte_index);
            text
        }
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_chars("hello".to_string(), 10), "hello");
        assert_eq!(truncate_chars("hello".to_string(), 5), "hello");
    }

    #[test]
    fn test_truncate_at_char_boundary() {
        assert_eq!(truncate_chars("héllo wörld".to_string(), 4), "héll");
        assert_eq!(truncate_chars("€€€".to_string(), 2), "€€");
    }
}
