//! AWS Bedrock provider over the Converse API
//!
//! Sends the prompt as a text block and, when the request carries one, the
//! PDF as a `DocumentBlock` in the same user message. Decoding parameters
//! go in the `InferenceConfiguration`.

use crate::{DocumentAttachment, InferenceParams, LlmError, ModelProvider, ModelRequest};
use async_trait::async_trait;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_bedrockruntime::config::Credentials;
use aws_sdk_bedrockruntime::error::SdkError;
use aws_sdk_bedrockruntime::operation::converse::ConverseError;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, DocumentBlock, DocumentFormat, DocumentSource,
    InferenceConfiguration, Message,
};
use aws_smithy_types::error::display::DisplayErrorContext;
use std::time::Duration;
use tracing::{debug, info};

/// Model used when none is configured
pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-sonnet-20240229-v1:0";

/// Region used when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default operation timeout (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default connect timeout (10 seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Static AWS credentials
#[derive(Clone)]
pub struct AwsCredentials {
    /// Access key id
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Session token for temporary credentials
    pub session_token: Option<String>,
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Settings for [`BedrockProvider`]
#[derive(Debug, Clone)]
pub struct BedrockConfig {
    /// Bedrock model or inference profile id
    pub model_id: String,
    /// AWS region
    pub region: String,
    /// Static credentials; `None` uses the default AWS provider chain
    pub credentials: Option<AwsCredentials>,
    /// Total time allowed for one Converse call
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl Default for BedrockConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            region: DEFAULT_REGION.to_string(),
            credentials: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

/// Bedrock Converse provider
#[derive(Debug, Clone)]
pub struct BedrockProvider {
    client: aws_sdk_bedrockruntime::Client,
    model_id: String,
}

impl BedrockProvider {
    /// Build a provider, resolving credentials and region
    pub async fn new(config: &BedrockConfig) -> Self {
        let timeouts = TimeoutConfig::builder()
            .operation_timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .timeout_config(timeouts);

        if let Some(creds) = &config.credentials {
            loader = loader.credentials_provider(Credentials::new(
                creds.access_key_id.clone(),
                creds.secret_access_key.clone(),
                creds.session_token.clone(),
                None,
                "dealscan-config",
            ));
        }

        let sdk_config = loader.load().await;
        Self::from_sdk_config(&sdk_config, config.model_id.clone())
    }

    /// Build a provider from an already-loaded AWS configuration
    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig, model_id: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_bedrockruntime::Client::new(sdk_config),
            model_id: model_id.into(),
        }
    }

    /// Configured model id
    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[async_trait]
impl ModelProvider for BedrockProvider {
    fn name(&self) -> &str {
        "Bedrock"
    }

    fn supports_documents(&self) -> bool {
        true
    }

    async fn generate(&self, request: &ModelRequest) -> Result<String, LlmError> {
        let message = build_message(request)?;

        info!(
            model_id = %self.model_id,
            prompt_chars = request.prompt.len(),
            document_bytes = request.document.as_ref().map(|d| d.bytes.len()),
            "Calling Bedrock Converse"
        );

        let response = self
            .client
            .converse()
            .model_id(&self.model_id)
            .messages(message)
            .inference_config(inference_configuration(&request.params))
            .send()
            .await
            .map_err(|e| map_converse_error(e, &self.model_id))?;

        if let Some(usage) = response.usage() {
            debug!(
                input_tokens = usage.input_tokens(),
                output_tokens = usage.output_tokens(),
                "Bedrock token usage"
            );
        }

        let output_message = response
            .output()
            .and_then(|o| o.as_message().ok())
            .ok_or_else(|| LlmError::InvalidResponse("no message in response".to_string()))?;

        let text = output_message
            .content()
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(LlmError::InvalidResponse(
                "response contained no text blocks".to_string(),
            ));
        }
        Ok(text)
    }
}

/// User message: the prompt text, then the PDF if one is attached
fn build_message(request: &ModelRequest) -> Result<Message, LlmError> {
    let mut builder = Message::builder()
        .role(ConversationRole::User)
        .content(ContentBlock::Text(request.prompt.clone()));

    if let Some(document) = &request.document {
        builder = builder.content(ContentBlock::Document(document_block(document)?));
    }

    builder
        .build()
        .map_err(|e| LlmError::Other(format!("Failed to build message: {}", e)))
}

fn document_block(document: &DocumentAttachment) -> Result<DocumentBlock, LlmError> {
    DocumentBlock::builder()
        .format(DocumentFormat::Pdf)
        .name(sanitize_document_name(&document.name))
        .source(DocumentSource::Bytes(aws_smithy_types::Blob::new(
            document.bytes.clone(),
        )))
        .build()
        .map_err(|e| LlmError::Other(format!("Failed to build document block: {}", e)))
}

fn inference_configuration(params: &InferenceParams) -> InferenceConfiguration {
    InferenceConfiguration::builder()
        .max_tokens(i32::try_from(params.max_tokens).unwrap_or(i32::MAX))
        .temperature(params.temperature)
        .top_p(params.top_p)
        .build()
}

fn map_converse_error(err: SdkError<ConverseError>, model_id: &str) -> LlmError {
    match err.as_service_error() {
        Some(ConverseError::ThrottlingException(_)) => LlmError::RateLimitExceeded,
        Some(ConverseError::ResourceNotFoundException(_))
        | Some(ConverseError::ModelNotReadyException(_)) => {
            LlmError::ModelNotAvailable(model_id.to_string())
        }
        _ => LlmError::Communication(DisplayErrorContext(&err).to_string()),
    }
}

/// Document names may only hold alphanumerics, single spaces, hyphens,
/// parentheses and square brackets
fn sanitize_document_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut prev_space = true;
    for c in name.chars() {
        let c = if c.is_alphanumeric() || matches!(c, '-' | '(' | ')' | '[' | ']') {
            c
        } else {
            ' '
        };
        if c == ' ' {
            if !prev_space {
                result.push(' ');
            }
            prev_space = true;
        } else {
            result.push(c);
            prev_space = false;
        }
    }

    let trimmed = result.trim_end();
    if trimmed.is_empty() {
        "contract".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_document_name() {
        assert_eq!(sanitize_document_name("MSA_2024 v2.pdf"), "MSA 2024 v2 pdf");
        assert_eq!(sanitize_document_name("  Order  Form (signed) "), "Order Form (signed)");
        assert_eq!(sanitize_document_name("***"), "contract");
        assert_eq!(sanitize_document_name(""), "contract");
    }

    #[test]
    fn test_text_only_message_has_one_block() {
        let message = build_message(&ModelRequest::text("Extract the dates")).unwrap();
        assert_eq!(message.content().len(), 1);
        assert!(matches!(&message.content()[0], ContentBlock::Text(t) if t == "Extract the dates"));
    }

    #[test]
    fn test_document_message_has_text_then_document() {
        let request = ModelRequest::text("Extract")
            .with_document(DocumentAttachment::new("contract.pdf", b"%PDF-1.4".to_vec()));
        let message = build_message(&request).unwrap();

        assert_eq!(message.content().len(), 2);
        match &message.content()[1] {
            ContentBlock::Document(doc) => {
                assert_eq!(doc.name(), "contract pdf");
                assert_eq!(doc.format(), &DocumentFormat::Pdf);
            }
            other => panic!("expected document block, got {:?}", other),
        }
    }

    #[test]
    fn test_inference_configuration_from_params() {
        let config = inference_configuration(&InferenceParams::default());
        assert_eq!(config.max_tokens(), Some(1000));
        assert_eq!(config.temperature(), Some(0.0));
        assert_eq!(config.top_p(), Some(0.9));
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = AwsCredentials {
            access_key_id: "AKIAEXAMPLE".to_string(),
            secret_access_key: "super-secret".to_string(),
            session_token: Some("session".to_string()),
        };
        let debug = format!("{:?}", creds);
        assert!(debug.contains("AKIAEXAMPLE"));
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("session\""));
    }

    #[test]
    fn test_default_config() {
        let config = BedrockConfig::default();
        assert_eq!(config.model_id, DEFAULT_MODEL_ID);
        assert_eq!(config.region, DEFAULT_REGION);
        assert!(config.credentials.is_none());
    }
}
