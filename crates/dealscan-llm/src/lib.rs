//! Dealscan LLM Provider Layer
//!
//! Pluggable model backends behind a single async trait.
//!
//! # Architecture
//!
//! Every backend implements [`ModelProvider`]: one prompt (optionally with
//! a PDF attached) in, one text reply out. Parsing the reply is the
//! caller's business.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama API integration (text only)
//! - `BedrockProvider`: AWS Bedrock Converse API (text and PDF documents)
//!
//! # Examples
//!
//! ```
//! use dealscan_llm::{MockProvider, ModelProvider, ModelRequest};
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let provider = MockProvider::new("Hello from LLM!");
//! let reply = rt.block_on(provider.generate(&ModelRequest::text("test prompt"))).unwrap();
//! assert_eq!(reply, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod bedrock;
pub mod ollama;
mod request;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use bedrock::{AwsCredentials, BedrockConfig, BedrockProvider};
pub use ollama::OllamaProvider;
pub use request::{DocumentAttachment, InferenceParams, ModelRequest};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// The provider cannot handle this kind of request
    #[error("Unsupported request: {0}")]
    Unsupported(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// A language model backend
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Short service name used in error reports, e.g. `Bedrock`
    fn name(&self) -> &str;

    /// Whether [`ModelRequest::document`] is honored
    fn supports_documents(&self) -> bool {
        false
    }

    /// Send one request and return the model's text reply
    async fn generate(&self, request: &ModelRequest) -> Result<String, LlmError>;
}

#[async_trait]
impl<P: ModelProvider + ?Sized> ModelProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn supports_documents(&self) -> bool {
        (**self).supports_documents()
    }

    async fn generate(&self, request: &ModelRequest) -> Result<String, LlmError> {
        (**self).generate(request).await
    }
}

#[async_trait]
impl<P: ModelProvider + ?Sized> ModelProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn supports_documents(&self) -> bool {
        (**self).supports_documents()
    }

    async fn generate(&self, request: &ModelRequest) -> Result<String, LlmError> {
        (**self).generate(request).await
    }
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error(String),
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any
/// network calls. Replies are matched on the exact prompt; anything else
/// gets the default reply.
///
/// # Examples
///
/// ```
/// use dealscan_llm::{MockProvider, ModelProvider, ModelRequest};
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// let provider = MockProvider::default();
/// provider.add_response("prompt1", "response1");
/// provider.add_error("prompt2", "boom");
///
/// let reply = rt.block_on(provider.generate(&ModelRequest::text("prompt1")));
/// assert_eq!(reply.unwrap(), "response1");
/// assert!(rt.block_on(provider.generate(&ModelRequest::text("prompt2"))).is_err());
/// assert_eq!(provider.call_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    name: String,
    default_reply: MockReply,
    supports_documents: bool,
    responses: Arc<Mutex<HashMap<String, MockReply>>>,
    requests: Arc<Mutex<Vec<ModelRequest>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            name: "Mock".to_string(),
            default_reply: MockReply::Text(response.into()),
            supports_documents: true,
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a MockProvider that fails every call with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            default_reply: MockReply::Error(message.into()),
            ..Self::new("")
        }
    }

    /// Override the service name reported by [`ModelProvider::name`]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set whether document attachments are accepted
    pub fn with_document_support(mut self, supported: bool) -> Self {
        self.supports_documents = supported;
        self
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&self, prompt: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), MockReply::Text(response.into()));
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&self, prompt: impl Into<String>, message: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), MockReply::Error(message.into()));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Every request received so far, oldest first
    pub fn requests(&self) -> Vec<ModelRequest> {
        lock(&self.requests).clone()
    }

    /// The most recent request
    pub fn last_request(&self) -> Option<ModelRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Forget recorded requests
    pub fn reset(&self) {
        lock(&self.requests).clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_documents(&self) -> bool {
        self.supports_documents
    }

    async fn generate(&self, request: &ModelRequest) -> Result<String, LlmError> {
        lock(&self.requests).push(request.clone());

        if request.document.is_some() && !self.supports_documents {
            return Err(LlmError::Unsupported(format!(
                "{} does not accept document attachments",
                self.name
            )));
        }

        let reply = lock(&self.responses)
            .get(&request.prompt)
            .cloned()
            .unwrap_or_else(|| self.default_reply.clone());

        match reply {
            MockReply::Text(text) => Ok(text),
            MockReply::Error(message) => Err(LlmError::Other(message)),
        }
    }
}
