//! Model request types

/// Decoding parameters sent with every request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceParams {
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Sampling temperature; 0.0 for deterministic output
    pub temperature: f32,
    /// Nucleus sampling cutoff
    pub top_p: f32,
}

impl Default for InferenceParams {
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            temperature: 0.0,
            top_p: 0.9,
        }
    }
}

/// A binary PDF sent alongside the prompt
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentAttachment {
    /// Display name of the document
    pub name: String,
    /// Raw PDF bytes
    pub bytes: Vec<u8>,
}

impl DocumentAttachment {
    /// Create an attachment
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

impl std::fmt::Debug for DocumentAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentAttachment")
            .field("name", &self.name)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

/// One single-turn request to a model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    /// Prompt text, including any inline document text
    pub prompt: String,
    /// Optional PDF attached next to the prompt
    pub document: Option<DocumentAttachment>,
    /// Decoding parameters
    pub params: InferenceParams,
}

impl ModelRequest {
    /// A text-only request with default parameters
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            document: None,
            params: InferenceParams::default(),
        }
    }

    /// Attach a PDF to the request
    pub fn with_document(mut self, document: DocumentAttachment) -> Self {
        self.document = Some(document);
        self
    }

    /// Override decoding parameters
    pub fn with_params(mut self, params: InferenceParams) -> Self {
        self.params = params;
        self
    }
}
