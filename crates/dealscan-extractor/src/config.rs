//! Configuration for the Extractor

use crate::error::ExtractorError;
use dealscan_llm::InferenceParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Upper bound on generated tokens
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Nucleus sampling cutoff
    pub top_p: f32,

    /// Maximum time for a single model call (seconds)
    pub timeout_secs: u64,

    /// Inline document text longer than this (characters) is truncated
    pub max_text_chars: usize,
}

impl ExtractorConfig {
    /// Get the model call timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Decoding parameters for the model request
    pub fn params(&self) -> InferenceParams {
        InferenceParams {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.max_tokens == 0 {
            return Err(ExtractorError::Config(
                "max_tokens must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ExtractorError::Config(
                "temperature must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(ExtractorError::Config(
                "top_p must be in (0.0, 1.0]".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ExtractorError::Config(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.max_text_chars == 0 {
            return Err(ExtractorError::Config(
                "max_text_chars must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| ExtractorError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

impl Default for ExtractorConfig {
    /// Deterministic decoding, two minute timeout
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            temperature: 0.0,
            top_p: 0.9,
            timeout_secs: 120,
            max_text_chars: 200_000,
        }
    }
}
