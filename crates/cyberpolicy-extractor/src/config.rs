//! Configuration for the extraction pipeline

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Pipeline driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Word budget per batch (whitespace-delimited words)
    pub max_words: usize,

    /// Attempts per batch before the cursor is forced past it
    pub max_attempts: u32,

    /// Delay before the first retry (milliseconds); doubles on each retry
    pub retry_backoff_ms: u64,

    /// File extension of documents to process (case-insensitive)
    pub document_extension: String,

    /// Sampling temperature sent with each request
    pub temperature: f32,

    /// Output token limit sent with each request
    pub max_tokens: u32,

    /// Request JSON-object output from the model
    pub json_mode: bool,
}

impl PipelineConfig {
    /// Delay to wait after the given failed attempt (1-based)
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(factor))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_words == 0 {
            return Err("max_words must be greater than 0".to_string());
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if self.document_extension.trim().is_empty() {
            return Err("document_extension must not be empty".to_string());
        }
        if self.document_extension.starts_with('.') {
            return Err("document_extension must not start with '.'".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!("temperature {} out of range [0.0, 2.0]", self.temperature));
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_words: 2048,
            max_attempts: 3,
            retry_backoff_ms: 1000,
            document_extension: "pdf".to_string(),
            temperature: 1.0,
            max_tokens: 4096,
            json_mode: true,
        }
    }
}

impl PipelineConfig {
    /// Thorough preset: smaller batches and more patience per batch
    pub fn thorough() -> Self {
        Self {
            max_words: 1024,
            max_attempts: 5,
            retry_backoff_ms: 2000,
            temperature: 0.7,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
