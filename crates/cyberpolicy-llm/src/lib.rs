//! Cyberpolicy LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `cyberpolicy-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic, scripted provider for testing
//! - `ChatCompletionsProvider`: OpenAI-compatible chat completions API
//!   (DeepSeek, OpenAI, local gateways)
//!
//! # Examples
//!
//! ```
//! use cyberpolicy_llm::MockProvider;
//! use cyberpolicy_domain::traits::LlmProvider;
//! use cyberpolicy_domain::{Completion, GenerationRequest};
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate(&GenerationRequest::new("system", "user")).unwrap();
//! assert_eq!(result, Completion::Text("Hello from LLM!".to_string()));
//! ```

#![warn(missing_docs)]

pub mod chat;

use cyberpolicy_domain::traits::LlmProvider as LlmProviderTrait;
use cyberpolicy_domain::{Completion, GenerationRequest};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use chat::{ChatCompletionsProvider, ChatSettings};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit or quota exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider could not be configured
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

#[derive(Debug, Clone)]
enum Scripted {
    Reply(Completion),
    Fail(String),
}

/// Mock LLM provider for deterministic testing
///
/// Responses are served from a FIFO script; once the script is exhausted
/// every call returns the default response. No network calls are made.
///
/// # Examples
///
/// ```
/// use cyberpolicy_llm::MockProvider;
/// use cyberpolicy_domain::traits::LlmProvider;
/// use cyberpolicy_domain::{Completion, GenerationRequest};
///
/// let provider = MockProvider::new("fallback");
/// provider.push_response("first");
/// provider.push_error("quota exhausted");
///
/// let request = GenerationRequest::new("system", "user");
/// assert_eq!(provider.generate(&request).unwrap(), Completion::Text("first".into()));
/// assert!(provider.generate(&request).is_err());
/// assert_eq!(provider.generate(&request).unwrap(), Completion::Text("fallback".into()));
/// assert_eq!(provider.call_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: Completion,
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    /// Create a new MockProvider with a fixed text response for all requests
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_default(Completion::Text(response.into()))
    }

    /// Create a new MockProvider whose default response is pre-parsed JSON
    pub fn structured(value: Value) -> Self {
        Self::with_default(Completion::Structured(value))
    }

    fn with_default(default_response: Completion) -> Self {
        Self {
            default_response,
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a text response for the next unscripted call
    pub fn push_response(&self, response: impl Into<String>) {
        lock(&self.script).push_back(Scripted::Reply(Completion::Text(response.into())));
    }

    /// Queue a structured response for the next unscripted call
    pub fn push_structured(&self, value: Value) {
        lock(&self.script).push_back(Scripted::Reply(Completion::Structured(value)));
    }

    /// Queue a failure for the next unscripted call
    pub fn push_error(&self, reason: impl Into<String>) {
        lock(&self.script).push_back(Scripted::Fail(reason.into()));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Every request received so far, in call order
    pub fn requests(&self) -> Vec<GenerationRequest> {
        lock(&self.requests).clone()
    }

    /// Forget recorded requests
    pub fn reset_call_count(&self) {
        lock(&self.requests).clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, request: &GenerationRequest) -> Result<Completion, Self::Error> {
        lock(&self.requests).push(request.clone());

        match lock(&self.script).pop_front() {
            Some(Scripted::Reply(completion)) => Ok(completion),
            Some(Scripted::Fail(reason)) => Err(LlmError::Other(reason)),
            None => Ok(self.default_response.clone()),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
