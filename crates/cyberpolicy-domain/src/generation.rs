//! Request and response shapes at the text-generation boundary

use serde_json::Value;

/// One call to a text-generation model
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// System instruction (the model's role)
    pub system: String,

    /// User instruction (the rendered extraction prompt)
    pub user: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum number of output tokens
    pub max_tokens: u32,

    /// Ask the model for a JSON-object-shaped payload
    pub json_mode: bool,
}

impl GenerationRequest {
    /// Create a request with default generation parameters
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature: 1.0,
            max_tokens: 4096,
            json_mode: true,
        }
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the output token limit
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Enable or disable JSON-object output mode
    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }
}

/// What a model returned
///
/// Providers either hand back raw text (which is expected to contain a JSON
/// object, possibly wrapped in code fences) or a payload they already parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Freeform text
    Text(String),

    /// Pre-parsed structured payload
    Structured(Value),
}

impl Completion {
    /// Length of the payload in characters, for logging
    pub fn len(&self) -> usize {
        match self {
            Completion::Text(text) => text.chars().count(),
            Completion::Structured(value) => value.to_string().chars().count(),
        }
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
