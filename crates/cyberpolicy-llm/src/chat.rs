//! Chat Completions Provider Implementation
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint. The default
//! settings target DeepSeek's hosted API.
//!
//! # Features
//!
//! - Bearer-token authentication
//! - JSON-object output mode (`response_format`)
//! - Timeout handling
//!
//! The provider owns no retry loop: the pipeline driver decides how often a
//! batch is re-attempted.
//!
//! # Examples
//!
//! ```no_run
//! use cyberpolicy_llm::{ChatCompletionsProvider, ChatSettings};
//!
//! let settings = ChatSettings::default().with_api_key("sk-...");
//! let provider = ChatCompletionsProvider::new(settings).unwrap();
//! ```

use crate::LlmError;
use cyberpolicy_domain::traits::LlmProvider as LlmProviderTrait;
use cyberpolicy_domain::{Completion, GenerationRequest};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.deepseek.com";

/// Default model
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Default timeout for a single request (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection settings for a chat completions endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    /// Base URL, without the `/chat/completions` suffix
    pub endpoint: String,

    /// Model identifier
    pub model: String,

    /// Bearer token; requests are sent unauthenticated when absent
    pub api_key: Option<String>,

    /// Per-request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ChatSettings {
    /// Settings for a custom endpoint and model
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    /// Set the bearer token
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}

/// Provider for OpenAI-compatible chat completion APIs
///
/// Calls are blocking: the provider drives its own single-threaded tokio
/// runtime, so it must not be used from inside another async runtime.
pub struct ChatCompletionsProvider {
    settings: ChatSettings,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatCompletionsProvider {
    /// Create a new provider
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` if the HTTP client or runtime cannot be built.
    pub fn new(settings: ChatSettings) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to start runtime: {}", e)))?;

        Ok(Self {
            settings,
            client,
            runtime,
        })
    }

    /// Connection settings in use
    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Send one request to the completions endpoint
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The endpoint is unreachable or times out
    /// - The model does not exist (HTTP 404)
    /// - The quota or rate limit is exhausted (HTTP 429)
    /// - The response body is not a chat completion
    pub async fn complete(&self, request: &GenerationRequest) -> Result<Completion, LlmError> {
        let body = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            response_format: request
                .json_mode
                .then_some(ResponseFormat { kind: "json_object" }),
        };

        let mut http = self.client.post(self.settings.completions_url()).json(&body);
        if let Some(key) = &self.settings.api_key {
            http = http.bearer_auth(key);
        }

        let response = http
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.settings.model.clone()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("Response has no content".to_string()))?;

        debug!("Received {} chars from {}", content.len(), self.settings.model);

        Ok(Completion::Text(content))
    }
}

impl LlmProviderTrait for ChatCompletionsProvider {
    type Error = LlmError;

    fn generate(&self, request: &GenerationRequest) -> Result<Completion, Self::Error> {
        self.runtime.block_on(self.complete(request))
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = ChatCompletionsProvider::new(ChatSettings::default()).unwrap();
        assert_eq!(provider.settings().endpoint, DEFAULT_ENDPOINT);
        assert_eq!(provider.model_name(), DEFAULT_MODEL);
        assert_eq!(provider.settings().timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_settings_builders() {
        let settings = ChatSettings::new("http://localhost:8000/v1", "gpt-4o-mini")
            .with_api_key("secret")
            .with_timeout_secs(5);
        assert_eq!(settings.model, "gpt-4o-mini");
        assert_eq!(settings.api_key.as_deref(), Some("secret"));
        assert_eq!(settings.timeout_secs, 5);
    }

    #[test]
    fn test_completions_url_trims_trailing_slash() {
        let settings = ChatSettings::new("https://api.example.com/", "m");
        assert_eq!(settings.completions_url(), "https://api.example.com/chat/completions");
    }

    #[test]
    fn test_request_body_shape() {
        let request = GenerationRequest::new("sys", "usr").with_max_tokens(100);
        let body = ChatRequest {
            model: "deepseek-chat",
            messages: vec![
                ChatMessage { role: "system", content: &request.system },
                ChatMessage { role: "user", content: &request.user },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            response_format: Some(ResponseFormat { kind: "json_object" }),
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "usr");
        assert_eq!(value["max_tokens"], 100);
        assert_eq!(value["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"{\"a\":1}"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_error_handling() {
        // Use invalid endpoint to trigger error
        let settings = ChatSettings::new("http://localhost:99999", "deepseek-chat")
            .with_timeout_secs(2);
        let provider = ChatCompletionsProvider::new(settings).unwrap();

        let result = provider.generate(&GenerationRequest::new("s", "u"));
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }

    // Integration test (requires network access and DEEPSEEK_API_KEY)
    #[test]
    #[ignore]
    fn test_generate_integration() {
        let Ok(key) = std::env::var("DEEPSEEK_API_KEY") else {
            return;
        };
        let provider =
            ChatCompletionsProvider::new(ChatSettings::default().with_api_key(key)).unwrap();
        let request = GenerationRequest::new(
            "You answer in JSON.",
            "Return {\"hello\": \"world\"} and nothing else.",
        );
        let result = provider.generate(&request).unwrap();
        assert!(!result.is_empty());
    }
}
