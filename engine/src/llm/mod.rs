//! LLM Provider Abstraction Layer
//!
//! This module provides a common interface for the providers that can polish
//! generated summaries (OpenAI-compatible endpoints, Anthropic, Gemini).
//! Enhancement is optional: callers treat every `LLMError` as "keep the
//! original text".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, LlmPreference};

pub mod anthropic;
pub mod gemini;
pub mod openai;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl LLMError {
    /// Map a non-success HTTP status to an error
    pub(crate) fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => LLMError::AuthenticationFailed(body),
            429 => LLMError::RateLimitExceeded,
            400 | 404 | 422 => LLMError::InvalidRequest(body),
            _ => LLMError::ProviderUnavailable(format!("HTTP {}: {}", status, body)),
        }
    }
}

/// Message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::System => write!(f, "system"),
        }
    }
}

/// LLM Provider trait that all providers must implement
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Returns the name of the provider (e.g., "openai", "anthropic")
    fn name(&self) -> &str;

    /// Generate a plain-text completion for the conversation
    async fn generate(&self, messages: &[Message]) -> Result<String>;
}

const ENHANCE_PROMPT: &str = "You edit engineering session summaries. Improve clarity and \
grammar. Keep every heading, code block, file path and decision. Reply with the edited \
Markdown only.";

/// Ask the provider to polish a summary document
pub async fn enhance_summary(provider: &dyn LLMProvider, summary: &str) -> Result<String> {
    let messages = [Message::system(ENHANCE_PROMPT), Message::user(summary)];
    let text = provider.generate(&messages).await?;

    if text.trim().is_empty() {
        return Err(LLMError::ParseError("empty completion".to_string()));
    }
    Ok(text)
}

/// Build the provider named by `llm.preferred`, if it has an API key
pub fn provider_from_config(config: &Config) -> Option<Arc<dyn LLMProvider>> {
    let settings = config.preferred_provider()?.clone();
    let api_key = settings.api_key.clone()?;
    let timeout = Duration::from_secs(config.llm.timeout_secs);

    let provider: Arc<dyn LLMProvider> = match config.llm.preferred {
        LlmPreference::None => return None,
        LlmPreference::Openai => Arc::new(openai::OpenAIProvider::new(
            "openai", settings, api_key, timeout,
        )),
        LlmPreference::Deepseek => Arc::new(openai::OpenAIProvider::new(
            "deepseek", settings, api_key, timeout,
        )),
        LlmPreference::Anthropic => Arc::new(anthropic::AnthropicProvider::new(
            settings, api_key, timeout,
        )),
        LlmPreference::Google => Arc::new(gemini::GeminiProvider::new(settings, api_key, timeout)),
    };

    tracing::info!("Summary enhancement enabled via {}", provider.name());
    Some(provider)
}

/// Shared HTTP client builder for providers
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedProvider(&'static str);

    #[async_trait]
    impl LLMProvider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        async fn generate(&self, _messages: &[Message]) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_message_creation() {
        let user_msg = Message::user("Hello");
        assert_eq!(user_msg.role, MessageRole::User);
        assert_eq!(user_msg.content, "Hello");

        let system_msg = Message::system("You are a helpful assistant");
        assert_eq!(system_msg.role, MessageRole::System);
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            LLMError::from_status(reqwest::StatusCode::UNAUTHORIZED, String::new()),
            LLMError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            LLMError::from_status(reqwest::StatusCode::TOO_MANY_REQUESTS, String::new()),
            LLMError::RateLimitExceeded
        ));
        assert!(matches!(
            LLMError::from_status(reqwest::StatusCode::BAD_GATEWAY, String::new()),
            LLMError::ProviderUnavailable(_)
        ));
    }

    #[tokio::test]
    async fn test_enhance_rejects_empty_completion() {
        assert!(enhance_summary(&CannedProvider("  "), "summary").await.is_err());
        assert_eq!(
            enhance_summary(&CannedProvider("better"), "summary").await.unwrap(),
            "better"
        );
    }

    #[test]
    fn test_no_provider_without_key() {
        let mut config = Config::default();
        config.llm.preferred = LlmPreference::Openai;
        assert!(provider_from_config(&config).is_none());

        config.llm.openai.api_key = Some("sk-test".to_string());
        let provider = provider_from_config(&config).unwrap();
        assert_eq!(provider.name(), "openai");
    }
}
