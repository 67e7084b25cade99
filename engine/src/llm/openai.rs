use super::{LLMError, LLMProvider, Message};
use crate::config::ProviderConfig;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Chat completions client for OpenAI and API-compatible services (DeepSeek)
pub struct OpenAIProvider {
    name: &'static str,
    config: ProviderConfig,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAIProvider {
    pub fn new(
        name: &'static str,
        config: ProviderConfig,
        api_key: String,
        timeout: Duration,
    ) -> Self {
        Self {
            name,
            config,
            api_key,
            client: super::http_client(timeout),
        }
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn generate(&self, messages: &[Message]) -> super::Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let api_messages: Vec<_> = messages
            .iter()
            .map(|msg| {
                json!({
                    "role": msg.role.to_string(),
                    "content": msg.content
                })
            })
            .collect();

        let payload = json!({
            "model": self.config.model,
            "messages": api_messages,
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LLMError::from_status(status, text));
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        data.get("choices")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .map(str::to_string)
            .ok_or_else(|| LLMError::ParseError("No message content in response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: String) -> OpenAIProvider {
        OpenAIProvider::new(
            "deepseek",
            ProviderConfig {
                api_key: None,
                base_url,
                model: "deepseek-chat".to_string(),
            },
            "sk-test".to_string(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_generate_reads_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "polished" } }]
            })))
            .mount(&server)
            .await;

        let text = provider(server.uri())
            .generate(&[Message::user("draft")])
            .await
            .unwrap();
        assert_eq!(text, "polished");
    }

    #[tokio::test]
    async fn test_generate_maps_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = provider(server.uri())
            .generate(&[Message::user("draft")])
            .await
            .unwrap_err();
        assert!(matches!(err, LLMError::AuthenticationFailed(_)));
    }
}
