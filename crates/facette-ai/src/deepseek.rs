//! DeepSeek chat-completions client over HTTPS.

use crate::client::{AiClient, AiError, Prompt};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.deepseek.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Transport configuration for [`DeepSeekClient`].
#[derive(Debug, Clone)]
pub struct DeepSeekConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Per-request timeout enforced by the HTTP client.
    pub timeout: Duration,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// Chat-completions client. Makes a single attempt per call.
pub struct DeepSeekClient {
    config: DeepSeekConfig,
    http: reqwest::Client,
}

impl DeepSeekClient {
    pub fn new(config: DeepSeekConfig) -> Result<Self, AiError> {
        if config.api_key.trim().is_empty() {
            return Err(AiError::NotConfigured("missing API key".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::Network(format!("HTTP client: {e}")))?;
        tracing::info!(endpoint = %config.endpoint, model = %config.model, "AI client ready");
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &DeepSeekConfig {
        &self.config
    }

    fn build_request<'a>(&'a self, prompt: &'a Prompt) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &prompt.system {
            messages.push(ChatMessage { role: "system", content: system });
        }
        messages.push(ChatMessage { role: "user", content: &prompt.user });

        ChatRequest {
            model: &self.config.model,
            messages,
            // Budget-limited probes go out without a sampling temperature.
            temperature: prompt.max_tokens.is_none().then_some(self.config.temperature),
            max_tokens: prompt.max_tokens.unwrap_or(self.config.max_tokens),
        }
    }
}

fn first_choice(response: ChatResponse) -> Result<String, AiError> {
    if let Some(usage) = &response.usage {
        tracing::debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "AI token usage"
        );
    }
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AiError::Malformed("response has no choices".to_string()))?;
    tracing::debug!(finish_reason = ?choice.finish_reason, "AI choice received");
    Ok(choice.message.content)
}

impl AiClient for DeepSeekClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String, AiError> {
        let request = self.build_request(prompt);

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout
                } else {
                    AiError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "AI provider returned an error status");
            return Err(AiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::Malformed(format!("chat response: {e}")))?;
        first_choice(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ping_prompt;

    fn client() -> DeepSeekClient {
        DeepSeekClient::new(DeepSeekConfig {
            api_key: "sk-test".into(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_missing_key_rejected() {
        let err = DeepSeekClient::new(DeepSeekConfig::default()).err().unwrap();
        assert!(matches!(err, AiError::NotConfigured(_)));
    }

    #[test]
    fn test_request_body() {
        let client = client();
        let prompt = Prompt {
            system: Some("sys".into()),
            user: "usr".into(),
            max_tokens: None,
        };
        let body = serde_json::to_value(client.build_request(&prompt)).unwrap();
        assert_eq!(body["model"], "deepseek-chat");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "usr");
        assert_eq!(body["max_tokens"], 1000);
        assert!((body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_ping_request_body() {
        let client = client();
        let prompt = ping_prompt();
        let body = serde_json::to_value(client.build_request(&prompt)).unwrap();
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["max_tokens"], 10);
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_first_choice() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "{}"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12}}"#,
        )
        .unwrap();
        assert_eq!(first_choice(response).unwrap(), "{}");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(first_choice(empty), Err(AiError::Malformed(_))));
    }
}
