//! OpenAI API client for message generation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::integrations::TextGenerator;

const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// OpenAI client.
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    /// Create client with API key.
    pub fn new<S: Into<String>>(api_key: S) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::ConfigError("OPENAI_API_KEY is empty".to_string()));
        }

        let http = Client::builder()
            .user_agent("love_sender/0.1.0")
            .build()
            .map_err(|e| Error::OpenAiError(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            base_url: OPENAI_API_URL.to_string(),
        })
    }

    /// Chat completion.
    pub async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        model: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let request = ChatRequest {
            model: model.to_string(),
            messages,
            temperature,
            max_tokens,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::OpenAiError(format!("request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::OpenAiError(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::OpenAiError(format!("{}: {}", status, text)));
        }

        let chat_response: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| Error::OpenAiError(format!("invalid response: {}", e)))?;

        chat_response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| Error::OpenAiError("empty response".to_string()))
    }
}

#[async_trait]
impl TextGenerator for OpenAIClient {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: Some(system_prompt.to_string()),
            },
            ChatMessage {
                role: "user".to_string(),
                content: Some(user_prompt.to_string()),
            },
        ];

        self.chat_completion(messages, model, temperature, max_tokens)
            .await
    }
}

/// Chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
