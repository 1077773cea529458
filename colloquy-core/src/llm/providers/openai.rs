//! OpenAI-compatible LLM provider implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::HttpConfig;
use crate::error::{ColloquyError, Result};
use crate::llm::{
    LLMProvider, LLMRequest, LLMResponse, Message, MessageRole, ModelInfo, TokenUsage,
};
use crate::profile::{ApiKey, Profile};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Provider for any endpoint speaking the OpenAI chat completions API
/// (OpenAI, Groq, OpenRouter, llama.cpp, vLLM, ...).
pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider.
    ///
    /// # Arguments
    ///
    /// * `api_key` - API key
    /// * `model` - Model name (e.g., "gpt-4o", "gpt-4o-mini")
    pub fn new(api_key: impl Into<ApiKey>, model: impl Into<String>) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    /// Create with a custom base URL (for compatible APIs).
    pub fn with_base_url(
        api_key: impl Into<ApiKey>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create from a profile's endpoint, key and model.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_profile(profile: &Profile, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: super::http_client(http)?,
            api_key: profile.api_key.clone(),
            model: profile.model_id.clone(),
            base_url: profile.endpoint_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [serde_json::Value],
}

fn no_tools(tools: &&[serde_json::Value]) -> bool {
    tools.is_empty()
}

#[derive(Serialize)]
struct OpenAIMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: Option<OpenAIMessageResponse>,
}

#[derive(Deserialize)]
struct OpenAIMessageResponse {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}

#[derive(Deserialize)]
struct OpenAIError {
    error: OpenAIErrorDetail,
}

#[derive(Deserialize)]
struct OpenAIErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

/// Empty system messages are dropped; some compatible servers reject them.
fn convert_messages(messages: &[Message]) -> Vec<OpenAIMessage<'_>> {
    messages
        .iter()
        .filter(|m| !(m.role == MessageRole::System && m.content.is_empty()))
        .map(|m| OpenAIMessage {
            role: m.role.as_str(),
            content: &m.content,
        })
        .collect()
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse> {
        let openai_request = OpenAIRequest {
            model: &self.model,
            messages: convert_messages(&request.messages),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            tools: &request.tools,
        };

        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                ColloquyError::Provider(format!("Failed to send request to {}: {}", url, e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            // Try to parse as OpenAI error format
            if let Ok(error) = serde_json::from_str::<OpenAIError>(&text) {
                return Err(ColloquyError::Provider(format!(
                    "OpenAI API error ({}): {}",
                    error.error.error_type.unwrap_or_else(|| status.to_string()),
                    error.error.message
                )));
            }

            return Err(ColloquyError::Provider(format!(
                "OpenAI API error ({}): {}",
                status, text
            )));
        }

        let openai_response: OpenAIResponse = response.json().await.map_err(|e| {
            ColloquyError::Provider(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let content = openai_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                ColloquyError::Provider("OpenAI API returned an empty reply".to_string())
            })?;

        let usage = openai_response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(LLMResponse { content, usage })
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "openai".to_string(),
            model_name: self.model.clone(),
        }
    }
}
