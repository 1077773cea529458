//! Google Gemini LLM provider implementation
//!
//! Speaks the generative-language `generateContent` REST API. Tool
//! declarations on the request are forwarded as `functionDeclarations`; calls
//! the model makes to them are not executed here, so a reply made only of a
//! function call counts as an empty reply.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::HttpConfig;
use crate::error::{ColloquyError, Result};
use crate::llm::{LLMProvider, LLMRequest, LLMResponse, MessageRole, ModelInfo, TokenUsage};
use crate::profile::{ApiKey, Profile};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini provider (gemini-2.0-flash, gemini-1.5-pro, ...).
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<ApiKey>, model: impl Into<String>) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

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

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        let model = self.model.strip_prefix("models/").unwrap_or(&self.model);
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTools<'a>>,
}

#[derive(Serialize, Deserialize, Default)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTools<'a> {
    function_declarations: &'a [serde_json::Value],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
    #[serde(default)]
    total_token_count: usize,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
    status: Option<String>,
}

fn text_content(role: Option<&str>, text: &str) -> GeminiContent {
    GeminiContent {
        role: role.map(str::to_string),
        parts: vec![GeminiPart {
            text: Some(text.to_string()),
        }],
    }
}

fn build_request(request: &LLMRequest) -> GeminiRequest<'_> {
    let system_instruction = request
        .system_prompt()
        .map(|prompt| text_content(None, &prompt));

    let contents = request
        .messages
        .iter()
        .filter_map(|m| match m.role {
            MessageRole::System => None,
            MessageRole::User => Some(text_content(Some("user"), &m.content)),
            MessageRole::Assistant => Some(text_content(Some("model"), &m.content)),
        })
        .collect();

    let generation_config = if request.temperature.is_some() || request.max_tokens.is_some() {
        Some(GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_tokens,
        })
    } else {
        None
    };

    let tools = if request.tools.is_empty() {
        Vec::new()
    } else {
        vec![GeminiTools {
            function_declarations: &request.tools,
        }]
    };

    GeminiRequest {
        system_instruction,
        contents,
        generation_config,
        tools,
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse> {
        let body = build_request(request);
        let url = self.endpoint();

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose())
            .json(&body)
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

            if let Ok(error) = serde_json::from_str::<GeminiError>(&text) {
                return Err(ColloquyError::Provider(format!(
                    "Gemini API error ({}): {}",
                    error.error.status.unwrap_or_else(|| status.to_string()),
                    error.error.message
                )));
            }

            return Err(ColloquyError::Provider(format!(
                "Gemini API error ({}): {}",
                status, text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            ColloquyError::Provider(format!("Failed to parse Gemini response: {}", e))
        })?;

        let content: String = gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ColloquyError::Provider(
                "Gemini API returned an empty reply".to_string(),
            ));
        }

        let usage = gemini_response.usage_metadata.map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        Ok(LLMResponse { content, usage })
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "gemini".to_string(),
            model_name: self.model.clone(),
        }
    }
}
