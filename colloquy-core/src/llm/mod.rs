use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::conversation::Turn;
use crate::error::{ColloquyError, Result};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<&Turn> for Message {
    fn from(turn: &Turn) -> Self {
        Message::new(turn.role, turn.content.clone())
    }
}

/// Request to an LLM provider
#[derive(Debug, Clone, Default)]
pub struct LLMRequest {
    /// Messages in the conversation
    pub messages: Vec<Message>,

    /// Temperature for generation (0.0-2.0)
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    pub max_tokens: Option<usize>,

    /// Static tool declarations, passed through to providers that accept them
    pub tools: Vec<serde_json::Value>,
}

impl LLMRequest {
    /// Build a request from a request window
    pub fn from_window(window: &[Turn]) -> Self {
        Self {
            messages: window.iter().map(Message::from).collect(),
            ..Default::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 2.0));
        self
    }

    pub fn with_max_tokens(mut self, tokens: usize) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn with_tools(mut self, tools: Vec<serde_json::Value>) -> Self {
        self.tools = tools;
        self
    }

    /// Concatenated content of all system messages, if any
    pub fn system_prompt(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::System && !m.content.is_empty())
            .map(|m| m.content.as_str())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }
}

/// Response from an LLM provider
#[derive(Debug, Clone)]
pub struct LLMResponse {
    /// Generated content
    pub content: String,

    /// Token usage information
    pub usage: Option<TokenUsage>,
}

/// Token usage information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

/// Model client collaborator.
///
/// Given a request window, returns either assistant text or an explicit
/// failure. Network, auth and quota failures all surface as
/// [`ColloquyError::Provider`]. A reply without text is a failure too.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a reply for the request.
    async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse>;

    /// Get model information
    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "unknown".to_string(),
            model_name: "unknown".to_string(),
        }
    }
}

/// Model information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub provider: String,
    pub model_name: String,
}

/// Provider that always fails, for sessions with no reachable endpoint.
pub struct StubLLMProvider;

#[async_trait]
impl LLMProvider for StubLLMProvider {
    async fn generate_request(&self, _request: &LLMRequest) -> Result<LLMResponse> {
        Err(ColloquyError::Provider(
            "LLM provider not configured".to_string(),
        ))
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "stub".to_string(),
            model_name: "none".to_string(),
        }
    }
}

/// Provider that plays back queued replies and records every request.
///
/// Useful for exercising sessions without a network.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    requests: Mutex<Vec<LLMRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn reply(self, content: impl Into<String>) -> Self {
        self.push(Ok(content.into()));
        self
    }

    /// Queue a failure
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.push(Err(message.into()));
        self
    }

    fn push(&self, entry: std::result::Result<String, String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(entry);
        }
    }

    /// Requests seen so far, oldest first
    pub fn requests(&self) -> Vec<LLMRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let next = self
            .replies
            .lock()
            .map_err(|_| ColloquyError::Provider("scripted provider poisoned".to_string()))?
            .pop_front();

        match next {
            Some(Ok(content)) => Ok(LLMResponse {
                content,
                usage: None,
            }),
            Some(Err(message)) => Err(ColloquyError::Provider(message)),
            None => Err(ColloquyError::Provider("no scripted reply left".to_string())),
        }
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "scripted".to_string(),
            model_name: "scripted".to_string(),
        }
    }
}

pub mod factory;
pub mod providers;

pub use factory::LLMProviderFactory;
