//! Profile records

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

use crate::error::{ColloquyError, Result};

/// API key that never shows up in logs and is wiped from memory on drop.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiKey(Zeroizing<String>);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Zeroizing::new(key.into()))
    }

    /// Borrow the raw key for an outbound request.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_blank() {
            f.write_str("<unset>")
        } else {
            f.write_str("****")
        }
    }
}

impl From<&str> for ApiKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ApiKey {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

impl Serialize for ApiKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for ApiKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(ApiKey::new)
    }
}

/// Wire dialect spoken by the profile's endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible `/chat/completions`
    #[default]
    OpenAI,
    /// Google generative-language `generateContent`
    Gemini,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "openai",
            ProviderKind::Gemini => "gemini",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "open-ai" | "openai-compatible" => Ok(ProviderKind::OpenAI),
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            other => Err(format!("unknown provider '{}', expected openai or gemini", other)),
        }
    }
}

/// A named set of model-endpoint credentials and behavioral instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique name within a profile set
    pub name: String,

    /// Base URL of the model endpoint
    pub endpoint_url: String,

    /// Credential sent with every request
    pub api_key: ApiKey,

    /// Model identifier understood by the endpoint
    pub model_id: String,

    /// Instruction synthesized as the first turn of every request
    #[serde(default)]
    pub system_instruction: String,

    #[serde(default)]
    pub provider: ProviderKind,
}

impl Profile {
    pub fn new(
        name: impl Into<String>,
        endpoint_url: impl Into<String>,
        api_key: impl Into<ApiKey>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint_url: endpoint_url.into(),
            api_key: api_key.into(),
            model_id: model_id.into(),
            system_instruction: String::new(),
            provider: ProviderKind::default(),
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = provider;
        self
    }

    /// Check that the profile can reach an endpoint at all.
    ///
    /// # Errors
    ///
    /// Returns `InvalidProfile` when the endpoint URL or API key is blank.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint_url.trim().is_empty() {
            return Err(ColloquyError::InvalidProfile(format!(
                "profile '{}' has no endpoint_url",
                self.name
            )));
        }
        if self.api_key.is_blank() {
            return Err(ColloquyError::InvalidProfile(format!(
                "profile '{}' has no api_key",
                self.name
            )));
        }
        Ok(())
    }
}
