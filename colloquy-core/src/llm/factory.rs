//! Factory for creating LLM providers from profiles

use crate::config::HttpConfig;
use crate::error::Result;
use crate::llm::LLMProvider;
use crate::profile::{Profile, ProviderKind};
use std::sync::Arc;

#[cfg(feature = "llm-openai")]
use crate::llm::providers::openai::OpenAIProvider;

#[cfg(feature = "llm-gemini")]
use crate::llm::providers::gemini::GeminiProvider;

/// Factory for creating LLM providers
pub struct LLMProviderFactory;

impl LLMProviderFactory {
    /// Create the model client for a profile
    ///
    /// # Errors
    ///
    /// Returns `InvalidProfile` if the profile has no endpoint or key, or a
    /// configuration error if the provider was compiled out.
    pub fn for_profile(profile: &Profile, http: &HttpConfig) -> Result<Arc<dyn LLMProvider>> {
        profile.validate()?;

        match profile.provider {
            #[cfg(feature = "llm-openai")]
            ProviderKind::OpenAI => Ok(Arc::new(OpenAIProvider::from_profile(profile, http)?)),

            #[cfg(not(feature = "llm-openai"))]
            ProviderKind::OpenAI => {
                let _ = http;
                Err(crate::error::ColloquyError::Configuration(
                    "OpenAI provider requires 'llm-openai' feature".to_string(),
                ))
            }

            #[cfg(feature = "llm-gemini")]
            ProviderKind::Gemini => Ok(Arc::new(GeminiProvider::from_profile(profile, http)?)),

            #[cfg(not(feature = "llm-gemini"))]
            ProviderKind::Gemini => {
                let _ = http;
                Err(crate::error::ColloquyError::Configuration(
                    "Gemini provider requires 'llm-gemini' feature".to_string(),
                ))
            }
        }
    }
}
