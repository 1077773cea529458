//! LLM provider implementations

#[cfg(feature = "llm-openai")]
pub mod openai;

#[cfg(feature = "llm-openai")]
pub use openai::OpenAIProvider;

#[cfg(feature = "llm-gemini")]
pub mod gemini;

#[cfg(feature = "llm-gemini")]
pub use gemini::GeminiProvider;

/// Build the shared HTTP client for a provider
#[cfg(any(feature = "llm-openai", feature = "llm-gemini"))]
pub(crate) fn http_client(http: &crate::config::HttpConfig) -> crate::error::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(http.request_timeout)
        .build()
        .map_err(|e| {
            crate::error::ColloquyError::Configuration(format!("Failed to build HTTP client: {}", e))
        })
}
