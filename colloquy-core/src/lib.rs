//! # Colloquy - Bounded Conversations Across Model Profiles
//!
//! Colloquy keeps one chat thread against one model endpoint and decides
//! exactly what goes out with each request:
//! - Named credential profiles (endpoint, key, model, system instruction)
//! - Whole-mapping profile storage (in memory or a JSON file)
//! - Append-only conversation history
//! - Bounded request windows with a freshly synthesized system turn
//! - Profile switching, with or without clearing history
//! - OpenAI-compatible and Gemini model clients
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use colloquy_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ColloquyConfig::load()?;
//!     let profile = Profile::new("work", "https://api.openai.com/v1", "sk-...", "gpt-4o-mini")
//!         .with_system_instruction("Be terse.");
//!
//!     let client = LLMProviderFactory::for_profile(&profile, &config.http)?;
//!     let mut session = ConversationSession::create(profile)?;
//!
//!     let options = ExchangeOptions::from_config(&config);
//!     let reply = exchange(&mut session, client.as_ref(), "Hello!", &options).await?;
//!     println!("{reply}");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `llm-openai`: OpenAI-compatible chat completions client (default)
//! - `llm-gemini`: Google Gemini `generateContent` client (default)

pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod profile;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ColloquyConfig, HttpConfig, SessionConfig, StorageConfig};
    pub use crate::conversation::{
        exchange, ConversationHistory, ConversationSession, ExchangeOptions, LastTurns, Turn,
        WindowPolicy,
    };
    pub use crate::error::{ColloquyError, Result};
    pub use crate::llm::{
        LLMProvider, LLMProviderFactory, LLMRequest, LLMResponse, Message, MessageRole,
        ModelInfo, TokenUsage,
    };
    pub use crate::profile::{
        ApiKey, JsonFileProfileStore, MemoryProfileStore, Profile, ProfileSet, ProfileStore,
        ProviderKind,
    };
}
