//! Conversation Session Management
//!
//! One bounded chat thread bound to one credential profile.
//!
//! # Features
//!
//! - Append-only history of user, assistant and notice turns
//! - Request windows: a fresh system turn plus the last N dialogue entries
//! - Profile switching with or without clearing history
//! - A request/response round trip that never records a phantom reply
//!
//! # Example
//!
//! ```rust
//! use colloquy_core::conversation::ConversationSession;
//! use colloquy_core::llm::MessageRole;
//! use colloquy_core::profile::Profile;
//!
//! let profile = Profile::new("work", "https://x", "k", "m").with_system_instruction("be terse");
//! let mut session = ConversationSession::create(profile)?;
//! session.append_user_turn("hi")?;
//!
//! let window = session.build_request_window(10);
//! assert_eq!(window.len(), 2);
//! assert_eq!(window[0].role, MessageRole::System);
//! # Ok::<(), colloquy_core::error::ColloquyError>(())
//! ```

mod exchange;
mod history;
mod session;
mod window;

pub use exchange::{exchange, ExchangeOptions};
pub use history::{ConversationHistory, Turn};
pub use session::ConversationSession;
pub use window::{LastTurns, WindowPolicy};
