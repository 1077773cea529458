//! Conversation History

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::llm::MessageRole;

/// One message in a conversation, tagged with its speaker role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Who spoke
    pub role: MessageRole,
    /// What was said
    pub content: String,
    /// When the turn was recorded (display only)
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a new turn stamped with the current time
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Whether this turn is a display notice rather than part of the dialogue
    pub fn is_system(&self) -> bool {
        self.role == MessageRole::System
    }
}

/// Ordered, append-only record of a conversation.
///
/// Storage is unbounded; bounded views for outbound requests come from a
/// [`WindowPolicy`](super::WindowPolicy). Alternation of user and assistant
/// turns is not enforced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn at the end
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// All turns, oldest first
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The most recent turn, if any
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drop every turn
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }
}

impl<'a> IntoIterator for &'a ConversationHistory {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}
