//! Conversation Session

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{ColloquyError, Result};
use crate::profile::Profile;

use super::history::{ConversationHistory, Turn};
use super::window::{LastTurns, WindowPolicy};

/// One chat thread against one model endpoint.
///
/// The active [`Profile`] is held by value: later edits to the stored copy
/// do not reach a running session until it is switched again.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    /// Unique session ID
    id: Uuid,
    /// Active profile, copied at create/switch time
    profile: Profile,
    /// Full, unbounded history
    history: ConversationHistory,
    /// When the session was created
    created_at: DateTime<Utc>,
    /// When the session was last changed
    updated_at: DateTime<Utc>,
}

impl ConversationSession {
    /// Create a session bound to `profile`.
    ///
    /// No network I/O happens here.
    ///
    /// # Errors
    ///
    /// Returns `InvalidProfile` if the profile has no endpoint or API key.
    pub fn create(profile: Profile) -> Result<Self> {
        profile.validate()?;

        let now = Utc::now();
        let session = Self {
            id: Uuid::new_v4(),
            profile,
            history: ConversationHistory::new(),
            created_at: now,
            updated_at: now,
        };

        tracing::info!(
            session_id = %session.id,
            profile = %session.profile.name,
            model = %session.profile.model_id,
            "Created conversation session"
        );

        Ok(session)
    }

    /// Get the session ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the active profile
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Get the message history
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Record a user message.
    ///
    /// The text is stored as given; only the emptiness check trims it.
    ///
    /// # Errors
    ///
    /// Returns `EmptyInput` if `text` is empty or whitespace-only. History is
    /// unchanged in that case.
    pub fn append_user_turn(&mut self, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        if text.trim().is_empty() {
            tracing::warn!(session_id = %self.id, "Rejected empty user message");
            return Err(ColloquyError::EmptyInput);
        }

        self.history.push(Turn::user(text));
        self.touch();
        Ok(())
    }

    /// Record a model reply. Only call this after a successful response.
    pub fn append_assistant_turn(&mut self, text: impl Into<String>) {
        self.history.push(Turn::assistant(text));
        self.touch();
    }

    /// The system turn built from the active profile's instruction
    pub fn system_turn(&self) -> Turn {
        Turn::system(self.profile.system_instruction.clone())
    }

    /// Build the outbound message list: the system turn followed by the last
    /// `max_turns` dialogue entries, oldest first.
    ///
    /// Never longer than `max_turns + 1`.
    pub fn build_request_window(&self, max_turns: usize) -> Vec<Turn> {
        self.build_request_window_with(&LastTurns::new(max_turns))
    }

    /// Build the outbound message list with a custom selection policy
    pub fn build_request_window_with(&self, policy: &dyn WindowPolicy) -> Vec<Turn> {
        let selected = policy.select(&self.history);

        let mut window = Vec::with_capacity(selected.len() + 1);
        window.push(self.system_turn());
        window.extend(selected.into_iter().filter(|t| !t.is_system()).cloned());

        tracing::debug!(
            session_id = %self.id,
            policy = policy.name(),
            history_len = self.history.len(),
            window_len = window.len(),
            "Built request window"
        );

        window
    }

    /// Make `new_profile` the active profile.
    ///
    /// With `clear_history` the history is reset and a display notice naming
    /// the new model is recorded. The notice is never sent to the model.
    ///
    /// # Errors
    ///
    /// Returns `InvalidProfile` if the new profile has no endpoint or API
    /// key. The session is untouched in that case.
    pub fn switch_profile(&mut self, new_profile: Profile, clear_history: bool) -> Result<()> {
        new_profile.validate()?;

        let previous = std::mem::replace(&mut self.profile, new_profile);

        if clear_history {
            self.history.clear();
            self.history.push(Turn::system(format!(
                "Agent is active! Model: {}",
                self.profile.model_id
            )));
        }
        self.touch();

        tracing::info!(
            session_id = %self.id,
            from = %previous.name,
            to = %self.profile.name,
            model = %self.profile.model_id,
            cleared = clear_history,
            "Switched profile"
        );

        Ok(())
    }

    /// Empty the history; keeps the active profile
    pub fn clear(&mut self) {
        let dropped = self.history.len();
        self.history.clear();
        self.touch();

        tracing::info!(session_id = %self.id, dropped, "Cleared conversation history");
    }
}
