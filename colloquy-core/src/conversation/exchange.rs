//! Request/response round trip against a model client

use std::time::Duration;

use crate::config::ColloquyConfig;
use crate::error::{ColloquyError, Result};
use crate::llm::{LLMProvider, LLMRequest};

use super::session::ConversationSession;

/// Per-call settings for [`exchange`]
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeOptions {
    /// Dialogue entries sent along with the system turn
    pub max_turns: usize,
    /// Upper bound on the model call
    pub timeout: Duration,
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
    /// Static tool declarations, passed through untouched
    pub tools: Vec<serde_json::Value>,
}

impl Default for ExchangeOptions {
    fn default() -> Self {
        Self::from_config(&ColloquyConfig::default())
    }
}

impl ExchangeOptions {
    /// Take window size and timeout from `[session]`, sampling from `[http]`
    pub fn from_config(config: &ColloquyConfig) -> Self {
        Self {
            max_turns: config.session.max_turns,
            timeout: config.session.timeout,
            temperature: Some(config.http.temperature),
            max_tokens: config.http.max_tokens,
            tools: Vec::new(),
        }
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_tools(mut self, tools: Vec<serde_json::Value>) -> Self {
        self.tools = tools;
        self
    }

    fn request(&self, session: &ConversationSession) -> LLMRequest {
        let mut request = LLMRequest::from_window(&session.build_request_window(self.max_turns))
            .with_tools(self.tools.clone());
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        request
    }
}

/// Send one user message and record the reply.
///
/// The user turn is recorded first. On any failure (provider error, timeout,
/// empty reply) the error is returned and history holds exactly the prior
/// turns plus that one user turn. Nothing is retried.
///
/// Taking `&mut` keeps a session to one in-flight request.
///
/// # Errors
///
/// Returns `EmptyInput` for a blank message, `Timeout` if the call outlives
/// `options.timeout`, or the provider's error.
pub async fn exchange(
    session: &mut ConversationSession,
    client: &dyn LLMProvider,
    text: &str,
    options: &ExchangeOptions,
) -> Result<String> {
    session.append_user_turn(text)?;

    let request = options.request(session);
    let info = client.model_info();

    tracing::debug!(
        session_id = %session.id(),
        provider = %info.provider,
        model = %info.model_name,
        messages = request.messages.len(),
        "Sending request"
    );

    let response = match tokio::time::timeout(options.timeout, client.generate_request(&request))
        .await
    {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            tracing::warn!(session_id = %session.id(), error = %e, "Model call failed");
            return Err(e);
        }
        Err(_) => {
            tracing::warn!(
                session_id = %session.id(),
                timeout = ?options.timeout,
                "Model call timed out"
            );
            return Err(ColloquyError::Timeout(options.timeout));
        }
    };

    if response.content.trim().is_empty() {
        tracing::warn!(session_id = %session.id(), "Model returned an empty reply");
        return Err(ColloquyError::Provider("empty reply".to_string()));
    }

    if let Some(usage) = &response.usage {
        tracing::debug!(
            session_id = %session.id(),
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "Received reply"
        );
    }

    session.append_assistant_turn(response.content.clone());
    Ok(response.content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{MessageRole, ScriptedProvider};
    use crate::profile::Profile;

    fn session() -> ConversationSession {
        ConversationSession::create(
            Profile::new("work", "https://x", "k", "m").with_system_instruction("be terse"),
        )
        .unwrap()
    }

    #[test]
    fn test_options_from_config() {
        let mut config = ColloquyConfig::default();
        config.session.max_turns = 4;
        config.http.max_tokens = Some(256);

        let options = ExchangeOptions::from_config(&config);
        assert_eq!(options.max_turns, 4);
        assert_eq!(options.timeout, Duration::from_secs(60));
        assert_eq!(options.temperature, Some(1.0));
        assert_eq!(options.max_tokens, Some(256));
        assert!(options.tools.is_empty());
    }

    #[tokio::test]
    async fn test_exchange_records_reply() {
        let mut session = session();
        let client = ScriptedProvider::new().reply("hello");

        let reply = exchange(&mut session, &client, "hi", &ExchangeOptions::default())
            .await
            .unwrap();

        assert_eq!(reply, "hello");
        assert_eq!(session.history().len(), 2);

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages[0].role, MessageRole::System);
        assert_eq!(requests[0].messages[1].content, "hi");
        assert_eq!(requests[0].temperature, Some(1.0));
    }

    #[tokio::test]
    async fn test_exchange_failure_leaves_user_turn_only() {
        let mut session = session();
        let client = ScriptedProvider::new().fail("quota exceeded");

        let result = exchange(&mut session, &client, "hi", &ExchangeOptions::default()).await;

        assert!(matches!(result, Err(ColloquyError::Provider(m)) if m == "quota exceeded"));
        assert_eq!(session.history().len(), 1);
        assert_eq!(
            session.history().last().map(|t| t.role),
            Some(MessageRole::User)
        );
    }

    #[tokio::test]
    async fn test_exchange_empty_input_skips_client() {
        let mut session = session();
        let client = ScriptedProvider::new().reply("unused");

        let result = exchange(&mut session, &client, "  ", &ExchangeOptions::default()).await;

        assert!(matches!(result, Err(ColloquyError::EmptyInput)));
        assert!(session.history().is_empty());
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_exchange_blank_reply_is_failure() {
        let mut session = session();
        let client = ScriptedProvider::new().reply(" \n");

        let result = exchange(&mut session, &client, "hi", &ExchangeOptions::default()).await;

        assert!(matches!(result, Err(ColloquyError::Provider(_))));
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn test_exchange_passes_tools_and_window() {
        let mut session = session();
        session.append_user_turn("old").unwrap();
        session.append_assistant_turn("older reply");

        let client = ScriptedProvider::new().reply("ok");
        let options = ExchangeOptions::default()
            .with_max_turns(1)
            .with_tools(vec![serde_json::json!({"name": "get_current_time"})]);

        exchange(&mut session, &client, "new", &options).await.unwrap();

        let request = &client.requests()[0];
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[1].content, "new");
        assert_eq!(request.tools.len(), 1);
    }
}
