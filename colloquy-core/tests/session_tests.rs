//! Integration tests for conversation sessions
//!
//! Exercise the public API end to end: profiles from a store, sessions,
//! request windows, profile switching and model round trips.

use std::time::Duration;

use async_trait::async_trait;
use colloquy_core::prelude::*;
use colloquy_core::llm::ScriptedProvider;

fn scenario_profile() -> Profile {
    Profile::new("default", "https://x", "k", "m").with_system_instruction("be terse")
}

fn same(window: &[Turn], expected: &[(MessageRole, &str)]) -> bool {
    window.len() == expected.len()
        && window
            .iter()
            .zip(expected)
            .all(|(turn, (role, content))| turn.role == *role && turn.content == *content)
}

#[test]
fn test_scenario_first_request() {
    let store = MemoryProfileStore::new();
    let mut profiles = store.load_or_default().unwrap();
    assert!(profiles.is_empty());

    profiles.save(scenario_profile());
    store.save(&profiles).unwrap();

    let profile = store
        .load()
        .unwrap()
        .and_then(|set| set.get("default").cloned())
        .unwrap();

    let mut session = ConversationSession::create(profile).unwrap();
    session.append_user_turn("hi").unwrap();

    let window = session.build_request_window(10);
    assert!(same(
        &window,
        &[(MessageRole::System, "be terse"), (MessageRole::User, "hi")]
    ));
}

#[test]
fn test_window_never_exceeds_bound() {
    let mut session = ConversationSession::create(scenario_profile()).unwrap();

    for i in 0..37 {
        match i % 3 {
            0 | 1 => session.append_user_turn(format!("user {i}")).unwrap(),
            _ => session.append_assistant_turn(format!("assistant {i}")),
        }

        let window = session.build_request_window(10);
        assert!(window.len() <= 11);
        assert_eq!(window[0].role, MessageRole::System);
        assert_eq!(window[0].content, "be terse");
        assert!(window[1..].iter().all(|t| t.role != MessageRole::System));
    }
}

#[test]
fn test_window_keeps_most_recent_last() {
    let mut session = ConversationSession::create(scenario_profile()).unwrap();
    for i in 0..12 {
        session.append_user_turn(format!("{i}")).unwrap();
    }

    let window = session.build_request_window(10);
    let contents: Vec<&str> = window[1..].iter().map(|t| t.content.as_str()).collect();
    assert_eq!(contents, vec!["2", "3", "4", "5", "6", "7", "8", "9", "10", "11"]);
}

#[test]
fn test_switch_with_clear_drops_prior_dialogue() {
    let mut session = ConversationSession::create(scenario_profile()).unwrap();
    session.append_user_turn("secret plan").unwrap();
    session.append_assistant_turn("noted");

    let other = Profile::new("other", "https://y", "k2", "m2").with_system_instruction("be kind");
    session.switch_profile(other, true).unwrap();

    let window = session.build_request_window(10);
    assert!(same(&window, &[(MessageRole::System, "be kind")]));

    session.append_user_turn("hello again").unwrap();
    let window = session.build_request_window(10);
    assert!(same(
        &window,
        &[(MessageRole::System, "be kind"), (MessageRole::User, "hello again")]
    ));
}

#[test]
fn test_switch_without_clear_preserves_turns() {
    let mut session = ConversationSession::create(scenario_profile()).unwrap();
    session.append_user_turn("one").unwrap();
    session.append_assistant_turn("two");
    session.append_user_turn("three").unwrap();
    let before: Vec<(MessageRole, String)> = session
        .history()
        .iter()
        .map(|t| (t.role, t.content.clone()))
        .collect();

    session
        .switch_profile(Profile::new("other", "https://y", "k2", "m2"), false)
        .unwrap();

    let after: Vec<(MessageRole, String)> = session
        .history()
        .iter()
        .map(|t| (t.role, t.content.clone()))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_empty_input_leaves_history_unchanged() {
    let mut session = ConversationSession::create(scenario_profile()).unwrap();
    session.append_user_turn("hi").unwrap();

    for text in ["", "   "] {
        let err = session.append_user_turn(text).unwrap_err();
        assert!(matches!(err, ColloquyError::EmptyInput));
        assert!(err.is_precondition());
    }
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_create_rejects_empty_endpoint() {
    let err = ConversationSession::create(Profile::new("p", "", "k", "m")).unwrap_err();
    assert!(matches!(err, ColloquyError::InvalidProfile(_)));
}

#[test]
fn test_session_holds_profile_by_value() {
    let mut profiles = ProfileSet::new();
    profiles.save(scenario_profile());

    let session =
        ConversationSession::create(profiles.get("default").cloned().unwrap()).unwrap();

    profiles.save(scenario_profile().with_system_instruction("be verbose"));

    let window = session.build_request_window(10);
    assert_eq!(window[0].content, "be terse");
}

#[tokio::test]
async fn test_failed_exchange_keeps_only_user_turn() {
    let mut session = ConversationSession::create(scenario_profile()).unwrap();
    let client = ScriptedProvider::new().reply("first reply").fail("network down");
    let options = ExchangeOptions::default();

    exchange(&mut session, &client, "first", &options).await.unwrap();
    assert_eq!(session.history().len(), 2);

    let result = exchange(&mut session, &client, "second", &options).await;
    assert!(result.is_err());
    assert_eq!(session.history().len(), 3);
    assert_eq!(
        session.history().last().map(|t| (t.role, t.content.as_str())),
        Some((MessageRole::User, "second"))
    );
}

struct SlowProvider;

#[async_trait]
impl LLMProvider for SlowProvider {
    async fn generate_request(&self, _request: &LLMRequest) -> Result<LLMResponse> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(LLMResponse {
            content: "too late".to_string(),
            usage: None,
        })
    }
}

#[tokio::test(start_paused = true)]
async fn test_exchange_times_out() {
    let mut session = ConversationSession::create(scenario_profile()).unwrap();
    let options = ExchangeOptions::default().with_timeout(Duration::from_secs(5));

    let err = exchange(&mut session, &SlowProvider, "hi", &options)
        .await
        .unwrap_err();

    assert!(matches!(err, ColloquyError::Timeout(d) if d == Duration::from_secs(5)));
    assert_eq!(session.history().len(), 1);
}
