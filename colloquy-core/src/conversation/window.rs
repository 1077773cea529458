//! Request Window Policies

use super::history::{ConversationHistory, Turn};

/// Selects which history entries go out with a request.
///
/// The synthesized system turn is not part of the policy's output; the
/// session always prepends it.
pub trait WindowPolicy: Send + Sync {
    /// Pick the history turns to send, oldest first
    fn select<'a>(&self, history: &'a ConversationHistory) -> Vec<&'a Turn>;

    /// Get the policy name
    fn name(&self) -> &'static str;
}

/// Keeps the last `max_turns` dialogue entries.
///
/// `max_turns` counts raw entries (user and assistant mixed), not
/// exchanges. System-role entries in history are display notices: they are
/// dropped before counting, so a notice never takes a slot in the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastTurns {
    max_turns: usize,
}

impl LastTurns {
    pub fn new(max_turns: usize) -> Self {
        Self { max_turns }
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }
}

impl WindowPolicy for LastTurns {
    fn select<'a>(&self, history: &'a ConversationHistory) -> Vec<&'a Turn> {
        let dialogue: Vec<&Turn> = history.iter().filter(|t| !t.is_system()).collect();
        let start = dialogue.len().saturating_sub(self.max_turns);
        dialogue[start..].to_vec()
    }

    fn name(&self) -> &'static str {
        "last_turns"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(n: usize) -> ConversationHistory {
        let mut history = ConversationHistory::new();
        for i in 0..n {
            if i % 2 == 0 {
                history.push(Turn::user(format!("u{i}")));
            } else {
                history.push(Turn::assistant(format!("a{i}")));
            }
        }
        history
    }

    #[test]
    fn test_last_turns_under_limit() {
        let history = history(3);
        let selected = LastTurns::new(10).select(&history);
        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0].content, "u0");
    }

    #[test]
    fn test_last_turns_slices_tail() {
        let history = history(15);
        let selected = LastTurns::new(10).select(&history);
        assert_eq!(selected.len(), 10);
        assert_eq!(selected[0].content, "a5");
        assert_eq!(selected[9].content, "u14");
    }

    #[test]
    fn test_zero_selects_nothing() {
        let history = history(4);
        assert!(LastTurns::new(0).select(&history).is_empty());
    }

    #[test]
    fn test_system_notices_do_not_take_slots() {
        let mut history = ConversationHistory::new();
        history.push(Turn::system("Agent is active! Model: m"));
        history.push(Turn::user("one"));
        history.push(Turn::assistant("two"));
        history.push(Turn::system("notice"));
        history.push(Turn::user("three"));

        let selected = LastTurns::new(3).select(&history);
        let contents: Vec<&str> = selected.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_policy_name() {
        assert_eq!(LastTurns::new(1).name(), "last_turns");
    }
}
