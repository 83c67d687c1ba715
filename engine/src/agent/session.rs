//! Conversation session
//!
//! Owns the ordered message log and identity of one dialogue. The log is
//! bounded by [`trim_history`] after every turn.

use anyhow::Result;
use tracing::warn;
use uuid::Uuid;

use super::observer::TurnObserver;
use super::reasoner::Reasoner;
use crate::llm::{Message, MessageKind};

/// Default number of messages kept after a turn
pub const DEFAULT_MAX_MESSAGES: usize = 10;

/// Reply used when a turn produced no visible text
pub const FALLBACK_REPLY: &str = "could not generate a response, try again";

/// Return the text of the last non-empty assistant message after a point.
///
/// The scan covers messages after `since` (a message id) or, without one,
/// after the most recent user message. Earlier turns are never consulted.
pub fn extract_reply(messages: &[Message], since: Option<&str>) -> String {
    let start = match since {
        Some(id) => messages
            .iter()
            .position(|m| m.id() == id)
            .map(|i| i + 1)
            .unwrap_or(messages.len()),
        None => messages
            .iter()
            .rposition(|m| matches!(m, Message::User(_)))
            .map(|i| i + 1)
            .unwrap_or(0),
    };

    messages[start..]
        .iter()
        .rev()
        .find_map(|m| match m {
            Message::Assistant(a) if !a.content.trim().is_empty() => Some(a.content.clone()),
            _ => None,
        })
        .unwrap_or_else(|| FALLBACK_REPLY.to_string())
}

/// Drop the oldest messages so at most `max_messages` remain.
///
/// The cut is moved forward past leading tool results so the retained window
/// never starts with a result whose request was removed. Returns the number
/// of messages removed.
pub fn trim_history(messages: &mut Vec<Message>, max_messages: usize) -> usize {
    if messages.len() <= max_messages {
        return 0;
    }

    let mut cut = messages.len() - max_messages;
    while cut < messages.len() && matches!(messages[cut], Message::ToolResult(_)) {
        cut += 1;
    }

    messages.drain(..cut);
    cut
}

/// One ongoing dialogue
#[derive(Debug, Clone)]
pub struct ConversationSession {
    session_id: String,
    thread_id: String,
    user_id: Option<String>,
    messages: Vec<Message>,
    next_seq: u64,
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationSession {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            thread_id: Uuid::new_v4().to_string(),
            user_id: None,
            messages: Vec::new(),
            next_seq: 0,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn set_user_id(&mut self, user_id: Option<String>) {
        self.user_id = user_id;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Record a message, assigning its ordinal
    pub fn push(&mut self, mut message: Message) {
        message.set_seq(self.next_seq);
        self.next_seq += 1;
        self.messages.push(message);
    }

    /// Run one turn and return the visible reply.
    ///
    /// A reasoning failure is returned to the caller unchanged. Tool exchanges
    /// completed before the failure stay in the log, since their store writes
    /// already happened. Without any, the user message is removed again.
    pub async fn append_turn(
        &mut self,
        user_text: &str,
        system: &str,
        reasoner: &dyn Reasoner,
        observer: &dyn TurnObserver,
    ) -> Result<String> {
        let user = Message::user(user_text);
        let user_id = user.id().to_string();
        self.push(user);

        let mut produced = Vec::new();
        if let Err(e) = reasoner
            .run_turn(system, &self.messages, &mut produced, observer)
            .await
        {
            self.keep_completed_steps(produced);
            return Err(e);
        }

        for message in produced {
            self.push(message);
        }

        Ok(extract_reply(&self.messages, Some(&user_id)))
    }

    fn keep_completed_steps(&mut self, mut produced: Vec<Message>) {
        let completed = produced
            .iter()
            .rposition(|m| m.kind() == MessageKind::ToolResult)
            .map_or(0, |last| last + 1);
        produced.truncate(completed);

        if produced.is_empty() {
            self.messages.pop();
            self.next_seq -= 1;
            return;
        }

        let tools: Vec<&str> = produced.iter().filter_map(Message::tool_name).collect();
        warn!(
            "Turn failed after tools ran ({}); keeping {} completed messages",
            tools.join(", "),
            produced.len()
        );
        for message in produced {
            self.push(message);
        }
    }

    pub fn trim_history(&mut self, max_messages: usize) -> usize {
        trim_history(&mut self.messages, max_messages)
    }

    /// Start over with fresh identifiers and an empty log. `user_id` is kept.
    pub fn reset(&mut self) {
        self.session_id = Uuid::new_v4().to_string();
        self.thread_id = Uuid::new_v4().to_string();
        self.messages.clear();
        self.next_seq = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::observer::NoopObserver;
    use crate::llm::{MessageKind, ToolCall};
    use async_trait::async_trait;

    fn call(id: &str) -> Message {
        Message::assistant_with_tools("", vec![ToolCall::new(id, "list_spaces", "{}")])
    }

    fn result(id: &str) -> Message {
        Message::tool_result(id, "list_spaces", "{}")
    }

    #[test]
    fn test_extract_reply_takes_last_non_empty() {
        let messages = vec![
            Message::user("list"),
            Message::assistant("Let me check"),
            call("c1"),
            result("c1"),
            Message::assistant("You have two spaces"),
            Message::assistant("   "),
        ];
        assert_eq!(extract_reply(&messages, None), "You have two spaces");
    }

    #[test]
    fn test_extract_reply_ignores_previous_turn() {
        let messages = vec![
            Message::user("first"),
            Message::assistant("first reply"),
            Message::user("second"),
            call("c1"),
            result("c1"),
        ];
        assert_eq!(extract_reply(&messages, None), FALLBACK_REPLY);
    }

    #[test]
    fn test_extract_reply_since_id() {
        let marker = Message::user("second");
        let since = marker.id().to_string();
        let messages = vec![
            Message::user("first"),
            Message::assistant("old"),
            marker,
            Message::assistant("new"),
        ];
        assert_eq!(extract_reply(&messages, Some(&since)), "new");
        assert_eq!(extract_reply(&messages, Some("missing")), FALLBACK_REPLY);
    }

    #[test]
    fn test_trim_history_noop_within_bound() {
        let mut messages: Vec<Message> = (0..10).map(|i| Message::user(i.to_string())).collect();
        assert_eq!(trim_history(&mut messages, 10), 0);
        assert_eq!(messages.len(), 10);
    }

    #[test]
    fn test_trim_history_skips_orphaned_results() {
        // user, call, result, result, then 9 more messages
        let mut messages = vec![
            Message::user("u0"),
            Message::assistant_with_tools(
                "",
                vec![
                    ToolCall::new("a", "list_spaces", "{}"),
                    ToolCall::new("b", "list_spaces", "{}"),
                ],
            ),
            result("a"),
            result("b"),
        ];
        for i in 0..9 {
            messages.push(Message::user(format!("u{}", i + 1)));
        }
        assert_eq!(messages.len(), 13);

        // 13 - 10 = 3 would start on the second result
        let removed = trim_history(&mut messages, 10);
        assert_eq!(removed, 4);
        assert_eq!(messages.len(), 9);
        assert_eq!(messages[0].kind(), MessageKind::User);
    }

    #[test]
    fn test_push_assigns_sequence() {
        let mut session = ConversationSession::new();
        session.push(Message::user("a"));
        session.push(Message::assistant("b"));
        let seqs: Vec<u64> = session.messages().iter().map(Message::seq).collect();
        assert_eq!(seqs, vec![0, 1]);
    }

    #[test]
    fn test_reset_regenerates_ids_and_keeps_user() {
        let mut session = ConversationSession::new();
        session.set_user_id(Some("42".to_string()));
        session.push(Message::user("hello"));
        let (old_session, old_thread) = (
            session.session_id().to_string(),
            session.thread_id().to_string(),
        );

        session.reset();

        assert_ne!(session.session_id(), old_session);
        assert_ne!(session.thread_id(), old_thread);
        assert!(session.messages().is_empty());
        assert_eq!(session.user_id(), Some("42"));
    }

    struct Echo;

    #[async_trait]
    impl Reasoner for Echo {
        async fn run_turn(
            &self,
            _system: &str,
            history: &[Message],
            turn: &mut Vec<Message>,
            _observer: &dyn TurnObserver,
        ) -> Result<()> {
            let last = history.last().map(Message::content).unwrap_or_default();
            turn.push(Message::assistant(format!("echo: {}", last)));
            Ok(())
        }
    }

    struct Broken;

    #[async_trait]
    impl Reasoner for Broken {
        async fn run_turn(
            &self,
            _system: &str,
            _history: &[Message],
            _turn: &mut Vec<Message>,
            _observer: &dyn TurnObserver,
        ) -> Result<()> {
            anyhow::bail!("provider down")
        }
    }

    /// Runs one tool, then fails while asking for more
    struct FailsAfterTool;

    #[async_trait]
    impl Reasoner for FailsAfterTool {
        async fn run_turn(
            &self,
            _system: &str,
            _history: &[Message],
            turn: &mut Vec<Message>,
            _observer: &dyn TurnObserver,
        ) -> Result<()> {
            turn.push(Message::assistant_with_tools(
                "",
                vec![ToolCall::new("c1", "create_task", "{}")],
            ));
            turn.push(Message::tool_result("c1", "create_task", r#"{"id":"t1"}"#));
            turn.push(Message::assistant_with_tools(
                "",
                vec![ToolCall::new("c2", "list_spaces", "{}")],
            ));
            anyhow::bail!("timed out")
        }
    }

    #[tokio::test]
    async fn test_append_turn_records_and_extracts() {
        let mut session = ConversationSession::new();
        let reply = session.append_turn("hi", "system", &Echo, &NoopObserver).await.unwrap();

        assert_eq!(reply, "echo: hi");
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[1].seq(), 1);
    }

    #[tokio::test]
    async fn test_append_turn_failure_rolls_back() {
        let mut session = ConversationSession::new();
        session.append_turn("hi", "system", &Echo, &NoopObserver).await.unwrap();

        let err = session.append_turn("again", "system", &Broken, &NoopObserver).await.unwrap_err();
        assert_eq!(err.to_string(), "provider down");
        assert_eq!(session.messages().len(), 2);

        session.push(Message::user("next"));
        assert_eq!(session.messages()[2].seq(), 2);
    }

    #[tokio::test]
    async fn test_append_turn_failure_keeps_completed_tools() {
        let mut session = ConversationSession::new();

        let err = session
            .append_turn("add a task", "system", &FailsAfterTool, &NoopObserver)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "timed out");

        let kinds: Vec<MessageKind> = session.messages().iter().map(Message::kind).collect();
        assert_eq!(
            kinds,
            vec![MessageKind::User, MessageKind::Assistant, MessageKind::ToolResult]
        );
        assert_eq!(session.messages()[2].tool_name(), Some("create_task"));
        assert_eq!(session.messages()[2].seq(), 2);
    }
}
