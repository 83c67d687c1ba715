//! Integration tests for the agent engine
//!
//! A scripted provider stands in for the language model. Each test queues
//! the exact steps the model would take and checks what the engine does
//! with them.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use oopsie_engine::agent::{AgentEngine, EngineSettings, TurnObserver, FALLBACK_REPLY};
use oopsie_engine::cache::SpaceCache;
use oopsie_engine::llm::{
    LLMError, LLMProvider, LLMResponse, Message, MessageKind, ToolCall, ToolDefinition,
};
use oopsie_engine::store::InMemoryTaskStore;
use oopsie_engine::tools::ToolBridge;
use oopsie_sdk::errors::EngineError;
use oopsie_sdk::{Space, TaskStore};

/// Provider that answers from a queue and records every system instruction
#[derive(Default)]
struct ScriptedProvider {
    steps: Mutex<VecDeque<Result<LLMResponse, LLMError>>>,
    systems: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn push(&self, step: Result<LLMResponse, LLMError>) {
        self.steps.lock().unwrap().push_back(step);
    }

    fn call(&self, id: &str, name: &str, args: &str) {
        self.push(Ok(LLMResponse::with_tool_calls(
            "",
            vec![ToolCall::new(id, name, args)],
        )));
    }

    fn say(&self, text: &str) {
        self.push(Ok(LLMResponse::text(text)));
    }

    fn systems(&self) -> Vec<String> {
        self.systems.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        system: &str,
        _messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse, LLMError> {
        assert_eq!(tools.len(), 9);
        self.systems.lock().unwrap().push(system.to_string());
        self.steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LLMError::Unknown("script exhausted".to_string())))
    }
}

struct Harness {
    engine: AgentEngine,
    provider: Arc<ScriptedProvider>,
    store: Arc<InMemoryTaskStore>,
    cache: Arc<SpaceCache>,
}

async fn harness() -> Harness {
    let store = Arc::new(InMemoryTaskStore::with_spaces(vec![Space::new("s1", "Home")]));
    let dyn_store: Arc<dyn TaskStore> = Arc::clone(&store) as Arc<dyn TaskStore>;
    let cache = Arc::new(SpaceCache::new(Arc::clone(&dyn_store)));
    cache.load().await;

    let bridge = Arc::new(ToolBridge::new(dyn_store, Arc::clone(&cache)));
    let provider = Arc::new(ScriptedProvider::default());
    let engine = AgentEngine::new(
        Arc::clone(&provider) as Arc<dyn LLMProvider>,
        bridge,
        Arc::clone(&cache),
        EngineSettings::default(),
    );

    Harness {
        engine,
        provider,
        store,
        cache,
    }
}

fn tool_results(history: &[Message]) -> Vec<&str> {
    history
        .iter()
        .filter(|m| m.kind() == MessageKind::ToolResult)
        .map(Message::content)
        .collect()
}

#[tokio::test]
async fn test_created_space_is_listed_on_next_turn() {
    let mut h = harness().await;

    h.provider.call("c1", "create_space", r#"{"name":"Work"}"#);
    h.provider.say("Created the Work space.");
    let reply = h.engine.process_message("create a space called Work").await.unwrap();
    assert_eq!(reply, "Created the Work space.");

    // No reload between turns
    assert!(h.cache.get_spaces().contains_key("Work"));

    h.provider.call("c2", "list_spaces", "{}");
    h.provider.say("You have Home and Work.");
    let reply = h.engine.process_message("list my spaces").await.unwrap();
    assert_eq!(reply, "You have Home and Work.");

    let results = tool_results(h.engine.history());
    let listing = results.last().unwrap();
    assert!(listing.contains("\"Work\""));
    assert!(listing.contains("\"Home\""));

    // The second turn's instruction already advertises the new space
    let systems = h.provider.systems();
    assert!(!systems[0].contains("- Work (id:"));
    assert!(systems[2].contains("- Work (id:"));
    assert!(systems[2].contains("- Home (id: s1)"));
}

#[tokio::test]
async fn test_create_task_scenario() {
    let mut h = harness().await;

    h.provider.call(
        "c1",
        "create_task",
        r#"{"space_id":"s1","title":"Buy milk"}"#,
    );
    h.provider.say("Added \"Buy milk\" to Home.");
    h.engine.process_message("add buy milk to Home").await.unwrap();

    let results = tool_results(h.engine.history());
    let task: serde_json::Value = serde_json::from_str(results[0]).unwrap();
    assert_eq!(task["title"], "Buy milk");
    assert_eq!(task["status"], "Pending");
    assert_eq!(task["priority"], "Medium");
    assert!(task["due_date"].is_null());

    let stored = h.store.search_tasks("milk").await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn test_reset_discards_history_and_keeps_user() {
    let mut h = harness().await;
    h.engine.set_user_id(Some("42".to_string()));

    h.provider.say("Hello!");
    h.engine.process_message("hi").await.unwrap();
    assert_eq!(h.engine.history().len(), 2);

    let session_id = h.engine.session_id().to_string();
    let thread_id = h.engine.thread_id().to_string();
    h.engine.reset();

    assert_ne!(h.engine.session_id(), session_id);
    assert_ne!(h.engine.thread_id(), thread_id);
    assert!(h.engine.history().is_empty());
    assert_eq!(h.engine.user_id(), Some("42"));
}

#[tokio::test]
async fn test_reasoning_failure_propagates() {
    let mut h = harness().await;
    h.provider
        .push(Err(LLMError::ProviderUnavailable("connection refused".to_string())));

    let err = h.engine.process_message("hi").await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::LLMProvider(_))
    ));
    assert!(h.engine.history().is_empty());
}

#[tokio::test]
async fn test_failed_turn_keeps_committed_tool_exchange() {
    let mut h = harness().await;

    h.provider.call(
        "c1",
        "create_task",
        r#"{"space_id":"s1","title":"Buy milk"}"#,
    );
    h.provider.push(Err(LLMError::ProviderUnavailable("connection reset".to_string())));
    assert!(h.engine.process_message("add buy milk").await.is_err());

    let kinds: Vec<MessageKind> = h.engine.history().iter().map(Message::kind).collect();
    assert_eq!(
        kinds,
        vec![MessageKind::User, MessageKind::Assistant, MessageKind::ToolResult]
    );
    assert!(tool_results(h.engine.history())[0].contains("Buy milk"));

    // The next turn builds on the kept exchange
    h.provider.say("Buy milk is already on your list.");
    let reply = h.engine.process_message("add buy milk").await.unwrap();
    assert_eq!(reply, "Buy milk is already on your list.");
    assert_eq!(h.engine.history().len(), 5);
    assert_eq!(h.store.search_tasks("milk").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_tool_failure_does_not_abort_turn() {
    let mut h = harness().await;
    h.store.set_unavailable(true);

    h.provider.call("c1", "get_all_tasks", "{}");
    h.provider.say("The task store is down right now.");
    let reply = h.engine.process_message("what do I have to do?").await.unwrap();

    assert_eq!(reply, "The task store is down right now.");
    let results = tool_results(h.engine.history());
    let payload: serde_json::Value = serde_json::from_str(results[0]).unwrap();
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .starts_with("Upstream unavailable"));
}

#[tokio::test]
async fn test_turn_without_text_uses_fallback() {
    let mut h = harness().await;

    h.provider.say("Earlier answer");
    h.engine.process_message("first").await.unwrap();

    h.provider.call("c1", "list_spaces", "{}");
    h.provider.say("   ");
    let reply = h.engine.process_message("second").await.unwrap();

    assert_eq!(reply, FALLBACK_REPLY);
}

#[tokio::test]
async fn test_history_stays_bounded() {
    let mut h = harness().await;

    for i in 0..6 {
        h.provider.call(&format!("c{}", i), "list_spaces", "{}");
        h.provider.say(&format!("answer {}", i));
        let reply = h.engine.process_message(&format!("turn {}", i)).await.unwrap();
        assert_eq!(reply, format!("answer {}", i));

        let history = h.engine.history();
        assert!(history.len() <= 10);
        assert_ne!(history[0].kind(), MessageKind::ToolResult);
    }
}

#[derive(Default)]
struct CountingObserver {
    starts: AtomicUsize,
    tools: AtomicUsize,
    failures: AtomicUsize,
}

impl TurnObserver for CountingObserver {
    fn on_turn_start(&self, _session_id: &str, _user_text: &str) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }

    fn on_tool_call(&self, _name: &str, _ok: bool) {
        self.tools.fetch_add(1, Ordering::SeqCst);
    }

    fn on_turn_end(&self, _session_id: &str, outcome: Result<&str, &str>) {
        if outcome.is_err() {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[tokio::test]
async fn test_observer_sees_turns_and_tools() {
    let h = harness().await;
    let observer = Arc::new(CountingObserver::default());
    let mut engine = h.engine.with_observer(Arc::clone(&observer) as Arc<dyn TurnObserver>);

    h.provider.call("c1", "list_spaces", "{}");
    h.provider.say("Home");
    engine.process_message("spaces?").await.unwrap();

    h.provider.push(Err(LLMError::Timeout));
    assert!(engine.process_message("again").await.is_err());

    assert_eq!(observer.starts.load(Ordering::SeqCst), 2);
    assert_eq!(observer.tools.load(Ordering::SeqCst), 1);
    assert_eq!(observer.failures.load(Ordering::SeqCst), 1);
}
