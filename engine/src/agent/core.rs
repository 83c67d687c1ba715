//! Agent Engine
//!
//! Drives one conversation. Each call to [`AgentEngine::process_message`]:
//!
//! 1. Rebuilds the system instruction (local date, cached spaces)
//! 2. Runs the turn through the reasoner
//! 3. Extracts the visible reply
//! 4. Trims the history to `max_messages`
//!
//! Turns on one engine are sequential; `process_message` takes `&mut self`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use chrono_tz::Tz;
use tracing::{debug, info};

use super::observer::{NoopObserver, TurnObserver};
use super::prompt::build_system_prompt;
use super::reasoner::{Reasoner, ToolLoop, DEFAULT_LLM_TIMEOUT, DEFAULT_MAX_ITERATIONS};
use super::session::{ConversationSession, DEFAULT_MAX_MESSAGES};
use crate::cache::SpaceCache;
use crate::llm::{LLMProvider, Message};
use crate::tools::ToolBridge;

/// Engine settings
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Timezone used for dates in the system instruction
    pub timezone: Tz,

    /// Messages retained after each turn
    pub max_messages: usize,

    /// Provider calls per turn
    pub max_iterations: usize,

    /// Timeout of one provider call
    pub llm_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Europe::Madrid,
            max_messages: DEFAULT_MAX_MESSAGES,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            llm_timeout: DEFAULT_LLM_TIMEOUT,
        }
    }
}

/// Conversational engine for one end user
pub struct AgentEngine {
    reasoner: Arc<dyn Reasoner>,
    cache: Arc<SpaceCache>,
    session: ConversationSession,
    settings: EngineSettings,
    observer: Arc<dyn TurnObserver>,
}

impl AgentEngine {
    /// Engine reasoning with a [`ToolLoop`] over `provider` and `bridge`
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        bridge: Arc<ToolBridge>,
        cache: Arc<SpaceCache>,
        settings: EngineSettings,
    ) -> Self {
        let reasoner = ToolLoop::new(provider, bridge)
            .with_limits(settings.max_iterations, settings.llm_timeout);
        Self::with_reasoner(Arc::new(reasoner), cache, settings)
    }

    /// Engine with a custom reasoner
    pub fn with_reasoner(
        reasoner: Arc<dyn Reasoner>,
        cache: Arc<SpaceCache>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            reasoner,
            cache,
            session: ConversationSession::new(),
            settings,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn TurnObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// System instruction for a turn starting now
    pub fn system_prompt(&self) -> String {
        let now = Utc::now().with_timezone(&self.settings.timezone);
        build_system_prompt(now, &self.cache.get_spaces())
    }

    /// Process one user message and return the reply.
    ///
    /// # Errors
    ///
    /// Reasoning failures (provider error, timeout, too many iterations) abort
    /// the turn and are returned. Tool failures never are.
    pub async fn process_message(&mut self, text: &str) -> Result<String> {
        let session_id = self.session.session_id().to_string();
        self.observer.on_turn_start(&session_id, text);

        let system = self.system_prompt();
        let outcome = self
            .session
            .append_turn(
                text,
                &system,
                self.reasoner.as_ref(),
                self.observer.as_ref(),
            )
            .await
            .context("Failed to process message");

        let removed = self.session.trim_history(self.settings.max_messages);
        if removed > 0 {
            debug!("Trimmed {} messages from session {}", removed, session_id);
        }

        match outcome {
            Ok(reply) => {
                self.observer.on_turn_end(&session_id, Ok(reply.as_str()));
                Ok(reply)
            }
            Err(e) => {
                let message = format!("{:#}", e);
                self.observer.on_turn_end(&session_id, Err(message.as_str()));
                Err(e)
            }
        }
    }

    /// Discard the conversation and start a new session
    pub fn reset(&mut self) {
        let old = self.session.session_id().to_string();
        self.session.reset();
        info!("Session {} reset to {}", old, self.session.session_id());
    }

    pub fn session_id(&self) -> &str {
        self.session.session_id()
    }

    pub fn thread_id(&self) -> &str {
        self.session.thread_id()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.session.user_id()
    }

    pub fn set_user_id(&mut self, user_id: Option<String>) {
        self.session.set_user_id(user_id);
    }

    pub fn history(&self) -> &[Message] {
        self.session.messages()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}
