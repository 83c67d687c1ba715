//! Reasoning loop
//!
//! One turn of reasoning repeats a think-act-observe cycle:
//!
//! 1. Call the LLM provider with the system instruction and the log
//! 2. Record the assistant message
//! 3. If it requested tools, run each through the ToolBridge and record one
//!    tool result per call, then continue
//! 4. Otherwise the turn is finished
//!
//! # Limits
//!
//! - `max_iterations` provider calls per turn (default 8)
//! - `llm_timeout` per provider call (default 120s)

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use oopsie_sdk::errors::EngineError;
use tokio::time::timeout;
use tracing::{debug, error};

use super::observer::TurnObserver;
use crate::llm::{LLMProvider, Message};
use crate::tools::ToolBridge;

/// Maximum number of provider calls per turn
pub const DEFAULT_MAX_ITERATIONS: usize = 8;

/// Timeout for each provider call
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(120);

/// Produces the messages of one turn
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Run one turn over `history` (which ends with the user message),
    /// appending each new assistant and tool result message to `turn` as it
    /// is produced. On failure `turn` holds the steps completed so far.
    async fn run_turn(
        &self,
        system: &str,
        history: &[Message],
        turn: &mut Vec<Message>,
        observer: &dyn TurnObserver,
    ) -> Result<()>;
}

/// Reasoner that alternates provider calls and tool dispatch
pub struct ToolLoop {
    provider: Arc<dyn LLMProvider>,
    bridge: Arc<ToolBridge>,
    max_iterations: usize,
    llm_timeout: Duration,
}

impl ToolLoop {
    pub fn new(provider: Arc<dyn LLMProvider>, bridge: Arc<ToolBridge>) -> Self {
        Self {
            provider,
            bridge,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            llm_timeout: DEFAULT_LLM_TIMEOUT,
        }
    }

    pub fn with_limits(mut self, max_iterations: usize, llm_timeout: Duration) -> Self {
        self.max_iterations = max_iterations;
        self.llm_timeout = llm_timeout;
        self
    }
}

#[async_trait]
impl Reasoner for ToolLoop {
    async fn run_turn(
        &self,
        system: &str,
        history: &[Message],
        turn: &mut Vec<Message>,
        observer: &dyn TurnObserver,
    ) -> Result<()> {
        let tools = self.bridge.definitions();
        let mut log: Vec<Message> = history.to_vec();

        for iteration in 1..=self.max_iterations {
            debug!("Iteration {}/{}", iteration, self.max_iterations);

            let response = match timeout(
                self.llm_timeout,
                self.provider.generate(system, &log, &tools),
            )
            .await
            {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    error!("LLM call failed ({}): {}", self.provider.name(), e);
                    return Err(EngineError::LLMProvider(e.to_string()).into());
                }
                Err(_) => {
                    error!("LLM call timed out after {:?}", self.llm_timeout);
                    return Err(EngineError::LLMTimeout.into());
                }
            };

            let calls = response.tool_calls.clone();
            let message = response.into_message();
            log.push(message.clone());
            turn.push(message);

            if calls.is_empty() {
                return Ok(());
            }

            for call in calls {
                debug!("Tool call: {} ({})", call.name, call.id);
                let result = self.bridge.dispatch(&call.name, &call.arguments).await;
                observer.on_tool_call(&call.name, result.is_ok());
                let message = Message::tool_result(call.id, call.name, result.to_content());
                log.push(message.clone());
                turn.push(message);
            }
        }

        error!("Turn exceeded max iterations ({})", self.max_iterations);
        Err(EngineError::MaxIterationsExceeded.into())
    }
}
