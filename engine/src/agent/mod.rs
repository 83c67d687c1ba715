//! Conversational agent
//!
//! This module implements the session layer: the bounded message log of one
//! dialogue, the reasoning loop that alternates provider calls and tool
//! dispatch, and the engine that ties them to the space cache.

pub mod core;
pub mod observer;
pub mod prompt;
pub mod reasoner;
pub mod session;

pub use self::core::{AgentEngine, EngineSettings};
pub use observer::{NoopObserver, TracingObserver, TurnObserver};
pub use prompt::build_system_prompt;
pub use reasoner::{Reasoner, ToolLoop};
pub use session::{extract_reply, trim_history, ConversationSession, FALLBACK_REPLY};
