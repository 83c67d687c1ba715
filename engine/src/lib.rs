//! Oopsie Engine Library
//!
//! This library provides the conversational session layer of Oopsie.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Secret management module
pub mod secrets;

/// Telemetry and Observability
pub mod telemetry;

/// LLM provider abstraction layer
pub mod llm;

/// Space name cache
pub mod cache;

/// Tool bridge over the task store
pub mod tools;

/// Task store adapters
pub mod store;

/// Conversational agent module
pub mod agent;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
