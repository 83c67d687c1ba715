//! Error types and handling
//!
//! This module provides the error types shared by the engine and every task
//! store adapter. All errors implement the `OopsieErrorExt` trait which provides
//! user-friendly hints and indicates whether errors are recoverable.
//!
//! # Security
//!
//! Error messages never carry API keys or tokens. Store adapters are expected
//! to strip credentials before building a `StoreError`.

use thiserror::Error;

/// Trait for Oopsie error extensions
///
/// This trait provides additional context for errors, including user-friendly
/// hints and recoverability information.
pub trait OopsieErrorExt {
    /// Returns a user-friendly hint for the error
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried or worked around by changing the
    /// request. Non-recoverable errors need a configuration change.
    fn is_recoverable(&self) -> bool;
}

/// Errors raised by a task store
///
/// These are the four failure kinds the reasoning loop can observe. They are
/// always folded into a tool error payload and never abort a turn.
///
/// # Examples
///
/// ```
/// use oopsie_sdk::errors::{OopsieErrorExt, StoreError};
///
/// let error = StoreError::NotFound("task abc".to_string());
/// assert_eq!(error.to_string(), "Not found: task abc");
/// assert!(error.is_recoverable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl StoreError {
    /// Short machine-readable kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl OopsieErrorExt for StoreError {
    fn user_hint(&self) -> &str {
        match self {
            Self::NotFound(_) => "The item no longer exists. List it again to get a fresh id",
            Self::Validation(_) => "The request was rejected. Check the arguments",
            Self::UpstreamUnavailable(_) => "The task store is unreachable. Try again later",
            Self::Unknown(_) => "The task store failed unexpectedly",
        }
    }

    fn is_recoverable(&self) -> bool {
        true
    }
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Configuration**: Invalid or missing configuration and secrets
/// - **LLM Provider**: Reasoning round-trip failures
/// - **Agent loop**: Iteration and timeout limits
/// - **Store**: Task store failures surfaced outside a tool call
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // LLM provider errors
    #[error("LLM provider error: {0}")]
    LLMProvider(String),

    // Agent loop errors
    #[error("Max iterations exceeded")]
    MaxIterationsExceeded,

    #[error("LLM call timed out")]
    LLMTimeout,

    // Store errors
    #[error("Task store error: {0}")]
    Store(#[from] StoreError),
}

impl OopsieErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            // Configuration errors
            Self::Config(_) => "Check your configuration file and environment variables",

            // LLM provider errors
            Self::LLMProvider(_) => "LLM provider unavailable. Check your API key and network",

            // Agent loop errors
            Self::MaxIterationsExceeded => "Request too complex. Try breaking it into smaller steps",
            Self::LLMTimeout => "LLM provider took too long to respond. Try again",

            // Store errors
            Self::Store(inner) => inner.user_hint(),
        }
    }

    fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_))
    }
}
