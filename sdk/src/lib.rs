//! Oopsie SDK
//!
//! Shared library providing the task store contract and error types.
//! This crate is used by the engine and by every task store adapter.

/// Error types and handling
pub mod errors;

/// Task store trait
pub mod store;

/// Space and task types
pub mod types;

// Re-export commonly used types
pub use errors::{EngineError, OopsieErrorExt, StoreError};
pub use store::{StoreResult, TaskStore};
pub use types::{format_due_date, NewTask, Priority, Space, Task, TaskFilter, TaskStatus, TaskUpdate};
