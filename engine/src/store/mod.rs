//! Task store adapters
//!
//! The `TaskStore` contract lives in the SDK. This module holds the adapters
//! that ship with the engine.

pub mod memory;

pub use memory::InMemoryTaskStore;
