//! Space name cache
//!
//! Lets the agent resolve "Home" or "Work" to a store id without a
//! `list_spaces` round trip on every turn. The store stays authoritative.

pub mod space_cache;

pub use space_cache::{SpaceCache, DEFAULT_TTL};
