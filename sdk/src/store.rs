//! Task store contract
//!
//! A task store owns spaces and the tasks inside them. It is the source of
//! truth for existence and uniqueness; the engine only ever holds advisory
//! copies of what a store returns.

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::types::{NewTask, Space, Task, TaskFilter, TaskUpdate};

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// CRUD operations over spaces and tasks
///
/// Implementations must be safe to share across tasks (`Send + Sync`); the
/// engine holds them behind an `Arc` and calls them from the reasoning loop.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// List every space
    async fn list_spaces(&self) -> StoreResult<Vec<Space>>;

    /// Create a space with the given name and emoji icon
    async fn create_space(&self, name: &str, icon: &str) -> StoreResult<Space>;

    /// List the tasks of one space
    async fn get_tasks(&self, space_id: &str, filter: &TaskFilter) -> StoreResult<Vec<Task>>;

    /// List tasks across all spaces, each annotated with its `space_name`
    async fn get_all_tasks(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>>;

    /// Create a task. New tasks always start as `Pending`.
    async fn create_task(&self, task: NewTask) -> StoreResult<Task>;

    /// Apply a partial update and return the updated task
    async fn update_task(&self, task_id: &str, update: TaskUpdate) -> StoreResult<Task>;

    /// Archive a task. Archived tasks are excluded from every later listing.
    async fn delete_task(&self, task_id: &str) -> StoreResult<bool>;

    /// Full-text search over tasks in every space
    async fn search_tasks(&self, query: &str) -> StoreResult<Vec<Task>>;
}
