pub mod definitions;

pub use definitions::{tool_definitions, TOOL_NAMES};

use std::sync::Arc;

use oopsie_sdk::{NewTask, Priority, StoreError, TaskFilter, TaskStatus, TaskStore, TaskUpdate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::cache::SpaceCache;
use crate::llm::ToolDefinition;

/// Largest serialized tool result handed back to the model (1 MiB)
pub const MAX_RESULT_BYTES: usize = 1024 * 1024;

const DEFAULT_SPACE_ICON: &str = "📁";

/// Outcome of one tool call. Failures are values, never errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocationResult {
    Ok(Value),
    Err(String),
}

impl ToolInvocationResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// JSON payload fed to the model: the value itself or `{"error": message}`
    pub fn to_payload(&self) -> Value {
        match self {
            Self::Ok(value) => value.clone(),
            Self::Err(message) => json!({ "error": message }),
        }
    }

    /// Payload as a string for a tool result message
    pub fn to_content(&self) -> String {
        self.to_payload().to_string()
    }
}

impl From<StoreError> for ToolInvocationResult {
    fn from(err: StoreError) -> Self {
        debug!(kind = err.kind(), "Store call rejected: {}", err);
        Self::Err(err.to_string())
    }
}

/// Accepts an absent field, `null`, `""` or a date. Null and empty mean "clear".
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(Some(value.filter(|date| !date.trim().is_empty())))
}

#[derive(Deserialize)]
struct CreateSpaceArgs {
    name: String,
    #[serde(default)]
    icon: Option<String>,
}

#[derive(Deserialize)]
struct GetTasksArgs {
    space_id: String,
    #[serde(flatten)]
    filter: FilterArgs,
}

#[derive(Deserialize, Default)]
struct FilterArgs {
    #[serde(default)]
    status: Option<TaskStatus>,
    #[serde(default)]
    date_from: Option<String>,
    #[serde(default)]
    date_to: Option<String>,
}

impl From<FilterArgs> for TaskFilter {
    fn from(args: FilterArgs) -> Self {
        TaskFilter {
            status: args.status,
            date_from: args.date_from,
            date_to: args.date_to,
        }
    }
}

#[derive(Deserialize)]
struct CreateTaskArgs {
    space_id: String,
    title: String,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    priority: Option<Priority>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Deserialize)]
struct UpdateTaskArgs {
    task_id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    due_date: Option<Option<String>>,
    #[serde(default)]
    status: Option<TaskStatus>,
    #[serde(default)]
    priority: Option<Priority>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Deserialize)]
struct TaskIdArgs {
    task_id: String,
}

#[derive(Deserialize)]
struct SearchArgs {
    query: String,
}

/// Adapts the task store to named tool calls.
///
/// Every call returns a [`ToolInvocationResult`]; store failures, bad
/// arguments and unknown names become error results so the reasoning loop
/// can explain or retry.
pub struct ToolBridge {
    store: Arc<dyn TaskStore>,
    cache: Arc<SpaceCache>,
}

impl ToolBridge {
    pub fn new(store: Arc<dyn TaskStore>, cache: Arc<SpaceCache>) -> Self {
        Self { store, cache }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        tool_definitions()
    }

    /// Run a tool by name with JSON-encoded arguments
    pub async fn dispatch(&self, name: &str, arguments_json: &str) -> ToolInvocationResult {
        debug!("Dispatching tool '{}' with args: {}", name, arguments_json);

        let result = match parse_arguments(arguments_json) {
            Ok(args) => self.run(name, args).await,
            Err(message) => ToolInvocationResult::Err(message),
        };

        let result = bound_size(result);
        if let ToolInvocationResult::Err(ref message) = result {
            warn!("Tool '{}' failed: {}", name, message);
        }
        result
    }

    async fn run(&self, name: &str, args: Value) -> ToolInvocationResult {
        match name {
            "list_spaces" => match self.store.list_spaces().await {
                Ok(spaces) => ToolInvocationResult::Ok(json!({ "spaces": spaces })),
                Err(e) => e.into(),
            },
            "create_space" => {
                let args: CreateSpaceArgs = match decode(name, args) {
                    Ok(args) => args,
                    Err(e) => return e,
                };
                let icon = args.icon.as_deref().unwrap_or(DEFAULT_SPACE_ICON);
                match self.store.create_space(&args.name, icon).await {
                    Ok(space) => {
                        self.cache.add(space.name.clone(), space.id.clone());
                        to_result(&space)
                    }
                    Err(e) => e.into(),
                }
            }
            "get_tasks" => {
                let args: GetTasksArgs = match decode(name, args) {
                    Ok(args) => args,
                    Err(e) => return e,
                };
                let filter = TaskFilter::from(args.filter);
                match self.store.get_tasks(&args.space_id, &filter).await {
                    Ok(tasks) => ToolInvocationResult::Ok(json!({ "tasks": tasks })),
                    Err(e) => e.into(),
                }
            }
            "get_all_tasks" => {
                let args: FilterArgs = match decode(name, args) {
                    Ok(args) => args,
                    Err(e) => return e,
                };
                match self.store.get_all_tasks(&args.into()).await {
                    Ok(tasks) => ToolInvocationResult::Ok(json!({ "tasks": tasks })),
                    Err(e) => e.into(),
                }
            }
            "create_task" => {
                let args: CreateTaskArgs = match decode(name, args) {
                    Ok(args) => args,
                    Err(e) => return e,
                };
                let task = NewTask {
                    space_id: args.space_id,
                    title: args.title,
                    due_date: args.due_date.filter(|date| !date.trim().is_empty()),
                    priority: args.priority.unwrap_or_default(),
                    tags: args.tags.unwrap_or_default(),
                    notes: args.notes,
                    url: args.url,
                };
                match self.store.create_task(task).await {
                    Ok(task) => to_result(&task),
                    Err(e) => e.into(),
                }
            }
            "update_task" => {
                let args: UpdateTaskArgs = match decode(name, args) {
                    Ok(args) => args,
                    Err(e) => return e,
                };
                let update = TaskUpdate {
                    title: args.title,
                    due_date: args.due_date,
                    status: args.status,
                    priority: args.priority,
                    tags: args.tags,
                    notes: args.notes,
                    url: args.url,
                };
                if update.is_empty() {
                    return StoreError::Validation(
                        "update_task needs at least one field to change".to_string(),
                    )
                    .into();
                }
                match self.store.update_task(&args.task_id, update).await {
                    Ok(task) => to_result(&task),
                    Err(e) => e.into(),
                }
            }
            "complete_task" => {
                let args: TaskIdArgs = match decode(name, args) {
                    Ok(args) => args,
                    Err(e) => return e,
                };
                let update = TaskUpdate::status(TaskStatus::Completed);
                match self.store.update_task(&args.task_id, update).await {
                    Ok(task) => to_result(&task),
                    Err(e) => e.into(),
                }
            }
            "delete_task" => {
                let args: TaskIdArgs = match decode(name, args) {
                    Ok(args) => args,
                    Err(e) => return e,
                };
                match self.store.delete_task(&args.task_id).await {
                    Ok(deleted) => ToolInvocationResult::Ok(json!({ "deleted": deleted })),
                    Err(e) => e.into(),
                }
            }
            "search_tasks" => {
                let args: SearchArgs = match decode(name, args) {
                    Ok(args) => args,
                    Err(e) => return e,
                };
                match self.store.search_tasks(&args.query).await {
                    Ok(tasks) => ToolInvocationResult::Ok(json!({ "tasks": tasks })),
                    Err(e) => e.into(),
                }
            }
            _ => ToolInvocationResult::Err(format!(
                "Unknown tool '{}'. Available tools: {}",
                name,
                TOOL_NAMES.join(", ")
            )),
        }
    }
}

/// Empty input and `null` mean "no arguments"
fn parse_arguments(arguments_json: &str) -> Result<Value, String> {
    if arguments_json.trim().is_empty() {
        return Ok(json!({}));
    }
    match serde_json::from_str::<Value>(arguments_json) {
        Ok(Value::Null) => Ok(json!({})),
        Ok(value) => Ok(value),
        Err(e) => Err(StoreError::Validation(format!("arguments are not valid JSON: {}", e))
            .to_string()),
    }
}

fn decode<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolInvocationResult> {
    serde_json::from_value(args).map_err(|e| {
        StoreError::Validation(format!("invalid arguments for {}: {}", tool, e)).into()
    })
}

fn to_result<T: Serialize>(value: &T) -> ToolInvocationResult {
    match serde_json::to_value(value) {
        Ok(value) => ToolInvocationResult::Ok(value),
        Err(e) => StoreError::Unknown(format!("failed to serialize result: {}", e)).into(),
    }
}

fn bound_size(result: ToolInvocationResult) -> ToolInvocationResult {
    let ToolInvocationResult::Ok(ref value) = result else {
        return result;
    };
    let size = value.to_string().len();
    if size > MAX_RESULT_BYTES {
        ToolInvocationResult::Err(format!(
            "Result too large ({} bytes, limit {}). Narrow the query with filters.",
            size, MAX_RESULT_BYTES
        ))
    } else {
        result
    }
}
