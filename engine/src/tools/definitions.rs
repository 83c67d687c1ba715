//! Tool catalog advertised to the reasoning provider

use serde_json::{json, Value};

use crate::llm::ToolDefinition;

/// Names of every tool, in catalog order
pub const TOOL_NAMES: [&str; 9] = [
    "list_spaces",
    "create_space",
    "get_tasks",
    "get_all_tasks",
    "create_task",
    "update_task",
    "complete_task",
    "delete_task",
    "search_tasks",
];

fn status_schema() -> Value {
    json!({
        "type": "string",
        "enum": ["Pending", "InProgress", "Completed"],
        "description": "Task status"
    })
}

fn priority_schema() -> Value {
    json!({
        "type": "string",
        "enum": ["Low", "Medium", "High", "Urgent"],
        "description": "Task priority"
    })
}

fn date_schema(description: &str) -> Value {
    json!({
        "type": "string",
        "description": format!("{} (YYYY-MM-DD)", description)
    })
}

fn tool(name: &str, description: &str, parameters: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        parameters,
    }
}

/// JSON-Schema definitions for the whole catalog
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        tool(
            "list_spaces",
            "List every space with its id. Authoritative, use it when the space list in the instructions may be stale.",
            json!({ "type": "object", "properties": {} }),
        ),
        tool(
            "create_space",
            "Create a new space to group tasks.",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Space name" },
                    "icon": { "type": "string", "description": "Emoji icon, defaults to 📁" }
                },
                "required": ["name"]
            }),
        ),
        tool(
            "get_tasks",
            "List the tasks of one space, optionally filtered by status and due date range.",
            json!({
                "type": "object",
                "properties": {
                    "space_id": { "type": "string", "description": "Id of the space" },
                    "status": status_schema(),
                    "date_from": date_schema("Earliest due date, inclusive"),
                    "date_to": date_schema("Latest due date, inclusive")
                },
                "required": ["space_id"]
            }),
        ),
        tool(
            "get_all_tasks",
            "List tasks across all spaces. Each task includes its space_name.",
            json!({
                "type": "object",
                "properties": {
                    "status": status_schema(),
                    "date_from": date_schema("Earliest due date, inclusive"),
                    "date_to": date_schema("Latest due date, inclusive")
                }
            }),
        ),
        tool(
            "create_task",
            "Create a task in a space. New tasks start as Pending.",
            json!({
                "type": "object",
                "properties": {
                    "space_id": { "type": "string", "description": "Id of the space" },
                    "title": { "type": "string", "description": "Task title" },
                    "due_date": date_schema("Due date"),
                    "priority": priority_schema(),
                    "tags": { "type": "array", "items": { "type": "string" } },
                    "notes": { "type": "string" },
                    "url": { "type": "string" }
                },
                "required": ["space_id", "title"]
            }),
        ),
        tool(
            "update_task",
            "Change fields of a task. Only the given fields change. An empty due_date clears it.",
            json!({
                "type": "object",
                "properties": {
                    "task_id": { "type": "string", "description": "Id of the task" },
                    "title": { "type": "string" },
                    "due_date": date_schema("New due date, empty string to clear"),
                    "status": status_schema(),
                    "priority": priority_schema(),
                    "tags": { "type": "array", "items": { "type": "string" } },
                    "notes": { "type": "string" },
                    "url": { "type": "string" }
                },
                "required": ["task_id"]
            }),
        ),
        tool(
            "complete_task",
            "Mark a task as Completed.",
            json!({
                "type": "object",
                "properties": {
                    "task_id": { "type": "string", "description": "Id of the task" }
                },
                "required": ["task_id"]
            }),
        ),
        tool(
            "delete_task",
            "Archive a task. Confirm with the user before calling.",
            json!({
                "type": "object",
                "properties": {
                    "task_id": { "type": "string", "description": "Id of the task" }
                },
                "required": ["task_id"]
            }),
        ),
        tool(
            "search_tasks",
            "Search tasks in every space by text in the title or notes.",
            json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Text to look for" }
                },
                "required": ["query"]
            }),
        ),
    ]
}
