//! Task and space types shared between the engine and task store adapters

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named container of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub id: String,
    pub name: String,
}

impl Space {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Lifecycle state of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// Priority of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Lowercases and strips separators so `In Progress`, `in_progress` and
/// `InProgress` compare equal.
fn normalize_label(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "pending" | "pendiente" | "todo" => Ok(Self::Pending),
            "inprogress" | "enprogreso" => Ok(Self::InProgress),
            "completed" | "completada" | "done" => Ok(Self::Completed),
            _ => Err(format!(
                "invalid status '{}'. Must be one of: Pending, InProgress, Completed",
                s
            )),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "Pending"),
            TaskStatus::InProgress => write!(f, "InProgress"),
            TaskStatus::Completed => write!(f, "Completed"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "low" | "baja" => Ok(Self::Low),
            "medium" | "media" => Ok(Self::Medium),
            "high" | "alta" => Ok(Self::High),
            "urgent" | "urgente" => Ok(Self::Urgent),
            _ => Err(format!(
                "invalid priority '{}'. Must be one of: Low, Medium, High, Urgent",
                s
            )),
        }
    }
}

impl TryFrom<String> for Priority {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "Low"),
            Priority::Medium => write!(f, "Medium"),
            Priority::High => write!(f, "High"),
            Priority::Urgent => write!(f, "Urgent"),
        }
    }
}

/// A task as returned by a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,

    /// Display-formatted due date (`DD/MM/YYYY`)
    pub due_date: Option<String>,

    pub status: TaskStatus,
    pub priority: Priority,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub notes: String,

    pub url: Option<String>,

    /// Owning space, only filled for cross-space listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_name: Option<String>,
}

/// Input for creating a task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub space_id: String,
    pub title: String,

    /// ISO date (`YYYY-MM-DD`)
    pub due_date: Option<String>,

    pub priority: Priority,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub url: Option<String>,
}

impl NewTask {
    pub fn new(space_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            space_id: space_id.into(),
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Partial update of a task. Only `Some` fields are changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,

    /// `Some(None)` clears the due date
    pub due_date: Option<Option<String>>,

    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,

    /// Replaces the whole tag list
    pub tags: Option<Vec<String>>,

    pub notes: Option<String>,
    pub url: Option<String>,
}

impl TaskUpdate {
    /// Update that only changes the status
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Returns true when no field would change
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.due_date.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.tags.is_none()
            && self.notes.is_none()
            && self.url.is_none()
    }
}

/// Filter for task listings. Date bounds are inclusive ISO dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl TaskFilter {
    /// Returns true when a date bound is set
    pub fn has_date_range(&self) -> bool {
        self.date_from.is_some() || self.date_to.is_some()
    }
}

/// Convert an ISO `YYYY-MM-DD` date to the `DD/MM/YYYY` display form.
///
/// Anything that is not three dash-separated parts is returned unchanged.
pub fn format_due_date(iso_date: &str) -> String {
    let parts: Vec<&str> = iso_date.split('-').collect();
    match parts.as_slice() {
        [year, month, day] => format!("{}/{}/{}", day, month, year),
        _ => iso_date.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing_is_lenient() {
        assert_eq!("pending".parse::<TaskStatus>(), Ok(TaskStatus::Pending));
        assert_eq!("In Progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!("in_progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!("Completada".parse::<TaskStatus>(), Ok(TaskStatus::Completed));
        assert!("archived".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_priority_parsing_and_default() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!("URGENT".parse::<Priority>(), Ok(Priority::Urgent));
        assert_eq!("Baja".parse::<Priority>(), Ok(Priority::Low));
        assert!("critical".parse::<Priority>().is_err());
    }

    #[test]
    fn test_status_serializes_as_variant_name() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, r#""InProgress""#);

        let parsed: TaskStatus = serde_json::from_str(r#""en progreso""#).unwrap();
        assert_eq!(parsed, TaskStatus::InProgress);
    }

    #[test]
    fn test_format_due_date() {
        assert_eq!(format_due_date("2026-03-15"), "15/03/2026");
        assert_eq!(format_due_date("tomorrow"), "tomorrow");
    }

    #[test]
    fn test_task_update_is_empty() {
        assert!(TaskUpdate::default().is_empty());
        assert!(!TaskUpdate::status(TaskStatus::Completed).is_empty());

        let clear_date = TaskUpdate {
            due_date: Some(None),
            ..Default::default()
        };
        assert!(!clear_date.is_empty());
    }

    #[test]
    fn test_space_name_skipped_when_absent() {
        let task = Task {
            id: "t1".to_string(),
            title: "Buy milk".to_string(),
            due_date: None,
            status: TaskStatus::Pending,
            priority: Priority::Medium,
            tags: vec![],
            notes: String::new(),
            url: None,
            space_name: None,
        };
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("space_name").is_none());
        assert_eq!(json["status"], "Pending");
        assert_eq!(json["priority"], "Medium");
    }
}
