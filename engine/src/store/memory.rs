//! In-memory task store
//!
//! Keeps spaces and tasks in process memory. Used by the CLI when no remote
//! store is wired and by tests, including outage simulation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::NaiveDate;
use oopsie_sdk::{
    format_due_date, NewTask, Space, StoreError, StoreResult, Task, TaskFilter, TaskStatus,
    TaskStore, TaskUpdate,
};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredTask {
    id: String,
    space_id: String,
    title: String,
    due_date: Option<NaiveDate>,
    status: TaskStatus,
    priority: oopsie_sdk::Priority,
    tags: Vec<String>,
    notes: String,
    url: Option<String>,
    archived: bool,
}

impl StoredTask {
    fn to_task(&self, space_name: Option<String>) -> Task {
        Task {
            id: self.id.clone(),
            title: self.title.clone(),
            due_date: self
                .due_date
                .map(|date| format_due_date(&date.format("%Y-%m-%d").to_string())),
            status: self.status,
            priority: self.priority,
            tags: self.tags.clone(),
            notes: self.notes.clone(),
            url: self.url.clone(),
            space_name,
        }
    }

    fn matches(&self, filter: &TaskFilter, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
        if self.archived {
            return false;
        }
        if let Some(status) = filter.status {
            if self.status != status {
                return false;
            }
        }
        if filter.has_date_range() {
            let Some(due) = self.due_date else {
                return false;
            };
            if from.is_some_and(|from| due < from) || to.is_some_and(|to| due > to) {
                return false;
            }
        }
        true
    }
}

#[derive(Default)]
struct State {
    spaces: Vec<Space>,
    tasks: Vec<StoredTask>,
}

/// Task store held entirely in memory
#[derive(Default)]
pub struct InMemoryTaskStore {
    state: Mutex<State>,
    unavailable: AtomicBool,
}

fn parse_iso_date(field: &str, value: &str) -> StoreResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        StoreError::Validation(format!(
            "{} must be an ISO date (YYYY-MM-DD), got '{}'",
            field, value
        ))
    })
}

fn parse_optional_date(field: &str, value: Option<&str>) -> StoreResult<Option<NaiveDate>> {
    value.map(|v| parse_iso_date(field, v)).transpose()
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with spaces, keeping their ids
    pub fn with_spaces(spaces: Vec<Space>) -> Self {
        Self {
            state: Mutex::new(State {
                spaces,
                tasks: Vec::new(),
            }),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Store that fails every call with `UpstreamUnavailable`
    pub fn with_unavailable(self, unavailable: bool) -> Self {
        self.set_unavailable(unavailable);
        self
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn state(&self) -> StoreResult<MutexGuard<'_, State>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::UpstreamUnavailable(
                "task store is not reachable".to_string(),
            ));
        }
        Ok(self.state.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

fn live_task<'a>(state: &'a mut State, task_id: &str) -> StoreResult<&'a mut StoredTask> {
    state
        .tasks
        .iter_mut()
        .find(|task| task.id == task_id && !task.archived)
        .ok_or_else(|| StoreError::NotFound(format!("task '{}'", task_id)))
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn list_spaces(&self) -> StoreResult<Vec<Space>> {
        Ok(self.state()?.spaces.clone())
    }

    async fn create_space(&self, name: &str, _icon: &str) -> StoreResult<Space> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation(
                "space name must not be empty".to_string(),
            ));
        }

        let mut state = self.state()?;
        if state
            .spaces
            .iter()
            .any(|space| space.name.eq_ignore_ascii_case(name))
        {
            return Err(StoreError::Validation(format!(
                "a space named '{}' already exists",
                name
            )));
        }

        let space = Space::new(Uuid::new_v4().to_string(), name);
        state.spaces.push(space.clone());
        Ok(space)
    }

    async fn get_tasks(&self, space_id: &str, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        let from = parse_optional_date("date_from", filter.date_from.as_deref())?;
        let to = parse_optional_date("date_to", filter.date_to.as_deref())?;

        let state = self.state()?;
        if !state.spaces.iter().any(|space| space.id == space_id) {
            return Err(StoreError::NotFound(format!("space '{}'", space_id)));
        }

        Ok(state
            .tasks
            .iter()
            .filter(|task| task.space_id == space_id && task.matches(filter, from, to))
            .map(|task| task.to_task(None))
            .collect())
    }

    async fn get_all_tasks(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        let from = parse_optional_date("date_from", filter.date_from.as_deref())?;
        let to = parse_optional_date("date_to", filter.date_to.as_deref())?;

        let state = self.state()?;
        Ok(state
            .tasks
            .iter()
            .filter(|task| task.matches(filter, from, to))
            .map(|task| {
                let space_name = state
                    .spaces
                    .iter()
                    .find(|space| space.id == task.space_id)
                    .map(|space| space.name.clone());
                task.to_task(space_name)
            })
            .collect())
    }

    async fn create_task(&self, task: NewTask) -> StoreResult<Task> {
        if task.title.trim().is_empty() {
            return Err(StoreError::Validation(
                "task title must not be empty".to_string(),
            ));
        }
        let due_date = parse_optional_date("due_date", task.due_date.as_deref())?;

        let mut state = self.state()?;
        if !state.spaces.iter().any(|space| space.id == task.space_id) {
            return Err(StoreError::NotFound(format!("space '{}'", task.space_id)));
        }

        let stored = StoredTask {
            id: Uuid::new_v4().to_string(),
            space_id: task.space_id,
            title: task.title,
            due_date,
            status: TaskStatus::Pending,
            priority: task.priority,
            tags: task.tags,
            notes: task.notes.unwrap_or_default(),
            url: task.url,
            archived: false,
        };
        let created = stored.to_task(None);
        state.tasks.push(stored);
        Ok(created)
    }

    async fn update_task(&self, task_id: &str, update: TaskUpdate) -> StoreResult<Task> {
        if let Some(ref title) = update.title {
            if title.trim().is_empty() {
                return Err(StoreError::Validation(
                    "task title must not be empty".to_string(),
                ));
            }
        }
        let due_date = match update.due_date {
            Some(Some(ref date)) => Some(Some(parse_iso_date("due_date", date)?)),
            Some(None) => Some(None),
            None => None,
        };

        let mut state = self.state()?;
        let task = live_task(&mut state, task_id)?;

        if let Some(title) = update.title {
            task.title = title;
        }
        if let Some(due_date) = due_date {
            task.due_date = due_date;
        }
        if let Some(status) = update.status {
            task.status = status;
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(tags) = update.tags {
            task.tags = tags;
        }
        if let Some(notes) = update.notes {
            task.notes = notes;
        }
        if let Some(url) = update.url {
            task.url = Some(url);
        }

        Ok(task.to_task(None))
    }

    async fn delete_task(&self, task_id: &str) -> StoreResult<bool> {
        let mut state = self.state()?;
        let task = live_task(&mut state, task_id)?;
        task.archived = true;
        Ok(true)
    }

    async fn search_tasks(&self, query: &str) -> StoreResult<Vec<Task>> {
        let needle = query.trim().to_lowercase();
        let state = self.state()?;

        Ok(state
            .tasks
            .iter()
            .filter(|task| !task.archived)
            .filter(|task| {
                task.title.to_lowercase().contains(&needle)
                    || task.notes.to_lowercase().contains(&needle)
            })
            .map(|task| task.to_task(None))
            .collect())
    }
}
