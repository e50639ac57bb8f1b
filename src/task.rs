//! Tasks and the per-user task store.
//!
//! Tasks are persisted as one JSON array per user under `tasks-<uid>`,
//! rewritten in full after every mutation. The on-disk shape keeps the
//! camelCase field names (`dueDate`) of the lists already stored by users.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::date::stored_date;
use crate::error::{Error, Result};
use crate::identity::ActiveUser;
use crate::storage::{self, namespaced_key, KeyValueStore};

/// Store name used in the persistence key
pub const TASKS_STORE: &str = "tasks";

/// Category given to tasks stored without one
pub const DEFAULT_TASK_CATEGORY: &str = "General";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Daily,
    Weekly,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Daily => "daily",
            TaskKind::Weekly => "weekly",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(TaskKind::Daily),
            "weekly" => Ok(TaskKind::Weekly),
            other => Err(Error::InvalidArgument(format!(
                "invalid task type '{other}' (expected daily|weekly)"
            ))),
        }
    }
}

/// A single to-do item scoped to a day or a week.
///
/// `due_date` is always normalized (`YYYY-MM-DD` or empty).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "StoredTask")]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub due_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub category: String,
    pub completed: bool,
}

impl Task {
    pub fn new(id: i64, title: impl Into<String>, kind: TaskKind, due_date: &str) -> Self {
        Self {
            id,
            title: title.into(),
            kind,
            due_date: stored_date(due_date),
            time: None,
            category: DEFAULT_TASK_CATEGORY.to_string(),
            completed: false,
        }
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into()).filter(|value: &String| !value.trim().is_empty());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// Shape accepted on load. Older records carry `label` instead of
/// `category`, an empty `time`, or a full timestamp in `dueDate`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTask {
    id: i64,
    #[serde(default)]
    title: String,
    #[serde(rename = "type")]
    kind: TaskKind,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    completed: bool,
}

impl From<StoredTask> for Task {
    fn from(stored: StoredTask) -> Self {
        let category = stored
            .category
            .filter(|value| !value.trim().is_empty())
            .or(stored.label.filter(|value| !value.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_TASK_CATEGORY.to_string());

        Task {
            id: stored.id,
            title: stored.title,
            kind: stored.kind,
            due_date: stored_date(stored.due_date.as_deref().unwrap_or("")),
            time: stored.time.filter(|value| !value.trim().is_empty()),
            category,
            completed: stored.completed,
        }
    }
}

/// Id for a new item: the creation time in milliseconds, bumped past every
/// existing id so ids stay unique and increasing.
pub fn generate_id(existing: impl IntoIterator<Item = i64>, now: NaiveDateTime) -> i64 {
    let stamp = now.and_utc().timestamp_millis();
    match existing.into_iter().max() {
        Some(max) if max >= stamp => max + 1,
        _ => stamp,
    }
}

/// Authoritative task list of the active user.
///
/// Every mutation swaps in a new list and writes it through to the
/// key-value store under the namespace of whoever is signed in at that
/// moment. Unknown ids are no-ops.
pub struct TaskStore {
    backend: Rc<dyn KeyValueStore>,
    active: ActiveUser,
    tasks: Rc<Vec<Task>>,
}

impl TaskStore {
    /// Empty store; call [`TaskStore::reload`] to read the active namespace.
    pub fn new(backend: Rc<dyn KeyValueStore>, active: ActiveUser) -> Self {
        Self {
            backend,
            active,
            tasks: Rc::new(Vec::new()),
        }
    }

    /// Current list. Mutations never touch a snapshot already handed out.
    pub fn tasks(&self) -> Rc<Vec<Task>> {
        Rc::clone(&self.tasks)
    }

    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn next_id(&self, now: NaiveDateTime) -> i64 {
        generate_id(self.tasks.iter().map(|task| task.id), now)
    }

    /// Append `task` as given. No validation or de-duplication.
    pub fn add_task(&mut self, task: Task) {
        let mut tasks = self.tasks.as_ref().clone();
        tasks.push(task);
        self.commit(tasks);
    }

    /// Flip `completed` on the task with `id`. Returns whether it existed.
    pub fn toggle_task(&mut self, id: i64) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        let tasks = self
            .tasks
            .iter()
            .map(|task| {
                if task.id == id {
                    Task {
                        completed: !task.completed,
                        ..task.clone()
                    }
                } else {
                    task.clone()
                }
            })
            .collect();
        self.commit(tasks);
        true
    }

    /// Remove the task with `id`. Returns whether it existed.
    pub fn delete_task(&mut self, id: i64) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        let tasks = self
            .tasks
            .iter()
            .filter(|task| task.id != id)
            .cloned()
            .collect();
        self.commit(tasks);
        true
    }

    /// Replace the whole list without persisting it.
    pub fn load_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = Rc::new(tasks);
    }

    /// Re-read the active user's list; empty when signed out.
    pub fn reload(&mut self) {
        let tasks = match self.active.get() {
            Some(uid) => read_tasks(self.backend.as_ref(), &uid),
            None => Vec::new(),
        };
        self.load_tasks(tasks);
    }

    fn commit(&mut self, tasks: Vec<Task>) {
        self.tasks = Rc::new(tasks);
        storage::persist(
            self.backend.as_ref(),
            &self.active,
            TASKS_STORE,
            self.tasks.as_slice(),
        );
    }
}

/// Stored task list of `uid`; empty when missing or corrupt.
pub fn read_tasks(backend: &dyn KeyValueStore, uid: &str) -> Vec<Task> {
    storage::load_or_default(backend, &namespaced_key(TASKS_STORE, uid))
}
