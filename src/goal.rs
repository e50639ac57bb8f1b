//! Goals, their subtasks, and the per-user goal store.

use std::rc::Rc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::date::stored_date;
use crate::identity::ActiveUser;
use crate::storage::{self, namespaced_key, KeyValueStore};
use crate::task::generate_id;

/// Store name used in the persistence key
pub const GOALS_STORE: &str = "goals";

/// Category given to goals stored without one
pub const DEFAULT_GOAL_CATEGORY: &str = "Personal";

fn default_goal_category() -> String {
    DEFAULT_GOAL_CATEGORY.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subtask {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl Subtask {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            completed: false,
        }
    }
}

/// Longer-horizon objective. Subtasks keep insertion order and die with
/// their goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: i64,
    pub title: String,
    #[serde(default = "default_goal_category")]
    pub category: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_due_date"
    )]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

fn deserialize_due_date<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .map(|value| stored_date(&value))
        .filter(|value| !value.is_empty()))
}

impl Goal {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            category: default_goal_category(),
            due_date: None,
            description: None,
            subtasks: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_due_date(mut self, due_date: &str) -> Self {
        self.due_date = Some(stored_date(due_date)).filter(|value| !value.is_empty());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description: String = description.into();
        self.description = Some(description).filter(|value| !value.trim().is_empty());
        self
    }

    pub fn subtask(&self, subtask_id: i64) -> Option<&Subtask> {
        self.subtasks.iter().find(|subtask| subtask.id == subtask_id)
    }

    pub fn completed_subtasks(&self) -> usize {
        self.subtasks.iter().filter(|subtask| subtask.completed).count()
    }

    /// Percentage of completed subtasks; 0 without subtasks.
    pub fn progress(&self) -> u32 {
        crate::projection::completion_percentage(&self.subtasks)
    }

    /// At least one subtask and all of them done.
    pub fn is_complete(&self) -> bool {
        !self.subtasks.is_empty() && self.progress() == 100
    }

    /// Id for a new subtask of this goal
    pub fn next_subtask_id(&self, now: NaiveDateTime) -> i64 {
        generate_id(self.subtasks.iter().map(|subtask| subtask.id), now)
    }
}

/// Authoritative goal list of the active user.
///
/// Same contract as [`crate::task::TaskStore`]: each operation produces a
/// new list value, persisted in full; unknown ids and blank subtask titles
/// leave the list (and the snapshot identity) untouched.
pub struct GoalStore {
    backend: Rc<dyn KeyValueStore>,
    active: ActiveUser,
    goals: Rc<Vec<Goal>>,
}

impl GoalStore {
    pub fn new(backend: Rc<dyn KeyValueStore>, active: ActiveUser) -> Self {
        Self {
            backend,
            active,
            goals: Rc::new(Vec::new()),
        }
    }

    pub fn goals(&self) -> Rc<Vec<Goal>> {
        Rc::clone(&self.goals)
    }

    pub fn get(&self, id: i64) -> Option<&Goal> {
        self.goals.iter().find(|goal| goal.id == id)
    }

    pub fn next_id(&self, now: NaiveDateTime) -> i64 {
        generate_id(self.goals.iter().map(|goal| goal.id), now)
    }

    pub fn add_goal(&mut self, goal: Goal) {
        let mut goals = self.goals.as_ref().clone();
        goals.push(goal);
        self.commit(goals);
    }

    /// Remove a goal together with its subtasks.
    pub fn delete_goal(&mut self, id: i64) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        let goals = self
            .goals
            .iter()
            .filter(|goal| goal.id != id)
            .cloned()
            .collect();
        self.commit(goals);
        true
    }

    /// Append `subtask` to the goal. The title is trimmed; a blank title
    /// adds nothing. Returns whether a subtask was added.
    pub fn add_subtask(&mut self, goal_id: i64, subtask: Subtask) -> bool {
        let title = subtask.title.trim();
        if title.is_empty() || self.get(goal_id).is_none() {
            return false;
        }
        let subtask = Subtask {
            title: title.to_string(),
            ..subtask
        };
        self.update_goal(goal_id, |goal| goal.subtasks.push(subtask));
        true
    }

    pub fn toggle_subtask(&mut self, goal_id: i64, subtask_id: i64) -> bool {
        if !self.has_subtask(goal_id, subtask_id) {
            return false;
        }
        self.update_goal(goal_id, |goal| {
            for subtask in goal.subtasks.iter_mut() {
                if subtask.id == subtask_id {
                    subtask.completed = !subtask.completed;
                }
            }
        });
        true
    }

    pub fn delete_subtask(&mut self, goal_id: i64, subtask_id: i64) -> bool {
        if !self.has_subtask(goal_id, subtask_id) {
            return false;
        }
        self.update_goal(goal_id, |goal| {
            goal.subtasks.retain(|subtask| subtask.id != subtask_id);
        });
        true
    }

    /// Replace the whole list without persisting it.
    pub fn load_goals(&mut self, goals: Vec<Goal>) {
        self.goals = Rc::new(goals);
    }

    /// Re-read the active user's list; empty when signed out.
    pub fn reload(&mut self) {
        let goals = match self.active.get() {
            Some(uid) => read_goals(self.backend.as_ref(), &uid),
            None => Vec::new(),
        };
        self.load_goals(goals);
    }

    fn has_subtask(&self, goal_id: i64, subtask_id: i64) -> bool {
        self.get(goal_id)
            .and_then(|goal| goal.subtask(subtask_id))
            .is_some()
    }

    fn update_goal<F>(&mut self, goal_id: i64, mutator: F)
    where
        F: FnOnce(&mut Goal),
    {
        let mut mutator = Some(mutator);
        let goals = self
            .goals
            .iter()
            .map(|goal| {
                let mut goal = goal.clone();
                if goal.id == goal_id {
                    if let Some(mutator) = mutator.take() {
                        mutator(&mut goal);
                    }
                }
                goal
            })
            .collect();
        self.commit(goals);
    }

    fn commit(&mut self, goals: Vec<Goal>) {
        self.goals = Rc::new(goals);
        storage::persist(
            self.backend.as_ref(),
            &self.active,
            GOALS_STORE,
            self.goals.as_slice(),
        );
    }
}

/// Stored goal list of `uid`; empty when missing or corrupt.
pub fn read_goals(backend: &dyn KeyValueStore, uid: &str) -> Vec<Goal> {
    storage::load_or_default(backend, &namespaced_key(GOALS_STORE, uid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn store_for(uid: &str) -> (Rc<MemoryStore>, GoalStore) {
        let backend = Rc::new(MemoryStore::new());
        let store = GoalStore::new(backend.clone(), ActiveUser::signed_in(uid));
        (backend, store)
    }

    #[test]
    fn goal_due_date_must_be_a_date() {
        assert_eq!(Goal::new(1, "Run").with_due_date("soon").due_date, None);
        assert_eq!(
            Goal::new(1, "Run")
                .with_due_date("2024-07-01T00:00:00Z")
                .due_date
                .as_deref(),
            Some("2024-07-01")
        );

        let raw = r#"[{"id": 2, "title": "Read", "dueDate": "someday", "subtasks": []}]"#;
        let goals: Vec<Goal> = serde_json::from_str(raw).unwrap();
        assert_eq!(goals[0].due_date, None);
    }

    #[test]
    fn progress_of_empty_goal_is_zero() {
        let goal = Goal::new(1, "Learn guitar");
        assert_eq!(goal.progress(), 0);
        assert!(!goal.is_complete());
    }

    #[test]
    fn subtask_lifecycle_drives_progress() {
        let (_backend, mut store) = store_for("alice");
        store.add_goal(Goal::new(1, "Learn guitar"));
        assert!(store.add_subtask(1, Subtask::new(10, "Buy strings")));
        assert!(store.add_subtask(1, Subtask::new(11, "Practice scales")));

        assert!(store.toggle_subtask(1, 10));
        let goal = store.get(1).unwrap();
        assert_eq!(goal.progress(), 50);
        assert!(!goal.is_complete());

        assert!(store.toggle_subtask(1, 11));
        let goal = store.get(1).unwrap();
        assert_eq!(goal.progress(), 100);
        assert!(goal.is_complete());

        assert!(store.delete_subtask(1, 11));
        assert_eq!(store.get(1).unwrap().subtasks.len(), 1);
    }

    #[test]
    fn blank_subtask_titles_are_ignored() {
        let (_backend, mut store) = store_for("alice");
        store.add_goal(Goal::new(1, "Run"));
        let snapshot = store.goals();

        assert!(!store.add_subtask(1, Subtask::new(2, "   ")));
        assert!(!store.add_subtask(1, Subtask::new(3, "")));
        assert!(Rc::ptr_eq(&snapshot, &store.goals()));

        assert!(store.add_subtask(1, Subtask::new(4, "  5k  ")));
        assert_eq!(store.get(1).unwrap().subtasks[0].title, "5k");
    }

    #[test]
    fn unknown_references_are_noops() {
        let (_backend, mut store) = store_for("alice");
        store.add_goal(Goal::new(1, "Run"));
        store.add_subtask(1, Subtask::new(2, "shoes"));
        let snapshot = store.goals();

        assert!(!store.delete_goal(9));
        assert!(!store.add_subtask(9, Subtask::new(3, "x")));
        assert!(!store.toggle_subtask(1, 9));
        assert!(!store.toggle_subtask(9, 2));
        assert!(!store.delete_subtask(1, 9));
        assert!(Rc::ptr_eq(&snapshot, &store.goals()));
    }

    #[test]
    fn delete_goal_cascades_and_persists() {
        let (backend, mut store) = store_for("alice");
        store.add_goal(Goal::new(1, "Run"));
        store.add_goal(Goal::new(2, "Save"));
        store.add_subtask(1, Subtask::new(3, "shoes"));

        assert!(store.delete_goal(1));
        let persisted = read_goals(backend.as_ref(), "alice");
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].id, 2);
        assert!(persisted.iter().all(|goal| goal.subtask(3).is_none()));
    }

    #[test]
    fn old_snapshot_survives_subtask_toggle() {
        let (_backend, mut store) = store_for("alice");
        store.add_goal(Goal::new(1, "Run"));
        store.add_subtask(1, Subtask::new(2, "shoes"));
        let snapshot = store.goals();

        store.toggle_subtask(1, 2);

        assert!(!snapshot[0].subtasks[0].completed);
        assert!(store.goals()[0].subtasks[0].completed);
    }

    #[test]
    fn stored_goals_accept_sparse_records() {
        let raw = r#"[{"id": 5, "title": "Read", "dueDate": "2024-07-01T00:00:00Z"},
                      {"id": 6, "title": "Sleep", "category": "Health", "dueDate": ""}]"#;
        let goals: Vec<Goal> = serde_json::from_str(raw).unwrap();

        assert_eq!(goals[0].category, DEFAULT_GOAL_CATEGORY);
        assert_eq!(goals[0].due_date.as_deref(), Some("2024-07-01"));
        assert!(goals[0].subtasks.is_empty());
        assert_eq!(goals[1].due_date, None);
    }
}
