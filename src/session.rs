//! One signed-in session: both stores bound to the active identity.

use std::rc::Rc;

use crate::goal::{read_goals, GoalStore};
use crate::identity::{ActiveUser, Identity};
use crate::storage::KeyValueStore;
use crate::task::{read_tasks, TaskStore};

/// Task and goal stores sharing one backend and one active-user handle.
///
/// The caller forwards every auth-state change to
/// [`Session::on_auth_change`]; the stores never cache a namespace.
pub struct Session {
    backend: Rc<dyn KeyValueStore>,
    active: ActiveUser,
    tasks: TaskStore,
    goals: GoalStore,
}

impl Session {
    /// Signed-out session with empty stores
    pub fn new(backend: Rc<dyn KeyValueStore>) -> Self {
        let active = ActiveUser::new();
        Self {
            tasks: TaskStore::new(Rc::clone(&backend), active.clone()),
            goals: GoalStore::new(Rc::clone(&backend), active.clone()),
            backend,
            active,
        }
    }

    /// Session already switched to `identity`
    pub fn signed_in(backend: Rc<dyn KeyValueStore>, identity: &Identity) -> Self {
        let mut session = Self::new(backend);
        session.on_auth_change(Some(identity));
        session
    }

    /// Swap to the namespace of `identity`, or clear everything on sign-out.
    ///
    /// Both lists are read before anything changes, so no observer ever sees
    /// one user's tasks next to another user's goals.
    pub fn on_auth_change(&mut self, identity: Option<&Identity>) {
        let uid = identity.map(|identity| identity.uid.clone());
        let (tasks, goals) = match uid.as_deref() {
            Some(uid) => (
                read_tasks(self.backend.as_ref(), uid),
                read_goals(self.backend.as_ref(), uid),
            ),
            None => (Vec::new(), Vec::new()),
        };

        match uid.as_deref() {
            Some(uid) => tracing::debug!(uid, tasks = tasks.len(), goals = goals.len(), "switched user"),
            None => tracing::debug!("signed out, stores cleared"),
        }

        self.active.set(uid);
        self.tasks.load_tasks(tasks);
        self.goals.load_goals(goals);
    }

    pub fn active_uid(&self) -> Option<String> {
        self.active.get()
    }

    pub fn is_signed_in(&self) -> bool {
        self.active.get().is_some()
    }

    pub fn backend(&self) -> &dyn KeyValueStore {
        self.backend.as_ref()
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut TaskStore {
        &mut self.tasks
    }

    pub fn goals(&self) -> &GoalStore {
        &self.goals
    }

    pub fn goals_mut(&mut self) -> &mut GoalStore {
        &mut self.goals
    }
}
