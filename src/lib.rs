//! taskbuddy - Personal Task and Goal Library
//!
//! This library provides the state model behind the taskbuddy CLI: per-user
//! task and goal lists, the calendar windows they are viewed through, and
//! the projections computed from them.
//!
//! # Core Concepts
//!
//! - **Tasks**: to-do items scoped to one day (`daily`) or one week (`weekly`)
//! - **Goals**: longer-horizon objectives broken into ordered subtasks
//! - **Namespaces**: each user's lists persist under `<store>-<uid>`
//! - **Projections**: today's tasks, this week's tasks, progress, reminders
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `taskbuddy.toml`
//! - `date`: Date normalization and the Monday..Sunday week window
//! - `error`: Error types and result aliases
//! - `goal`: Goals, subtasks and the goal store
//! - `identity`: Signed-in identity and the shared active-user handle
//! - `lock`: File locking and atomic writes
//! - `output`: Human and JSON command output
//! - `profile`: Per-user profile fields
//! - `projection`: Pure views over tasks and goals
//! - `session`: Both stores bound to one auth state
//! - `storage`: Key-value backends and the home directory layout
//! - `task`: Tasks and the task store

pub mod cli;
pub mod config;
pub mod date;
pub mod error;
pub mod goal;
pub mod identity;
pub mod lock;
pub mod output;
pub mod profile;
pub mod projection;
pub mod session;
pub mod storage;
pub mod task;

pub use error::{Error, Result};
