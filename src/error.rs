//! Error types for taskbuddy
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, not signed in, unknown id)
//! - 4: Operation failed (io, serialization, lock contention)
//!
//! Store operations never return these for unknown ids or blank input;
//! only the CLI turns a no-op into a user-facing error.

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the taskbuddy CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for taskbuddy operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("No user is signed in")]
    NotSignedIn,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Task not found: {0}")]
    TaskNotFound(i64),

    #[error("Goal not found: {0}")]
    GoalNotFound(i64),

    #[error("Subtask {subtask_id} not found in goal {goal_id}")]
    SubtaskNotFound { goal_id: i64, subtask_id: i64 },

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::NotSignedIn
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::TaskNotFound(_)
            | Error::GoalNotFound(_)
            | Error::SubtaskNotFound { .. } => exit_codes::USER_ERROR,

            // Operation failures
            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for the JSON error envelope
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::InvalidConfig(message) | Error::InvalidArgument(message) => {
                Some(serde_json::json!({ "message": message }))
            }
            Error::TaskNotFound(id) => Some(serde_json::json!({ "task_id": id })),
            Error::GoalNotFound(id) => Some(serde_json::json!({ "goal_id": id })),
            Error::SubtaskNotFound {
                goal_id,
                subtask_id,
            } => Some(serde_json::json!({
                "goal_id": goal_id,
                "subtask_id": subtask_id,
            })),
            Error::LockFailed(path) => Some(serde_json::json!({
                "path": path.to_string_lossy(),
            })),
            _ => None,
        }
    }
}

/// Result type alias for taskbuddy operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
