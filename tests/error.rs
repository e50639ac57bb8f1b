use std::path::PathBuf;

use serde_json::Value;
use taskbuddy::error::{exit_codes, Error, JsonError};

#[test]
fn exit_code_user_error() {
    let err = Error::InvalidArgument("bad input".to_string());
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    assert_eq!(Error::NotSignedIn.exit_code(), exit_codes::USER_ERROR);
    assert_eq!(Error::TaskNotFound(1).exit_code(), exit_codes::USER_ERROR);
}

#[test]
fn exit_code_operation_failed() {
    let err = Error::OperationFailed("boom".to_string());
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);

    let err = Error::LockFailed(PathBuf::from("store/tasks-u1.json.lock"));
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn details_include_subtask_fields() {
    let err = Error::SubtaskNotFound {
        goal_id: 10,
        subtask_id: 11,
    };
    let details = err.details().expect("details");
    assert_eq!(details["goal_id"], Value::from(10));
    assert_eq!(details["subtask_id"], Value::from(11));
    assert_eq!(err.to_string(), "Subtask 11 not found in goal 10");
}

#[test]
fn json_error_includes_details() {
    let err = Error::InvalidConfig("bad config".to_string());
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::USER_ERROR);
    let details = json.details.expect("details");
    assert_eq!(details["message"], Value::String("bad config".to_string()));
}

#[test]
fn json_error_omits_missing_details() {
    let err = Error::NotSignedIn;
    let value = serde_json::to_value(JsonError::from(&err)).expect("serialize");
    assert_eq!(value["error"], "No user is signed in");
    assert!(value.get("details").is_none());
}
