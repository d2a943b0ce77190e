//! Payload validation for todo writes.
//!
//! Fields are checked in declaration order, `task` then `completed`, and the
//! first violated rule is reported. Unknown fields are ignored.

use serde_json::{Map, Value};
use thiserror::Error;

use super::model::{NewTodo, TodoPatch};

/// Minimum `task` length in UTF-16 code units, the unit JSON clients count in.
pub const TASK_MIN_CHARS: usize = 3;

/// A rejected payload. Displays as the human-readable reason.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ValidationError {
    reason: String,
}

impl ValidationError {
    fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Creation payload: `task` required, `completed` optional (default `false`).
pub fn validate_new(payload: &Value) -> Result<NewTodo, ValidationError> {
    let fields = object(payload)?;
    let task = task(fields)?.ok_or_else(|| ValidationError::new(r#""task" is required"#))?;
    let completed = completed(fields)?.unwrap_or(false);
    Ok(NewTodo { task, completed })
}

/// Update payload: every field optional.
pub fn validate_patch(payload: &Value) -> Result<TodoPatch, ValidationError> {
    let fields = object(payload)?;
    let task = task(fields)?;
    let completed = completed(fields)?;
    Ok(TodoPatch { task, completed })
}

fn object(payload: &Value) -> Result<&Map<String, Value>, ValidationError> {
    payload
        .as_object()
        .ok_or_else(|| ValidationError::new(r#""value" must be of type object"#))
}

fn task(fields: &Map<String, Value>) -> Result<Option<String>, ValidationError> {
    match fields.get("task") {
        None => Ok(None),
        Some(Value::String(task)) if task.is_empty() => {
            Err(ValidationError::new(r#""task" is not allowed to be empty"#))
        }
        Some(Value::String(task)) if task.encode_utf16().count() < TASK_MIN_CHARS => Err(ValidationError::new(
            format!(r#""task" length must be at least {TASK_MIN_CHARS} characters long"#),
        )),
        Some(Value::String(task)) => Ok(Some(task.clone())),
        Some(_) => Err(ValidationError::new(r#""task" must be a string"#)),
    }
}

fn completed(fields: &Map<String, Value>) -> Result<Option<bool>, ValidationError> {
    match fields.get("completed") {
        None => Ok(None),
        Some(Value::Bool(completed)) => Ok(Some(*completed)),
        Some(_) => Err(ValidationError::new(r#""completed" must be a boolean"#)),
    }
}
