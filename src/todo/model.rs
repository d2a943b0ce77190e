//! The todo record and its write payloads.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Identity of a stored todo.
///
/// The volatile store hands out sequential integers; the Postgres store uses
/// the UUID the database generated. Serialized untagged, so clients see a
/// JSON number or a string respectively.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TodoId {
    Seq(u64),
    Key(Uuid),
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seq(n) => write!(f, "{n}"),
            Self::Key(key) => write!(f, "{key}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub task: String,
    pub completed: bool,
}

/// A validated creation payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTodo {
    pub task: String,
    pub completed: bool,
}

/// A validated partial update. `None` leaves the stored field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub task: Option<String>,
    pub completed: Option<bool>,
}

impl TodoPatch {
    /// Merges the present fields into `todo`.
    pub fn apply(self, todo: &mut Todo) {
        if let Some(task) = self.task {
            todo.task = task;
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
    }

    /// The present fields as a JSON object, for backends that merge documents.
    pub fn to_document(&self) -> Value {
        let mut fields = Map::new();
        if let Some(task) = &self.task {
            fields.insert("task".to_owned(), Value::String(task.clone()));
        }
        if let Some(completed) = self.completed {
            fields.insert("completed".to_owned(), Value::Bool(completed));
        }
        Value::Object(fields)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn ids_serialize_as_number_or_string() {
        let seq = Todo { id: TodoId::Seq(3), task: "Test".into(), completed: false };
        assert_eq!(
            serde_json::to_value(&seq).unwrap(),
            json!({ "id": 3, "task": "Test", "completed": false })
        );

        let key = Todo { id: TodoId::Key(Uuid::nil()), task: "Test".into(), completed: true };
        assert_eq!(
            serde_json::to_value(&key).unwrap()["id"],
            "00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn ids_deserialize_back_to_their_variant() {
        let seq: TodoId = serde_json::from_value(json!(7)).unwrap();
        assert_eq!(seq, TodoId::Seq(7));

        let key: TodoId = serde_json::from_value(json!("00000000-0000-0000-0000-000000000000")).unwrap();
        assert_eq!(key, TodoId::Key(Uuid::nil()));
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut todo = Todo { id: TodoId::Seq(1), task: "Learn Node.js".into(), completed: false };
        TodoPatch { task: None, completed: Some(true) }.apply(&mut todo);
        assert_eq!(todo.task, "Learn Node.js");
        assert!(todo.completed);
    }

    #[test]
    fn patch_document_omits_absent_fields() {
        let patch = TodoPatch { task: Some("Write docs".into()), completed: None };
        assert_eq!(patch.to_document(), json!({ "task": "Write docs" }));
        assert_eq!(TodoPatch::default().to_document(), json!({}));
    }
}
