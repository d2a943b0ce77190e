//! Todo storage.
//!
//! Handlers are written once against [`Store`]; the binary picks the backend
//! at startup. Every backend offers the same contract:
//!
//! - `list` keeps insertion order and can filter on `completed`;
//! - `update` merges only the fields present in the patch;
//! - `get`/`update` return `None` and `delete` returns `false` for an unknown
//!   id, which is distinct from a [`StoreError`].

mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use super::model::{NewTodo, Todo, TodoId, TodoPatch};

/// A store shared by every request handler.
pub type SharedStore = Arc<dyn Store>;

/// Infrastructure failure: the backend could not be reached or rejected the
/// operation. Never used for "not found".
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Short backend name for logs.
    fn kind(&self) -> &'static str;

    /// Parses a path segment into an id this backend can hold. `None` means
    /// no record can have that id.
    fn parse_id(&self, raw: &str) -> Option<TodoId>;

    async fn list(&self, completed: Option<bool>) -> Result<Vec<Todo>, StoreError>;

    async fn get(&self, id: &TodoId) -> Result<Option<Todo>, StoreError>;

    /// Stores a new record; the backend assigns its id.
    async fn insert(&self, new: NewTodo) -> Result<Todo, StoreError>;

    /// Merges `patch` into the record and returns the post-update version.
    async fn update(&self, id: &TodoId, patch: TodoPatch) -> Result<Option<Todo>, StoreError>;

    /// Returns whether a record was actually removed.
    async fn delete(&self, id: &TodoId) -> Result<bool, StoreError>;

    /// Checks the backend can serve requests.
    async fn ping(&self) -> Result<(), StoreError>;
}
