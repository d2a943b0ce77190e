//! The todo resource: model, validation, storage and HTTP routes.

pub mod model;
pub mod routes;
pub mod store;
pub mod validate;

pub use model::{NewTodo, Todo, TodoId, TodoPatch};
pub use routes::{app, router};
pub use store::{MemoryStore, PostgresStore, SharedStore, Store, StoreError};
pub use validate::{ValidationError, validate_new, validate_patch};
