//! Postgres-backed document collection.
//!
//! Each todo is one row: a random UUID key minted on insert, an insertion sequence
//! for stable ordering, and a JSONB document holding `task` and `completed`.
//! Updates merge the patch into the stored document with `||` and return the
//! post-update row, so fields absent from the patch are never overwritten.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use tokio::sync::OnceCell;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::todo::model::{NewTodo, Todo, TodoId, TodoPatch};

const MAX_CONNECTIONS: u32 = 10;

const CREATE_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS todos (
        id  UUID PRIMARY KEY,
        seq BIGSERIAL NOT NULL,
        doc JSONB NOT NULL
    )
";

/// The stored document, without its key.
#[derive(Debug, Serialize, Deserialize)]
struct Document {
    task: String,
    #[serde(default)]
    completed: bool,
}

type Row = (Uuid, Json<Document>);

fn into_todo((id, Json(doc)): Row) -> Todo {
    Todo { id: TodoId::Key(id), task: doc.task, completed: doc.completed }
}

fn key(id: &TodoId) -> Option<Uuid> {
    match id {
        TodoId::Key(key) => Some(*key),
        TodoId::Seq(_) => None,
    }
}

/// Persistent store over a `PgPool`.
///
/// The table is created on first use rather than at construction, so a
/// database that is down at startup is picked up once it comes back.
pub struct PostgresStore {
    pool: PgPool,
    schema: OnceCell<()>,
}

impl PostgresStore {
    /// Builds a pool without connecting. Fails only on a malformed URL.
    pub fn connect_lazy(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_lazy(database_url)?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool, schema: OnceCell::new() }
    }

    /// The pool, once the table is known to exist.
    async fn pool(&self) -> Result<&PgPool, StoreError> {
        self.schema
            .get_or_try_init(|| async {
                sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
                Ok::<_, StoreError>(())
            })
            .await?;
        Ok(&self.pool)
    }
}

#[async_trait]
impl Store for PostgresStore {
    fn kind(&self) -> &'static str {
        "postgres"
    }

    fn parse_id(&self, raw: &str) -> Option<TodoId> {
        Uuid::parse_str(raw).ok().map(TodoId::Key)
    }

    async fn list(&self, completed: Option<bool>) -> Result<Vec<Todo>, StoreError> {
        let rows: Vec<Row> = sqlx::query_as(
            r"
            SELECT id, doc FROM todos
            WHERE $1::BOOLEAN IS NULL OR (doc->>'completed')::BOOLEAN = $1
            ORDER BY seq
            ",
        )
        .bind(completed)
        .fetch_all(self.pool().await?)
        .await?;
        Ok(rows.into_iter().map(into_todo).collect())
    }

    async fn get(&self, id: &TodoId) -> Result<Option<Todo>, StoreError> {
        let Some(key) = key(id) else {
            return Ok(None);
        };
        let row: Option<Row> = sqlx::query_as("SELECT id, doc FROM todos WHERE id = $1")
            .bind(key)
            .fetch_optional(self.pool().await?)
            .await?;
        Ok(row.map(into_todo))
    }

    async fn insert(&self, new: NewTodo) -> Result<Todo, StoreError> {
        let doc = Document { task: new.task, completed: new.completed };
        let row: Row = sqlx::query_as("INSERT INTO todos (id, doc) VALUES ($1, $2) RETURNING id, doc")
            .bind(Uuid::new_v4())
            .bind(Json(doc))
            .fetch_one(self.pool().await?)
            .await?;
        Ok(into_todo(row))
    }

    async fn update(&self, id: &TodoId, patch: TodoPatch) -> Result<Option<Todo>, StoreError> {
        let Some(key) = key(id) else {
            return Ok(None);
        };
        let row: Option<Row> =
            sqlx::query_as("UPDATE todos SET doc = doc || $2 WHERE id = $1 RETURNING id, doc")
                .bind(key)
                .bind(Json(patch.to_document()))
                .fetch_optional(self.pool().await?)
                .await?;
        Ok(row.map(into_todo))
    }

    async fn delete(&self, id: &TodoId) -> Result<bool, StoreError> {
        let Some(key) = key(id) else {
            return Ok(false);
        };
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(key)
            .execute(self.pool().await?)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(self.pool().await?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_uses_no_server_side_key_generation() {
        // gen_random_uuid() is only built in from Postgres 13.
        assert!(!CREATE_TABLE.contains("gen_random_uuid"));
        assert!(!CREATE_TABLE.contains("DEFAULT"));
    }

    #[test]
    fn documents_default_missing_completed() {
        let doc: Document = serde_json::from_str(r#"{"task":"Imported"}"#).unwrap();
        assert!(!doc.completed);
    }

    #[test]
    fn rows_become_keyed_todos() {
        let todo = into_todo((Uuid::nil(), Json(Document { task: "Test".into(), completed: true })));
        assert_eq!(todo.id, TodoId::Key(Uuid::nil()));
        assert_eq!(todo.task, "Test");
        assert!(todo.completed);
    }

    #[tokio::test]
    async fn parse_id_accepts_only_uuids() {
        // A lazy pool never touches the network until a query runs.
        let store = PostgresStore::connect_lazy("postgres://localhost/unused").unwrap();
        assert_eq!(
            store.parse_id("00000000-0000-0000-0000-000000000000"),
            Some(TodoId::Key(Uuid::nil()))
        );
        assert_eq!(store.parse_id("3"), None);
        assert_eq!(store.parse_id("active"), None);
    }

    #[tokio::test]
    async fn sequential_ids_are_never_found() {
        let store = PostgresStore::connect_lazy("postgres://localhost/unused").unwrap();
        assert!(store.get(&TodoId::Seq(1)).await.unwrap().is_none());
        assert!(!store.delete(&TodoId::Seq(1)).await.unwrap());
        assert!(store.update(&TodoId::Seq(1), TodoPatch::default()).await.unwrap().is_none());
    }
}
