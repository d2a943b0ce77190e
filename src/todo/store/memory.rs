use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Store, StoreError};
use crate::todo::model::{NewTodo, Todo, TodoId, TodoPatch};

/// Volatile store: an insertion-ordered `Vec` behind a mutex.
///
/// Ids are `max(id) + 1`, or `1` when empty. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    todos: Mutex<Vec<Todo>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The two sample records every fresh process starts with.
    pub fn seeded() -> Self {
        Self::with_todos(vec![
            Todo { id: TodoId::Seq(1), task: "Learn Node.js".to_owned(), completed: false },
            Todo { id: TodoId::Seq(2), task: "Build CRUD API".to_owned(), completed: false },
        ])
    }

    pub fn with_todos(todos: Vec<Todo>) -> Self {
        Self { todos: Mutex::new(todos) }
    }

    pub fn len(&self) -> usize {
        self.todos.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.lock().is_empty()
    }
}

fn seq(id: &TodoId) -> Option<u64> {
    match id {
        TodoId::Seq(n) => Some(*n),
        TodoId::Key(_) => None,
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn parse_id(&self, raw: &str) -> Option<TodoId> {
        raw.parse().ok().map(TodoId::Seq)
    }

    async fn list(&self, completed: Option<bool>) -> Result<Vec<Todo>, StoreError> {
        let todos = self.todos.lock();
        Ok(todos
            .iter()
            .filter(|todo| completed.is_none_or(|wanted| todo.completed == wanted))
            .cloned()
            .collect())
    }

    async fn get(&self, id: &TodoId) -> Result<Option<Todo>, StoreError> {
        Ok(self.todos.lock().iter().find(|todo| &todo.id == id).cloned())
    }

    async fn insert(&self, new: NewTodo) -> Result<Todo, StoreError> {
        let mut todos = self.todos.lock();
        let next = todos.iter().filter_map(|todo| seq(&todo.id)).max().map_or(1, |max| max + 1);
        let todo = Todo { id: TodoId::Seq(next), task: new.task, completed: new.completed };
        todos.push(todo.clone());
        Ok(todo)
    }

    async fn update(&self, id: &TodoId, patch: TodoPatch) -> Result<Option<Todo>, StoreError> {
        let mut todos = self.todos.lock();
        let Some(todo) = todos.iter_mut().find(|todo| &todo.id == id) else {
            return Ok(None);
        };
        patch.apply(todo);
        Ok(Some(todo.clone()))
    }

    async fn delete(&self, id: &TodoId) -> Result<bool, StoreError> {
        let mut todos = self.todos.lock();
        let before = todos.len();
        todos.retain(|todo| &todo.id != id);
        Ok(todos.len() != before)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn new(task: &str) -> NewTodo {
        NewTodo { task: task.to_owned(), completed: false }
    }

    #[tokio::test]
    async fn seeded_store_has_two_samples() {
        let store = MemoryStore::seeded();
        let todos = store.list(None).await.unwrap();
        let tasks: Vec<_> = todos.iter().map(|t| t.task.as_str()).collect();
        assert_eq!(tasks, ["Learn Node.js", "Build CRUD API"]);
    }

    #[tokio::test]
    async fn ids_start_at_one_and_follow_the_max() {
        let store = MemoryStore::new();
        assert_eq!(store.insert(new("first")).await.unwrap().id, TodoId::Seq(1));
        assert_eq!(store.insert(new("second")).await.unwrap().id, TodoId::Seq(2));

        // A gap below the max does not get reused.
        assert!(store.delete(&TodoId::Seq(1)).await.unwrap());
        assert_eq!(store.insert(new("third")).await.unwrap().id, TodoId::Seq(3));
    }

    #[tokio::test]
    async fn list_filters_and_keeps_insertion_order() {
        let store = MemoryStore::new();
        store.insert(NewTodo { task: "aaa".into(), completed: true }).await.unwrap();
        store.insert(new("bbb")).await.unwrap();
        store.insert(NewTodo { task: "ccc".into(), completed: true }).await.unwrap();

        let done: Vec<_> = store.list(Some(true)).await.unwrap().into_iter().map(|t| t.task).collect();
        assert_eq!(done, ["aaa", "ccc"]);
        let open: Vec<_> = store.list(Some(false)).await.unwrap().into_iter().map(|t| t.task).collect();
        assert_eq!(open, ["bbb"]);
    }

    #[tokio::test]
    async fn update_merges_and_reports_missing() {
        let store = MemoryStore::seeded();
        let patch = TodoPatch { task: None, completed: Some(true) };

        let updated = store.update(&TodoId::Seq(2), patch.clone()).await.unwrap().unwrap();
        assert_eq!(updated.task, "Build CRUD API");
        assert!(updated.completed);
        assert_eq!(store.get(&TodoId::Seq(2)).await.unwrap(), Some(updated));

        assert!(store.update(&TodoId::Seq(99), patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_twice_removes_once() {
        let store = MemoryStore::seeded();
        assert!(store.delete(&TodoId::Seq(1)).await.unwrap());
        assert!(!store.delete(&TodoId::Seq(1)).await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn foreign_ids_are_never_found() {
        let store = MemoryStore::seeded();
        let key = TodoId::Key(Uuid::nil());
        assert!(store.get(&key).await.unwrap().is_none());
        assert!(!store.delete(&key).await.unwrap());
    }

    #[test]
    fn parse_id_accepts_only_integers() {
        let store = MemoryStore::new();
        assert_eq!(store.parse_id("3"), Some(TodoId::Seq(3)));
        assert_eq!(store.parse_id("completed"), None);
        assert_eq!(store.parse_id("-1"), None);
        assert_eq!(store.parse_id("3abc"), None);
    }
}
