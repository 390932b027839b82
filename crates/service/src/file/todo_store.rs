use std::sync::Arc;

use rand::Rng;

use models::todo::{NewTodo, Todo, TodoPatch};

use crate::errors::ServiceError;
use crate::storage::{JsonArrayStore, RecoveryPolicy};

/// File-backed CRUD store for todo items.
///
/// Owns the on-disk representation: a pretty-printed JSON array holding
/// the complete collection. Every operation round-trips through the
/// file; mutations run as one critical section so overlapping requests
/// cannot clobber each other's writes.
#[derive(Clone)]
pub struct TodoStore {
    store: Arc<JsonArrayStore<Todo>>,
}

impl TodoStore {
    /// Initialize the store from the given file path. Creates the file
    /// with an empty collection if missing.
    pub async fn new<P: Into<std::path::PathBuf>>(
        path: P,
        policy: RecoveryPolicy,
    ) -> Result<Arc<Self>, ServiceError> {
        let store = JsonArrayStore::<Todo>::new(path, policy).await?;
        Ok(Arc::new(Self { store }))
    }

    /// List the full collection.
    pub async fn list(&self) -> Result<Vec<Todo>, ServiceError> {
        self.store.load_all().await
    }

    /// Fetch the first todo with the given id.
    pub async fn get(&self, id: &str) -> Result<Todo, ServiceError> {
        self.store
            .load_all()
            .await?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| ServiceError::not_found("todo"))
    }

    /// Validate input, assign a fresh id, append and persist.
    pub async fn create(&self, input: NewTodo) -> Result<Todo, ServiceError> {
        input.validate()?;
        self.store
            .update_vec(move |items| {
                let id = assign_id(items, random_id);
                let todo = Todo {
                    id,
                    title: input.title,
                    description: input.description,
                    completed: input.completed,
                };
                items.push(todo.clone());
                Ok(todo)
            })
            .await
    }

    /// Apply a partial update to the todo with the given id.
    ///
    /// `title` and `description` are replaced only when provided
    /// non-empty. `completed` is always set: `Some(true)` makes it true,
    /// anything else (including an omitted field) resets it to false.
    /// The asymmetry matches the service's historical wire behavior and
    /// is pinned by tests.
    pub async fn update(&self, id: &str, patch: TodoPatch) -> Result<Todo, ServiceError> {
        let id = id.to_string();
        self.store
            .update_vec(move |items| {
                let todo = items
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or_else(|| ServiceError::not_found("todo"))?;
                if let Some(title) = patch.title.as_deref() {
                    if !title.is_empty() {
                        todo.title = title.to_string();
                    }
                }
                if let Some(description) = patch.description.as_deref() {
                    if !description.is_empty() {
                        todo.description = description.to_string();
                    }
                }
                todo.completed = patch.completed == Some(true);
                Ok(todo.clone())
            })
            .await
    }

    /// Remove exactly the first todo matching the given id.
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let id = id.to_string();
        self.store
            .update_vec(move |items| {
                let idx = items
                    .iter()
                    .position(|t| t.id == id)
                    .ok_or_else(|| ServiceError::not_found("todo"))?;
                items.remove(idx);
                Ok(())
            })
            .await
    }
}

/// Width of generated ids, in decimal digits.
const ID_DIGITS: u32 = 10;

fn random_id() -> String {
    let mut rng = rand::thread_rng();
    format!("{:010}", rng.gen_range(0..10u64.pow(ID_DIGITS)))
}

/// Draw ids from `gen` until one does not collide with the collection.
/// The generator is injected so collision handling is testable.
fn assign_id(existing: &[Todo], mut gen: impl FnMut() -> String) -> String {
    loop {
        let id = gen();
        if !existing.iter().any(|t| t.id == id) {
            return id;
        }
    }
}
