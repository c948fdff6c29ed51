//! Persistence behind the router.
//!
//! Two interchangeable backends implement `TodoStore`: a flat JSON file and a
//! remote document collection. Update and delete report whether a record
//! matched; the router acknowledges success either way.

mod document;
mod file;
mod remote;

use async_trait::async_trait;
use todo_core::{NewTodo, Todo, TodoPatch};

use crate::error::Result;

pub use document::{DocumentCollection, DocumentStore};
pub use file::FileStore;
pub use remote::RemoteCollection;

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All todos, or only those owned by `owner` when it is non-empty.
    async fn list(&self, owner: Option<&str>) -> Result<Vec<Todo>>;

    async fn get(&self, id: &str) -> Result<Option<Todo>>;

    /// Apply creation defaults, allocate an id and persist.
    async fn add(&self, input: NewTodo) -> Result<Todo>;

    /// Merge `patch` into the todo with `id`, restricted to `owner` when
    /// given. Returns whether a todo was updated.
    async fn update(&self, id: &str, owner: Option<&str>, patch: TodoPatch) -> Result<bool>;

    /// Remove the todo with `id`, restricted to `owner` when given.
    async fn delete(&self, id: &str, owner: Option<&str>) -> Result<bool>;
}
