//! Pure operations on a loaded file collection.
//!
//! The file backend loads the whole array, runs one of these functions and
//! writes the whole array back. Nothing here touches the disk.

use crate::error::TodoError;
use crate::types::{owner_scope, Todo, TodoPatch};

/// How the file backend picks the id of a new todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdPolicy {
    /// `len + 1`. Ids are reused once records have been deleted.
    Length,
    /// One past the highest id ever issued, tracked by a persisted counter.
    #[default]
    Counter,
}

/// Pick the id for a new todo.
///
/// `last_issued` is the persisted counter; it is ignored by `Length`.
pub fn allocate_id(todos: &[Todo], policy: IdPolicy, last_issued: u64) -> u64 {
    match policy {
        IdPolicy::Length => todos.len() as u64 + 1,
        IdPolicy::Counter => {
            let highest = todos
                .iter()
                .filter_map(|t| t.id.as_seq())
                .max()
                .unwrap_or(0);
            highest.max(last_issued) + 1
        }
    }
}

/// Parse an id from a request path. The file collection only has numeric ids.
pub fn parse_seq_id(raw: &str) -> Result<u64, TodoError> {
    raw.parse()
        .map_err(|_| TodoError::InvalidId(raw.to_string()))
}

/// Keep only the todos owned by `owner`; an empty or absent owner keeps all.
pub fn filter_by_owner(todos: Vec<Todo>, owner: Option<&str>) -> Vec<Todo> {
    match owner_scope(owner) {
        Some(owner) => todos.into_iter().filter(|t| t.is_owned_by(owner)).collect(),
        None => todos,
    }
}

fn matches(todo: &Todo, id: u64, owner: Option<&str>) -> bool {
    todo.id.as_seq() == Some(id) && owner_scope(owner).is_none_or(|o| todo.is_owned_by(o))
}

pub fn find(todos: &[Todo], id: u64) -> Option<&Todo> {
    todos.iter().find(|t| t.id.as_seq() == Some(id))
}

/// Merge `patch` into the first todo matching `id` (and `owner`, when
/// given). Returns whether a todo matched.
pub fn apply_patch(todos: &mut [Todo], id: u64, owner: Option<&str>, patch: &TodoPatch) -> bool {
    match todos.iter_mut().find(|t| matches(t, id, owner)) {
        Some(todo) => {
            patch.apply(todo);
            true
        }
        None => false,
    }
}

/// Remove every todo matching `id` (and `owner`, when given). Returns
/// whether anything was removed.
pub fn remove(todos: &mut Vec<Todo>, id: u64, owner: Option<&str>) -> bool {
    let before = todos.len();
    todos.retain(|t| !matches(t, id, owner));
    todos.len() != before
}
