//! Mapping between `Todo` and documents in the remote collection.
//!
//! Documents use the backend's field names: the owner is `user` and the due
//! date is `dueDate`. The id lives outside the field map and `created_at` is
//! never stored.

use serde_json::{Map, Value};

use crate::error::BackendError;
use crate::types::{Document, Todo, TodoId, TodoPatch};

/// Field the collection is queried on to scope a listing to one user.
pub const OWNER_FIELD: &str = "user";

/// Document fields for a newly created todo.
pub fn document_fields(todo: &Todo) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("text".into(), Value::String(todo.text.clone()));
    fields.insert("completed".into(), Value::Bool(todo.completed));
    fields.insert("priority".into(), Value::String(todo.priority.clone()));
    fields.insert("category".into(), Value::String(todo.category.clone()));
    fields.insert("dueDate".into(), optional_string(&todo.due_date));
    fields.insert(OWNER_FIELD.into(), optional_string(&todo.user_id));
    fields
}

/// Partial field map for an update; only the fields set in `patch` appear.
pub fn patch_fields(patch: &TodoPatch) -> Map<String, Value> {
    let mut fields = Map::new();
    if let Some(text) = &patch.text {
        fields.insert("text".into(), Value::String(text.clone()));
    }
    if let Some(completed) = patch.completed {
        fields.insert("completed".into(), Value::Bool(completed));
    }
    if let Some(priority) = &patch.priority {
        fields.insert("priority".into(), Value::String(priority.clone()));
    }
    if let Some(category) = &patch.category {
        fields.insert("category".into(), Value::String(category.clone()));
    }
    if let Some(due_date) = &patch.due_date {
        fields.insert("dueDate".into(), optional_string(due_date));
    }
    fields
}

/// Rebuild a todo from a stored document.
pub fn todo_from_document(document: Document) -> Result<Todo, BackendError> {
    let Document { id, mut fields } = document;
    // the document key wins over any stored "id" field
    fields.insert("id".into(), Value::String(id.clone()));
    let mut todo: Todo = serde_json::from_value(Value::Object(fields))
        .map_err(|e| BackendError::Deserialization(format!("document {id}: {e}")))?;
    todo.id = TodoId::Key(id);
    Ok(todo)
}

/// Owner stored on a document, if any.
pub fn document_owner(document: &Document) -> Option<&str> {
    document.fields.get(OWNER_FIELD).and_then(Value::as_str)
}

fn optional_string(value: &Option<String>) -> Value {
    value.clone().map_or(Value::Null, Value::String)
}
