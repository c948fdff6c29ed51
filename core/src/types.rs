//! Domain types for the todo service.
//!
//! # Design
//! One `Todo` shape serves both backends. Input aliases (`user`, `dueDate`)
//! let the document backend's field names deserialize into the same struct,
//! while output always uses the snake_case names.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::TodoError;

pub const DEFAULT_PRIORITY: &str = "medium";
pub const DEFAULT_CATEGORY: &str = "general";

/// Identifier of a todo: a sequential number in the file collection, an
/// opaque key assigned by the document backend otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TodoId {
    Seq(u64),
    Key(String),
}

impl TodoId {
    pub fn as_seq(&self) -> Option<u64> {
        match self {
            TodoId::Seq(n) => Some(*n),
            TodoId::Key(_) => None,
        }
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TodoId::Seq(n) => write!(f, "{n}"),
            TodoId::Key(key) => f.write_str(key),
        }
    }
}

/// A single todo item.
///
/// `created_at` is kept as the ISO-8601 text it was written with; files may
/// hold offset-less local timestamps. Keys this struct does not know land in
/// `extra` and are written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    #[serde(default, alias = "user", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default, alias = "dueDate")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Todo {
    /// True when the todo belongs to `owner`. Unowned todos match no owner.
    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.user_id.as_deref() == Some(owner)
    }
}

fn default_priority() -> String {
    DEFAULT_PRIORITY.to_string()
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Request payload for creating a todo.
///
/// `text` is optional at the type level so a missing field becomes a
/// `TodoError::MissingText` instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTodo {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "dueDate")]
    pub due_date: Option<String>,
    #[serde(default, alias = "user")]
    pub user_id: Option<String>,
}

impl NewTodo {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Build the stored record, applying creation defaults.
    ///
    /// `default_category` differs per backend; `created_at` is only stamped
    /// by the file backend.
    pub fn into_todo(
        self,
        id: TodoId,
        default_category: &str,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<Todo, TodoError> {
        let text = self
            .text
            .filter(|t| !t.is_empty())
            .ok_or(TodoError::MissingText)?;
        Ok(Todo {
            id,
            user_id: owner_scope(self.user_id.as_deref()).map(str::to_string),
            text,
            completed: false,
            priority: self.priority.unwrap_or_else(default_priority),
            category: self
                .category
                .unwrap_or_else(|| default_category.to_string()),
            due_date: self.due_date,
            created_at: created_at.map(|t| t.to_rfc3339_opts(SecondsFormat::Micros, true)),
            extra: Map::new(),
        })
    }
}

/// Partial update. Absent fields are left untouched; `due_date: null`
/// clears the due date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TodoPatch {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "dueDate", deserialize_with = "nullable")]
    pub due_date: Option<Option<String>>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        *self == TodoPatch::default()
    }

    pub fn apply(&self, todo: &mut Todo) {
        if let Some(text) = &self.text {
            todo.text = text.clone();
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        if let Some(priority) = &self.priority {
            todo.priority = priority.clone();
        }
        if let Some(category) = &self.category {
            todo.category = category.clone();
        }
        if let Some(due_date) = &self.due_date {
            todo.due_date = due_date.clone();
        }
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Normalize an owner filter: empty means unscoped.
pub fn owner_scope(owner: Option<&str>) -> Option<&str> {
    owner.filter(|o| !o.is_empty())
}

/// A document as exchanged with the remote collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}
