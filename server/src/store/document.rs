//! Document-collection backend.
//!
//! Keeps no local state: every operation is a call on the injected
//! `DocumentCollection`. Update and delete do not check existence first
//! unless an owner scope has to be verified.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use todo_core::mapping::{
    document_fields, document_owner, patch_fields, todo_from_document, OWNER_FIELD,
};
use todo_core::types::owner_scope;
use todo_core::{Document, NewTodo, Todo, TodoId, TodoPatch};
use tracing::{debug, info};

use super::TodoStore;
use crate::error::Result;

/// The operations the document store needs from a remote collection.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Document>>;

    /// Documents whose `field` equals `value`.
    async fn query(&self, field: &str, value: &str) -> Result<Vec<Document>>;

    async fn list(&self) -> Result<Vec<Document>>;

    /// Insert a document and return the key the backend assigned.
    async fn add(&self, fields: Map<String, Value>) -> Result<String>;

    /// Merge `patch` into an existing document; fails with not-found if absent.
    async fn update(&self, id: &str, patch: Map<String, Value>) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}

pub struct DocumentStore {
    collection: Arc<dyn DocumentCollection>,
}

impl DocumentStore {
    pub fn new(collection: Arc<dyn DocumentCollection>) -> Self {
        Self { collection }
    }

    /// With an owner scope, the document must exist and belong to `owner`.
    async fn owned_by(&self, id: &str, owner: Option<&str>) -> Result<bool> {
        let Some(owner) = owner_scope(owner) else {
            return Ok(true);
        };
        let document = self.collection.get(id).await?;
        Ok(document.is_some_and(|d| document_owner(&d) == Some(owner)))
    }
}

#[async_trait]
impl TodoStore for DocumentStore {
    async fn list(&self, owner: Option<&str>) -> Result<Vec<Todo>> {
        let documents = match owner_scope(owner) {
            Some(owner) => self.collection.query(OWNER_FIELD, owner).await?,
            None => self.collection.list().await?,
        };
        let todos = documents
            .into_iter()
            .map(todo_from_document)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(todos)
    }

    async fn get(&self, id: &str) -> Result<Option<Todo>> {
        match self.collection.get(id).await? {
            Some(document) => Ok(Some(todo_from_document(document)?)),
            None => Ok(None),
        }
    }

    async fn add(&self, input: NewTodo) -> Result<Todo> {
        let mut todo = input.into_todo(TodoId::Key(String::new()), "", None)?;
        let id = self.collection.add(document_fields(&todo)).await?;
        info!(%id, owner = ?todo.user_id, "todo created");
        todo.id = TodoId::Key(id);
        Ok(todo)
    }

    async fn update(&self, id: &str, owner: Option<&str>, patch: TodoPatch) -> Result<bool> {
        if !self.owned_by(id, owner).await? {
            debug!(%id, ?owner, "update skipped, owner does not match");
            return Ok(false);
        }
        self.collection.update(id, patch_fields(&patch)).await?;
        Ok(true)
    }

    async fn delete(&self, id: &str, owner: Option<&str>) -> Result<bool> {
        if !self.owned_by(id, owner).await? {
            debug!(%id, ?owner, "delete skipped, owner does not match");
            return Ok(false);
        }
        self.collection.delete(id).await?;
        Ok(true)
    }
}
