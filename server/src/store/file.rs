//! Flat-file backend: one JSON array, reloaded and rewritten per operation.
//!
//! Every mutation rewrites the whole file, so cost grows with the collection.
//! There is no locking; concurrent writers race and the last one wins.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use todo_core::collection::{self, IdPolicy};
use todo_core::types::DEFAULT_CATEGORY;
use todo_core::{NewTodo, Todo, TodoId, TodoPatch};
use tokio::fs;
use tracing::{debug, info};

use super::TodoStore;
use crate::error::{Result, StoreError};

pub struct FileStore {
    path: PathBuf,
    policy: IdPolicy,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>, policy: IdPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sidecar file holding the highest id ever issued under `IdPolicy::Counter`.
    pub fn counter_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".seq");
        PathBuf::from(name)
    }

    /// Read the whole collection. A missing file is an empty collection.
    pub async fn load(&self) -> Result<Vec<Todo>> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Overwrite the file with the whole collection, indented for humans.
    pub async fn save(&self, todos: &[Todo]) -> Result<()> {
        let raw = serde_json::to_string_pretty(todos).map_err(StoreError::Encode)?;
        write_file(&self.path, raw).await
    }

    async fn last_issued(&self) -> Result<u64> {
        let path = self.counter_path();
        match fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str(raw.trim())
                .map_err(|source| StoreError::Parse { path, source }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    async fn record_issued(&self, id: u64) -> Result<()> {
        write_file(&self.counter_path(), id.to_string()).await
    }
}

async fn write_file(path: &Path, contents: String) -> Result<()> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    fs::write(path, contents).await.map_err(io_err)
}

#[async_trait]
impl TodoStore for FileStore {
    async fn list(&self, owner: Option<&str>) -> Result<Vec<Todo>> {
        let todos = self.load().await?;
        Ok(collection::filter_by_owner(todos, owner))
    }

    async fn get(&self, id: &str) -> Result<Option<Todo>> {
        let id = collection::parse_seq_id(id)?;
        let todos = self.load().await?;
        Ok(collection::find(&todos, id).cloned())
    }

    async fn add(&self, input: NewTodo) -> Result<Todo> {
        let mut todos = self.load().await?;
        let last_issued = match self.policy {
            IdPolicy::Counter => self.last_issued().await?,
            IdPolicy::Length => 0,
        };
        let id = collection::allocate_id(&todos, self.policy, last_issued);
        let todo = input.into_todo(TodoId::Seq(id), DEFAULT_CATEGORY, Some(Utc::now()))?;

        todos.push(todo.clone());
        self.save(&todos).await?;
        if self.policy == IdPolicy::Counter {
            self.record_issued(id).await?;
        }
        info!(id, owner = ?todo.user_id, "todo created");
        Ok(todo)
    }

    async fn update(&self, id: &str, owner: Option<&str>, patch: TodoPatch) -> Result<bool> {
        let id = collection::parse_seq_id(id)?;
        let mut todos = self.load().await?;
        let matched = collection::apply_patch(&mut todos, id, owner, &patch);
        self.save(&todos).await?;
        debug!(id, ?owner, matched, "todo update");
        Ok(matched)
    }

    async fn delete(&self, id: &str, owner: Option<&str>) -> Result<bool> {
        let id = collection::parse_seq_id(id)?;
        let mut todos = self.load().await?;
        let removed = collection::remove(&mut todos, id, owner);
        self.save(&todos).await?;
        debug!(id, ?owner, removed, "todo delete");
        Ok(removed)
    }
}
