//! HTTP routes and handlers.
//!
//! The same handlers serve `/api/todos` and `/todos`. Update and delete
//! acknowledge success whenever the store call succeeds, whether or not a
//! todo matched; misses are only logged.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use todo_core::{NewTodo, Todo, TodoPatch};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::store::TodoStore;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Status code and acknowledgment shapes returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ResponseStyle {
    /// 200 on create, `{"success": true}` acknowledgments
    Legacy,
    /// 201 on create, `{"status": "updated" | "deleted"}` acknowledgments
    Rest,
}

impl ResponseStyle {
    pub fn created_status(self) -> StatusCode {
        match self {
            ResponseStyle::Legacy => StatusCode::OK,
            ResponseStyle::Rest => StatusCode::CREATED,
        }
    }

    fn ack(self, status: &str) -> Value {
        match self {
            ResponseStyle::Legacy => json!({ "success": true }),
            ResponseStyle::Rest => json!({ "status": status }),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
    pub style: ResponseStyle,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>, style: ResponseStyle) -> Self {
        Self { store, style }
    }
}

/// Optional owner scope, accepted as `?user_id=` or `?user=`.
#[derive(Debug, Default, Deserialize)]
pub struct OwnerQuery {
    #[serde(default, alias = "user")]
    pub user_id: Option<String>,
}

pub fn router(state: AppState) -> Router {
    let todos = Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo)
                .put(update_todo)
                .patch(update_todo)
                .delete(delete_todo),
        );

    Router::new()
        .route("/", get(index))
        .nest("/api", todos.clone())
        .merge(todos)
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn list_todos(
    State(state): State<AppState>,
    query: Result<Query<OwnerQuery>, QueryRejection>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let Query(query) = query?;
    let todos = state.store.list(query.user_id.as_deref()).await?;
    Ok(Json(todos))
}

async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    state
        .store
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("todo {id} not found")))
}

async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<NewTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(input) = payload?;
    let todo = state.store.add(input).await?;
    Ok((state.style.created_status(), Json(todo)))
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<OwnerQuery>, QueryRejection>,
    payload: Result<Json<TodoPatch>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let Json(patch) = payload?;
    let owner = query.user_id.as_deref();
    let matched = state.store.update(&id, owner, patch).await?;
    if matched {
        info!(%id, "todo updated");
    } else {
        debug!(%id, ?owner, "no todo matched update");
    }
    Ok(Json(state.style.ack("updated")))
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<OwnerQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let owner = query.user_id.as_deref();
    let removed = state.store.delete(&id, owner).await?;
    if removed {
        info!(%id, "todo deleted");
    } else {
        debug!(%id, ?owner, "no todo matched delete");
    }
    Ok(Json(state.style.ack("deleted")))
}
