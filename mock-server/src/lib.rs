//! In-memory stand-in for the hosted document-collection API.
//!
//! Collections are addressed as `/projects/{project}/collections/{collection}`
//! and created on first write. Documents get a random key on insert. When
//! built with an API key every request must present it as a bearer token.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DocumentQuery {
    pub field: Option<String>,
    pub value: Option<String>,
}

type Collection = HashMap<String, Map<String, Value>>;

pub type Db = Arc<RwLock<HashMap<String, Collection>>>;

#[derive(Clone)]
struct MockState {
    db: Db,
    api_key: Option<Arc<str>>,
}

/// Open mock: no API key required.
pub fn app() -> Router {
    router(None)
}

/// Mock that answers 401 unless the request carries `Bearer {api_key}`.
pub fn secured_app(api_key: &str) -> Router {
    router(Some(api_key.into()))
}

fn router(api_key: Option<Arc<str>>) -> Router {
    let state = MockState {
        db: Arc::new(RwLock::new(HashMap::new())),
        api_key,
    };
    Router::new()
        .route(
            "/projects/{project}/collections/{collection}/documents",
            get(list_documents).post(add_document),
        )
        .route(
            "/projects/{project}/collections/{collection}/documents/{id}",
            get(get_document).patch(update_document).delete(delete_document),
        )
        .with_state(state)
}

pub async fn run(listener: TcpListener, api_key: Option<String>) -> Result<(), std::io::Error> {
    let app = match api_key {
        Some(key) => secured_app(&key),
        None => app(),
    };
    axum::serve(listener, app).await
}

fn collection_key(project: &str, collection: &str) -> String {
    format!("{project}/{collection}")
}

fn authorize(state: &MockState, headers: &HeaderMap) -> Result<(), StatusCode> {
    let Some(expected) = &state.api_key else {
        return Ok(());
    };
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if presented == Some(expected.as_ref()) {
        Ok(())
    } else {
        tracing::warn!("rejected request with missing or wrong api key");
        Err(StatusCode::UNAUTHORIZED)
    }
}

async fn list_documents(
    State(state): State<MockState>,
    Path((project, collection)): Path<(String, String)>,
    Query(query): Query<DocumentQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<Document>>, StatusCode> {
    authorize(&state, &headers)?;
    let db = state.db.read().await;
    let Some(documents) = db.get(&collection_key(&project, &collection)) else {
        return Ok(Json(Vec::new()));
    };
    let matching = documents
        .iter()
        .filter(|(_, fields)| match (&query.field, &query.value) {
            (Some(field), Some(value)) => fields.get(field) == Some(&Value::String(value.clone())),
            _ => true,
        })
        .map(|(id, fields)| Document {
            id: id.clone(),
            fields: fields.clone(),
        })
        .collect();
    Ok(Json(matching))
}

async fn add_document(
    State(state): State<MockState>,
    Path((project, collection)): Path<(String, String)>,
    headers: HeaderMap,
    Json(fields): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<Document>), StatusCode> {
    authorize(&state, &headers)?;
    let id = Uuid::new_v4().simple().to_string();
    state
        .db
        .write()
        .await
        .entry(collection_key(&project, &collection))
        .or_default()
        .insert(id.clone(), fields.clone());
    tracing::debug!(%project, %collection, %id, "document added");
    Ok((StatusCode::CREATED, Json(Document { id, fields })))
}

async fn get_document(
    State(state): State<MockState>,
    Path((project, collection, id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<Json<Document>, StatusCode> {
    authorize(&state, &headers)?;
    let db = state.db.read().await;
    db.get(&collection_key(&project, &collection))
        .and_then(|documents| documents.get(&id))
        .map(|fields| {
            Json(Document {
                id: id.clone(),
                fields: fields.clone(),
            })
        })
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_document(
    State(state): State<MockState>,
    Path((project, collection, id)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(patch): Json<Map<String, Value>>,
) -> Result<Json<Document>, StatusCode> {
    authorize(&state, &headers)?;
    let mut db = state.db.write().await;
    let fields = db
        .get_mut(&collection_key(&project, &collection))
        .and_then(|documents| documents.get_mut(&id))
        .ok_or(StatusCode::NOT_FOUND)?;
    fields.extend(patch);
    Ok(Json(Document {
        id,
        fields: fields.clone(),
    }))
}

/// Deleting a missing document is not an error.
async fn delete_document(
    State(state): State<MockState>,
    Path((project, collection, id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<StatusCode, StatusCode> {
    authorize(&state, &headers)?;
    let mut db = state.db.write().await;
    if let Some(documents) = db.get_mut(&collection_key(&project, &collection)) {
        documents.remove(&id);
    }
    Ok(StatusCode::NO_CONTENT)
}
