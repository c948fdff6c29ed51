//! Error types for the stores and the HTTP layer.
//!
//! `StoreError` is what a `TodoStore` returns. `ApiError` is what handlers
//! return; its `IntoResponse` picks the status code and renders
//! `{"error": "..."}`.

use std::path::PathBuf;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use todo_core::{BackendError, CredentialsError, TodoError};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Todo(#[from] TodoError),

    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode todo collection: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("document backend request failed: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that abort startup.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("credentials: {0}")]
    Credentials(#[from] CredentialsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error returned by request handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// An extractor refused the request; carries the extractor's own status.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Rejected { status, .. } => *status,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::Todo(_)) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::Backend(BackendError::NotFound)) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::Backend(_) | StoreError::Transport(_)) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::Store(StoreError::Io { .. } | StoreError::Parse { .. } | StoreError::Encode(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
