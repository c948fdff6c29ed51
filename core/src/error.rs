//! Error types for the todo domain and the document API client.
//!
//! `BackendError::NotFound` has its own variant because the document store
//! surfaces it to HTTP clients as a 404, while every other unexpected status
//! is a backend failure.

use thiserror::Error;

/// Input errors raised while building or addressing a todo.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TodoError {
    #[error("missing required field `text`")]
    MissingText,

    #[error("invalid todo id: {0}")]
    InvalidId(String),
}

/// Errors returned by `DocumentClient` build and parse methods.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("document not found")]
    NotFound,

    #[error("document backend rejected the credentials")]
    Unauthorized,

    #[error("document backend returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("could not decode document backend response: {0}")]
    Deserialization(String),

    #[error("could not encode document payload: {0}")]
    Serialization(String),
}

/// Errors raised while loading backend credentials at startup.
#[derive(Error, Debug)]
pub enum CredentialsError {
    #[error("environment variable {0} is not set")]
    Missing(String),

    #[error("credentials are not valid JSON: {0}")]
    Invalid(#[from] serde_json::Error),
}
