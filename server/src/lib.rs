//! Multi-user todo list web service.
//!
//! # Overview
//! `api` maps HTTP verbs and paths onto a `TodoStore`; `store` holds the two
//! persistence backends (flat JSON file, remote document collection). The
//! backend and its response style are picked once at startup from `Config`.

pub mod api;
pub mod config;
pub mod error;
pub mod store;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use todo_core::Credentials;
use tracing::info;

pub use api::{AppState, ResponseStyle};
pub use config::{Backend, Config};
pub use error::{ApiError, ServerError, StoreError};
pub use store::{DocumentCollection, DocumentStore, FileStore, RemoteCollection, TodoStore};

pub fn app(state: AppState) -> Router {
    api::router(state)
}

/// Build the configured store. The document backend reads its credentials
/// from the environment here, once, and shares one client for the process.
pub fn open_store(config: &Config) -> Result<Arc<dyn TodoStore>, ServerError> {
    match config.backend {
        Backend::File => {
            info!(path = %config.data_file.display(), policy = ?config.id_policy, "using file backend");
            Ok(Arc::new(FileStore::new(config.data_file.clone(), config.id_policy.into())))
        }
        Backend::Document => {
            let credentials = Credentials::from_env(&config.credentials_var)?;
            info!(
                endpoint = %credentials.endpoint,
                project = %credentials.project_id,
                collection = %config.collection,
                "using document backend"
            );
            let collection = RemoteCollection::from_credentials(&credentials, &config.collection);
            Ok(Arc::new(DocumentStore::new(Arc::new(collection))))
        }
    }
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutting down"),
        // without a signal handler the server runs until killed
        Err(_) => std::future::pending::<()>().await,
    }
}
