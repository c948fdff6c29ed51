use clap::Parser;
use tokio::net::TcpListener;
use todo_server::{AppState, Config, ServerError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let store = todo_server::open_store(&config)?;
    let state = AppState::new(store, config.response_style());

    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, backend = ?config.backend, style = ?state.style, "todo server listening");
    todo_server::run(listener, state).await?;
    Ok(())
}
