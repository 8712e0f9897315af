//! Server startup helper for embedding the API in another process.
//!
//! Provides [`spawn_server`] which binds eagerly and then runs the API on a
//! background Tokio task.
//!
//! # Usage
//!
//! ```rust,ignore
//! use postboard_api::{AppState, ServerConfig, spawn_server};
//! use postboard_store::{FilePersistence, PostStore};
//! use std::sync::Arc;
//!
//! let store = PostStore::open(FilePersistence::new("data/posts.json")).await;
//! let state = Arc::new(AppState::new(store));
//! let (addr, handle) = spawn_server(&ServerConfig::default(), state).await?;
//! // The server is now running on `addr`.
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use postboard_store::Persistence;
use tokio::task::JoinHandle;

use crate::server::{self, ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the API server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the API HTTP server on a background Tokio task.
///
/// The listener is bound before the task is spawned, so bind failures are
/// reported here rather than lost in the background. Returns the bound
/// address (useful with port `0`) and the task handle; the server runs
/// until the task is aborted or the runtime shuts down.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the server cannot bind to the
/// requested address.
pub async fn spawn_server<P: Persistence>(
    config: &ServerConfig,
    state: Arc<AppState<P>>,
) -> Result<(SocketAddr, JoinHandle<()>), StartupError> {
    let listener = server::bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("no local address: {e}")))?;

    let handle = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state, std::future::pending()).await {
            tracing::error!(error = %e, "API server exited with error");
        }
    });

    tracing::info!(%addr, "API server spawned on background task");

    Ok((addr, handle))
}
