//! HTTP API for the Postboard service.
//!
//! This crate wraps a [`PostStore`] in an Axum router exposing:
//!
//! - **`GET /api/posts`** -- sorted, paginated listing
//! - **`POST /api/posts`** -- create a post
//! - **`PUT /api/posts/{id}`** -- update a post
//! - **`DELETE /api/posts/{id}`** -- delete a post
//! - **`GET /api/posts/search`** -- title/content search
//!
//! # Architecture
//!
//! Handlers are thin: they extract parameters, call one store operation,
//! and serialize the result. Every store error is mapped to a status code
//! by [`ApiError`]. The store is created once at startup and shared through
//! [`AppState`]; there is no ambient global collection.
//!
//! [`PostStore`]: postboard_store::PostStore
//! [`ApiError`]: error::ApiError

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use startup::spawn_server;
pub use state::AppState;
