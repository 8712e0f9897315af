//! Axum router construction for the posts API.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled for cross-origin frontend access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, put};
use postboard_store::Persistence;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the posts API.
///
/// The router includes:
/// - `GET /api/posts` -- list posts
/// - `POST /api/posts` -- create a post
/// - `GET /api/posts/search` -- search posts
/// - `PUT /api/posts/{id}` -- update a post
/// - `DELETE /api/posts/{id}` -- delete a post
///
/// CORS allows any origin so a separately served frontend can call the
/// API directly.
pub fn build_router<P: Persistence>(state: Arc<AppState<P>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/posts",
            get(handlers::list_posts::<P>).post(handlers::create_post::<P>),
        )
        .route("/api/posts/search", get(handlers::search_posts::<P>))
        .route(
            "/api/posts/{id}",
            put(handlers::update_post::<P>).delete(handlers::delete_post::<P>),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
