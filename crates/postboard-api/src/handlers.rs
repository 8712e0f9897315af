//! REST API endpoint handlers.
//!
//! Each handler makes exactly one call into the shared
//! [`PostStore`](postboard_store::PostStore) and serializes the result.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/posts` | List posts (`?sort=&direction=&page=&limit=`) |
//! | `POST` | `/api/posts` | Create a post |
//! | `PUT` | `/api/posts/{id}` | Update a post's title and/or content |
//! | `DELETE` | `/api/posts/{id}` | Delete a post |
//! | `GET` | `/api/posts/search` | Search (`?title=&content=`) |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use postboard_store::{ListParams, Persistence, SearchQuery};
use postboard_types::{NewPost, PostId, PostPatch};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /api/posts -- list posts
// ---------------------------------------------------------------------------

/// List posts, optionally sorted and paginated.
///
/// # Query Parameters
///
/// - `sort`: `title` | `content` (default: insertion order)
/// - `direction`: `asc` | `desc` (default: `asc`)
/// - `page`: 1-based page number (default 1)
/// - `limit`: posts per page (default from configuration)
pub async fn list_posts<P: Persistence>(
    State(state): State<Arc<AppState<P>>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::InvalidQuery(e.body_text()))?;
    let page = state.store.list_with_params(&params).await?;
    Ok(Json(page))
}

// ---------------------------------------------------------------------------
// POST /api/posts -- create a post
// ---------------------------------------------------------------------------

/// Create a post from a `{ "title": ..., "content": ... }` body.
///
/// Responds `201 Created` with the stored post, including its new id.
pub async fn create_post<P: Persistence>(
    State(state): State<Arc<AppState<P>>>,
    payload: Result<Json<NewPost>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload.map_err(|e| ApiError::InvalidBody(e.body_text()))?;
    let post = state.store.create(input).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

// ---------------------------------------------------------------------------
// PUT /api/posts/{id} -- update a post
// ---------------------------------------------------------------------------

/// Update a post. Fields missing from the body keep their current value.
pub async fn update_post<P: Persistence>(
    State(state): State<Arc<AppState<P>>>,
    Path(id_str): Path<String>,
    payload: Result<Json<PostPatch>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_post_id(&id_str)?;
    let Json(patch) = payload.map_err(|e| ApiError::InvalidBody(e.body_text()))?;
    let post = state.store.update(id, patch).await?;
    Ok(Json(post))
}

// ---------------------------------------------------------------------------
// DELETE /api/posts/{id} -- delete a post
// ---------------------------------------------------------------------------

/// Delete a post and confirm which id was removed.
pub async fn delete_post<P: Persistence>(
    State(state): State<Arc<AppState<P>>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_post_id(&id_str)?;
    let removed = state.store.delete(id).await?;

    Ok(Json(serde_json::json!({
        "message": format!("Post with id {removed} has been deleted successfully."),
        "id": removed,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/posts/search -- search posts
// ---------------------------------------------------------------------------

/// Search posts by title and/or content substring (case-insensitive).
///
/// # Query Parameters
///
/// - `title`: substring to match against titles
/// - `content`: substring to match against contents
///
/// A post matches if either term matches. With no terms the result is an
/// empty array.
pub async fn search_posts<P: Persistence>(
    State(state): State<Arc<AppState<P>>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::InvalidQuery(e.body_text()))?;
    Ok(Json(state.store.search(&query).await))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a post id from a path segment, returning an [`ApiError`] on failure.
fn parse_post_id(s: &str) -> Result<PostId, ApiError> {
    match s.parse::<PostId>() {
        Ok(id) if id.into_inner() > 0 => Ok(id),
        Ok(_) => Err(ApiError::InvalidId(String::from("0: ids start at 1"))),
        Err(e) => Err(ApiError::InvalidId(format!("{s}: {e}"))),
    }
}
