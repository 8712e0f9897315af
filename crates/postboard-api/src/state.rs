//! Shared application state for the API server.

use postboard_store::PostStore;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor. The store does its own locking, so handlers only ever need a
/// shared reference.
#[derive(Debug)]
pub struct AppState<P> {
    /// The post store every handler operates on.
    pub store: PostStore<P>,
}

impl<P> AppState<P> {
    /// Wrap an opened store.
    pub const fn new(store: PostStore<P>) -> Self {
        Self { store }
    }
}
