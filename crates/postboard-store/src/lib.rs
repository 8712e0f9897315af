//! Post store for the Postboard service.
//!
//! This crate owns everything non-trivial about posts:
//!
//! - [`store`] -- [`PostStore`], the in-memory authority over the
//!   collection: create/update/delete with validation and id assignment,
//!   plus listing and search
//! - [`query`] -- search, sort, and pagination over a snapshot
//! - [`persistence`] -- the [`Persistence`] trait with a flat JSON file
//!   adapter and an in-memory adapter
//! - [`seed`] -- starter posts for an empty board
//! - [`error`] -- [`StoreError`]
//!
//! The HTTP layer only translates requests into these calls and maps
//! [`StoreError`] variants onto status codes.

pub mod error;
pub mod persistence;
pub mod query;
pub mod seed;
pub mod store;

// Re-export primary types for convenience.
pub use error::{StoreError, StoreResult};
pub use persistence::{FilePersistence, MemoryPersistence, Persistence};
pub use query::{
    DEFAULT_PAGE_LIMIT, ListParams, ListQuery, Pagination, SearchQuery, SortDirection, SortField,
    SortSpec,
};
pub use seed::default_seed_posts;
pub use store::PostStore;
