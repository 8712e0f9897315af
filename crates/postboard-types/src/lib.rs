//! Shared type definitions for the Postboard service.
//!
//! This crate is the single source of truth for the post record and the
//! request/response shapes built around it. Types defined here flow
//! downstream to `TypeScript` via `ts-rs` for the web frontend.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrapper for post identifiers
//! - [`post`] -- The post record, create/update inputs, and paged results

pub mod ids;
pub mod post;

// Re-export all public types at crate root for convenience.
pub use ids::PostId;
pub use post::{NewPost, PageInfo, Post, PostPage, PostPatch};
