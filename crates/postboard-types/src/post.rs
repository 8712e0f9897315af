//! The post record and the shapes used to create, update, and page it.
//!
//! A [`Post`] is owned by the store; callers only ever see clones. Inputs
//! arrive as [`NewPost`] (create) and [`PostPatch`] (update), and list
//! results leave as a [`PostPage`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::PostId;

// ---------------------------------------------------------------------------
// Post
// ---------------------------------------------------------------------------

/// A single post: an immutable id plus a title and a body.
///
/// Neither `title` nor `content` is ever empty or whitespace-only once the
/// post is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Post {
    /// Store-assigned identifier, unique within the collection.
    pub id: PostId,
    /// Post title.
    pub title: String,
    /// Post body.
    pub content: String,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Input for creating a post.
///
/// Missing fields deserialize to empty strings so they fail validation with
/// a message naming the field, instead of failing JSON extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewPost {
    /// Title of the new post.
    #[serde(default)]
    pub title: String,
    /// Body of the new post.
    #[serde(default)]
    pub content: String,
}

impl NewPost {
    /// Build a create request from anything string-like.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Partial update of a post. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PostPatch {
    /// Replacement title, if any.
    #[serde(default)]
    #[ts(optional)]
    pub title: Option<String>,
    /// Replacement body, if any.
    #[serde(default)]
    #[ts(optional)]
    pub content: Option<String>,
}

impl PostPatch {
    /// Patch that only replaces the title.
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: None,
        }
    }

    /// Patch that only replaces the content.
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            title: None,
            content: Some(content.into()),
        }
    }

    /// Whether the patch changes nothing.
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

// ---------------------------------------------------------------------------
// Paged results
// ---------------------------------------------------------------------------

/// Pagination metadata returned alongside a page of posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PageInfo {
    /// Number of posts in the whole (unpaged) result.
    #[ts(type = "number")]
    pub total_posts: usize,
    /// The 1-based page that was returned.
    #[ts(type = "number")]
    pub page: usize,
    /// Maximum number of posts per page.
    #[ts(type = "number")]
    pub limit: usize,
    /// `ceil(total_posts / limit)`.
    #[ts(type = "number")]
    pub total_pages: usize,
}

/// One page of a (possibly sorted) post listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PostPage {
    /// Posts on this page, in listing order.
    pub posts: Vec<Post>,
    /// Totals and position of this page.
    pub pagination: PageInfo,
}
