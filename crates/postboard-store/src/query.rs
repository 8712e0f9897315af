//! Query engine: search, sort, and pagination over a post snapshot.
//!
//! Everything here works on an owned or borrowed slice of posts and never
//! touches the store's state. Parameters coming from the HTTP layer arrive
//! as raw strings ([`ListParams`]) and are validated into a [`ListQuery`]
//! before any data is read.

use std::cmp::Reverse;
use std::str::FromStr;

use postboard_types::{PageInfo, Post, PostPage};
use serde::Deserialize;

use crate::error::{StoreError, StoreResult};

/// Page size used when the caller does not give a `limit`.
pub const DEFAULT_PAGE_LIMIT: usize = 5;

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Field a listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// Sort by post title.
    Title,
    /// Sort by post content.
    Content,
}

impl SortField {
    fn value(self, post: &Post) -> &str {
        match self {
            Self::Title => &post.title,
            Self::Content => &post.content,
        }
    }
}

impl FromStr for SortField {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "content" => Ok(Self::Content),
            _ => Err(StoreError::validation(format!(
                "invalid sort field '{s}': expected 'title' or 'content'"
            ))),
        }
    }
}

/// Sort direction. Ascending unless asked otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// A to Z.
    #[default]
    Asc,
    /// Z to A.
    Desc,
}

impl FromStr for SortDirection {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(StoreError::validation(format!(
                "invalid sort direction '{s}': expected 'asc' or 'desc'"
            ))),
        }
    }
}

/// A field plus a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    /// Field to compare.
    pub field: SortField,
    /// Order of the comparison.
    pub direction: SortDirection,
}

impl SortSpec {
    /// Ascending sort on `field`.
    pub const fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    /// Descending sort on `field`.
    pub const fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }
}

/// Sort posts in place by the case-insensitive value of a field.
///
/// The sort is stable, so posts that compare equal keep insertion order in
/// both directions.
pub fn sort_posts(posts: &mut [Post], spec: SortSpec) {
    let field = spec.field;
    match spec.direction {
        SortDirection::Asc => posts.sort_by_cached_key(|p| field.value(p).to_lowercase()),
        SortDirection::Desc => {
            posts.sort_by_cached_key(|p| Reverse(field.value(p).to_lowercase()));
        }
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// A validated 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    limit: usize,
}

impl Pagination {
    /// Build a pagination window.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if `page` or `limit` is zero.
    pub fn new(page: usize, limit: usize) -> StoreResult<Self> {
        if page < 1 {
            return Err(StoreError::validation("page must be >= 1"));
        }
        if limit < 1 {
            return Err(StoreError::validation("limit must be >= 1"));
        }
        Ok(Self { page, limit })
    }

    /// First page with the given limit (zero is bumped to one).
    pub fn first(limit: usize) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
        }
    }

    /// The 1-based page number.
    pub const fn page(&self) -> usize {
        self.page
    }

    /// The page size.
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Index of the first post on this page.
    pub const fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_LIMIT)
    }
}

/// Cut one page out of `posts`.
///
/// A page past the end yields an empty `posts` list with the usual totals;
/// that is not an error.
pub fn paginate(posts: Vec<Post>, pagination: Pagination) -> PostPage {
    let total_posts = posts.len();
    let limit = pagination.limit();
    let total_pages = total_posts.div_ceil(limit);

    let posts = posts
        .into_iter()
        .skip(pagination.offset())
        .take(limit)
        .collect();

    PostPage {
        posts,
        pagination: PageInfo {
            total_posts,
            page: pagination.page(),
            limit,
            total_pages,
        },
    }
}

// ---------------------------------------------------------------------------
// List queries
// ---------------------------------------------------------------------------

/// Raw listing parameters as they arrive on a query string.
///
/// Everything is a string so that bad numbers surface as validation errors
/// naming the parameter. Empty values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListParams {
    /// Sort field name (`title` or `content`).
    pub sort: Option<String>,
    /// Sort direction (`asc` or `desc`).
    pub direction: Option<String>,
    /// 1-based page number.
    pub page: Option<String>,
    /// Page size.
    pub limit: Option<String>,
}

/// A validated listing query: optional sort plus a pagination window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Sort to apply before paging; `None` keeps insertion order.
    pub sort: Option<SortSpec>,
    /// Page to return.
    pub pagination: Pagination,
}

impl ListQuery {
    /// Validate raw parameters.
    ///
    /// A direction without a sort field is accepted but has no effect.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for an unknown sort field or
    /// direction, or for a `page`/`limit` that is not an integer >= 1.
    pub fn from_params(params: &ListParams, default_limit: usize) -> StoreResult<Self> {
        let direction = present(params.direction.as_deref())
            .map(SortDirection::from_str)
            .transpose()?
            .unwrap_or_default();

        let sort = present(params.sort.as_deref())
            .map(SortField::from_str)
            .transpose()?
            .map(|field| SortSpec { field, direction });

        let page = present(params.page.as_deref())
            .map(|raw| parse_positive("page", raw))
            .transpose()?
            .unwrap_or(1);

        let limit = match present(params.limit.as_deref()) {
            Some(raw) => parse_positive("limit", raw)?,
            None => default_limit,
        };

        Ok(Self {
            sort,
            pagination: Pagination::new(page, limit)?,
        })
    }

    /// Sort (if requested) and then cut the requested page.
    pub fn apply(&self, mut posts: Vec<Post>) -> PostPage {
        if let Some(spec) = self.sort {
            sort_posts(&mut posts, spec);
        }
        paginate(posts, self.pagination)
    }
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.trim().is_empty())
}

fn parse_positive(name: &str, raw: &str) -> StoreResult<usize> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|e| StoreError::validation(format!("{name} must be an integer, got '{raw}': {e}")))?;
    if value < 1 {
        return Err(StoreError::validation(format!("{name} must be >= 1")));
    }
    usize::try_from(value).map_err(|e| StoreError::validation(format!("{name} is too large: {e}")))
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Case-insensitive substring search over titles and contents.
///
/// A post matches if its title contains `title` OR its content contains
/// `content`. Terms are matched verbatim apart from case, whitespace
/// included. An absent or empty term matches nothing, so an empty query
/// matches no posts at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchQuery {
    /// Substring to look for in titles.
    pub title: Option<String>,
    /// Substring to look for in contents.
    pub content: Option<String>,
}

impl SearchQuery {
    /// Search titles only.
    pub fn title(term: impl Into<String>) -> Self {
        Self {
            title: Some(term.into()),
            content: None,
        }
    }

    /// Search contents only.
    pub fn content(term: impl Into<String>) -> Self {
        Self {
            title: None,
            content: Some(term.into()),
        }
    }

    /// Whether neither term is present.
    pub fn is_empty(&self) -> bool {
        normalize(self.title.as_deref()).is_none() && normalize(self.content.as_deref()).is_none()
    }

    /// Filter `posts`, keeping insertion order.
    pub fn filter(&self, posts: &[Post]) -> Vec<Post> {
        let title = normalize(self.title.as_deref());
        let content = normalize(self.content.as_deref());
        if title.is_none() && content.is_none() {
            return Vec::new();
        }

        posts
            .iter()
            .filter(|post| {
                contains(title.as_deref(), &post.title) || contains(content.as_deref(), &post.content)
            })
            .cloned()
            .collect()
    }
}

fn normalize(term: Option<&str>) -> Option<String> {
    term.filter(|t| !t.is_empty()).map(str::to_lowercase)
}

fn contains(term: Option<&str>, haystack: &str) -> bool {
    term.is_some_and(|t| haystack.to_lowercase().contains(t))
}
