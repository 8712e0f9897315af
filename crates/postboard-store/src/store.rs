//! The post store: in-memory authority over the collection.
//!
//! [`PostStore`] keeps the collection resident and writes it through its
//! [`Persistence`] adapter after every mutation.
//!
//! # Concurrency
//!
//! Mutations (create, update, delete, seed) serialize on a single writer
//! lock. Each one copies the current collection, applies the change to the
//! copy, saves the copy, and only then swaps it in. A failed save leaves
//! both the resident collection and the durable store as they were. Reads
//! take a shared lock and work on a clone, so they only ever observe a fully
//! committed collection.
//!
//! # Unreadable stores
//!
//! If the durable store exists but cannot be read at open, the store starts
//! empty and refuses every mutation until a retried load succeeds. This
//! keeps a transient read failure from overwriting the data on disk.

use postboard_types::{NewPost, Post, PostId, PostPage, PostPatch};
use tokio::sync::{Mutex, MutexGuard, RwLock};

use crate::error::{StoreError, StoreResult};
use crate::persistence::Persistence;
use crate::query::{DEFAULT_PAGE_LIMIT, ListParams, ListQuery, SearchQuery};

/// Owns the post collection and every operation on it.
#[derive(Debug)]
pub struct PostStore<P> {
    persistence: P,
    posts: RwLock<Vec<Post>>,
    /// Serializes mutations. Holds whether the durable collection has been
    /// read successfully.
    writer: Mutex<bool>,
    default_page_limit: usize,
}

impl<P: Persistence> PostStore<P> {
    /// Open a store, loading the current collection from `persistence`.
    ///
    /// A store that cannot be read opens empty and read-only; see the
    /// module docs.
    pub async fn open(persistence: P) -> Self {
        let (posts, loaded) = match persistence.load().await {
            Ok(posts) => {
                tracing::info!(count = posts.len(), "Post store opened");
                (posts, true)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Post store unreadable, refusing writes until it can be loaded"
                );
                (Vec::new(), false)
            }
        };
        Self {
            persistence,
            posts: RwLock::new(posts),
            writer: Mutex::new(loaded),
            default_page_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Set the page size used when a listing gives no `limit`.
    ///
    /// Zero is bumped to one.
    #[must_use]
    pub fn with_default_page_limit(mut self, limit: usize) -> Self {
        self.default_page_limit = limit.max(1);
        self
    }

    /// Page size used when a listing gives no `limit`.
    pub const fn default_page_limit(&self) -> usize {
        self.default_page_limit
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Snapshot of the whole collection in insertion order.
    pub async fn all(&self) -> Vec<Post> {
        self.posts.read().await.clone()
    }

    /// Number of posts.
    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }

    /// Whether the collection is empty.
    pub async fn is_empty(&self) -> bool {
        self.posts.read().await.is_empty()
    }

    /// Look up a single post.
    pub async fn get(&self, id: PostId) -> Option<Post> {
        self.posts.read().await.iter().find(|p| p.id == id).cloned()
    }

    /// Run a validated listing query: sort (if any), then paginate.
    pub async fn list(&self, query: &ListQuery) -> PostPage {
        query.apply(self.all().await)
    }

    /// Validate raw listing parameters, then run the listing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the parameters are invalid.
    /// Nothing is read in that case.
    pub async fn list_with_params(&self, params: &ListParams) -> StoreResult<PostPage> {
        let query = ListQuery::from_params(params, self.default_page_limit)?;
        Ok(self.list(&query).await)
    }

    /// Posts matching a search, in insertion order.
    pub async fn search(&self, query: &SearchQuery) -> Vec<Post> {
        if query.is_empty() {
            return Vec::new();
        }
        query.filter(&self.posts.read().await)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Create a post and assign it the next id.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Validation`] if the title or content is blank.
    /// - [`StoreError::IdSpaceExhausted`] if no id is left.
    /// - [`StoreError::Persistence`] if the store cannot be loaded or the save
    ///   fails; nothing changes.
    pub async fn create(&self, input: NewPost) -> StoreResult<Post> {
        let title = required("title", &input.title)?;
        let content = required("content", &input.content)?;

        let _guard = self.lock_writer().await?;
        let mut next = self.all().await;

        let post = Post {
            id: next_id(&next)?,
            title,
            content,
        };
        next.push(post.clone());
        self.commit(next).await?;

        tracing::info!(id = %post.id, "Post created");
        Ok(post)
    }

    /// Replace the title and/or content of an existing post.
    ///
    /// Absent fields in `patch` keep their current value. An empty patch
    /// returns the post unchanged without writing anything.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if no post has `id`.
    /// - [`StoreError::Validation`] if a new title or content is blank.
    /// - [`StoreError::Persistence`] if the store cannot be loaded or the save
    ///   fails; nothing changes.
    pub async fn update(&self, id: PostId, patch: PostPatch) -> StoreResult<Post> {
        let _guard = self.lock_writer().await?;
        let mut next = self.all().await;

        let post = next
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let title = patch.title.as_deref().map(|t| required("title", t)).transpose()?;
        let content = patch
            .content
            .as_deref()
            .map(|c| required("content", c))
            .transpose()?;

        if title.is_none() && content.is_none() {
            return Ok(post.clone());
        }
        if let Some(title) = title {
            post.title = title;
        }
        if let Some(content) = content {
            post.content = content;
        }
        let updated = post.clone();

        self.commit(next).await?;

        tracing::info!(%id, "Post updated");
        Ok(updated)
    }

    /// Remove a post and return its id.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if no post has `id`.
    /// - [`StoreError::Persistence`] if the store cannot be loaded or the save
    ///   fails; nothing changes.
    pub async fn delete(&self, id: PostId) -> StoreResult<PostId> {
        let _guard = self.lock_writer().await?;
        let mut next = self.all().await;

        let index = next
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::NotFound(id))?;
        next.remove(index);

        self.commit(next).await?;

        tracing::info!(%id, "Post deleted");
        Ok(id)
    }

    /// Populate an empty store with `seeds`. Returns how many were added.
    ///
    /// Does nothing (and returns 0) if the store already holds posts.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Validation`] if any seed is blank; nothing is added.
    /// - [`StoreError::Persistence`] if the store cannot be loaded or the save
    ///   fails; nothing changes.
    pub async fn seed_if_empty(&self, seeds: Vec<NewPost>) -> StoreResult<usize> {
        let _guard = self.lock_writer().await?;
        let mut next = self.all().await;
        if !next.is_empty() || seeds.is_empty() {
            return Ok(0);
        }

        for seed in seeds {
            let post = Post {
                id: next_id(&next)?,
                title: required("title", &seed.title)?,
                content: required("content", &seed.content)?,
            };
            next.push(post);
        }
        let added = next.len();

        self.commit(next).await?;

        tracing::info!(count = added, "Seeded empty post store");
        Ok(added)
    }

    /// Take the writer lock, first loading the durable collection if that
    /// has not succeeded yet.
    async fn lock_writer(&self) -> StoreResult<MutexGuard<'_, bool>> {
        let mut loaded = self.writer.lock().await;
        if !*loaded {
            let posts = self.persistence.load().await?;
            tracing::info!(count = posts.len(), "Post store loaded after earlier failure");
            *self.posts.write().await = posts;
            *loaded = true;
        }
        Ok(loaded)
    }

    /// Save `next` and make it the resident collection.
    ///
    /// Callers must hold the writer lock.
    async fn commit(&self, next: Vec<Post>) -> StoreResult<()> {
        if let Err(e) = self.persistence.save(&next).await {
            tracing::warn!(error = %e, "Post store save failed, mutation discarded");
            return Err(e);
        }
        *self.posts.write().await = next;
        Ok(())
    }
}

/// `max(existing) + 1`, or `1` for an empty collection.
fn next_id(posts: &[Post]) -> StoreResult<PostId> {
    posts
        .iter()
        .map(|p| p.id)
        .max()
        .map_or(Some(PostId::FIRST), PostId::next)
        .ok_or(StoreError::IdSpaceExhausted)
}

/// Trimmed `value`, or a validation error naming `field` if it is blank.
fn required(field: &str, value: &str) -> StoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::validation(format!(
            "{field} must not be empty or whitespace"
        )));
    }
    Ok(trimmed.to_owned())
}
