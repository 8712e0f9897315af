//! Durable load/save of the whole post collection.
//!
//! The collection is always read and written as one unit. [`FilePersistence`]
//! keeps it as a single JSON array on disk and replaces the file atomically
//! (temp file + rename), so a reader never sees a half-written store.
//! [`MemoryPersistence`] keeps it in process and can be told to fail saves.

use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use postboard_types::Post;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{StoreError, StoreResult};

/// Backing store for the post collection.
///
/// A missing store loads as an empty collection, and a malformed one is
/// reported with a warning and also treated as empty. `load` only fails
/// when a store exists but cannot be read. `save` either replaces the whole
/// collection or leaves the previous one intact.
pub trait Persistence: Send + Sync + 'static {
    /// Read the full collection.
    fn load(&self) -> impl Future<Output = StoreResult<Vec<Post>>> + Send;

    /// Replace the full collection.
    fn save(&self, posts: &[Post]) -> impl Future<Output = StoreResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// File persistence
// ---------------------------------------------------------------------------

/// Stores the collection as a pretty-printed JSON array in one file.
#[derive(Debug, Clone)]
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    /// Persist to `path`. Parent directories are created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The data file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file that a save writes before renaming over the data file.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| OsString::from("posts"), OsString::from);
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn ensure_parent(&self) -> StoreResult<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::persistence(parent, e)),
            _ => Ok(()),
        }
    }
}

impl Persistence for FilePersistence {
    async fn load(&self) -> StoreResult<Vec<Post>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No post store on disk, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::persistence(&self.path, e)),
        };

        match decode_collection(&bytes) {
            Ok(posts) => {
                tracing::debug!(path = %self.path.display(), count = posts.len(), "Loaded posts");
                Ok(posts)
            }
            Err(reason) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %reason,
                    "Malformed post store, starting empty"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, posts: &[Post]) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(posts)?;
        self.ensure_parent().await?;

        let temp_path = self.temp_path();
        if let Err(e) = write_synced(&temp_path, &bytes).await {
            discard(&temp_path).await;
            return Err(StoreError::persistence(&temp_path, e));
        }

        // Atomic rename
        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            discard(&temp_path).await;
            return Err(StoreError::persistence(&self.path, e));
        }

        // The new file is already in place, so a failed directory sync only
        // weakens crash durability.
        if let Err(e) = sync_parent(&self.path).await {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to sync data directory");
        }

        tracing::debug!(path = %self.path.display(), count = posts.len(), "Saved posts");
        Ok(())
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

/// Flush the directory holding `path` so a completed rename survives a
/// crash. Directories cannot be opened for syncing outside Unix.
async fn sync_parent(path: &Path) -> std::io::Result<()> {
    if !cfg!(unix) {
        return Ok(());
    }
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::File::open(dir).await?.sync_all().await
}

async fn discard(temp_path: &Path) {
    match fs::remove_file(temp_path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %temp_path.display(), error = %e, "Failed to remove temp file");
        }
    }
}

/// Parse a stored collection, rejecting duplicate or zero ids.
fn decode_collection(bytes: &[u8]) -> Result<Vec<Post>, String> {
    let posts: Vec<Post> = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;

    let mut seen = std::collections::BTreeSet::new();
    for post in &posts {
        if post.id.into_inner() == 0 {
            return Err(String::from("post id 0 is not allowed"));
        }
        if !seen.insert(post.id) {
            return Err(format!("duplicate post id {}", post.id));
        }
    }

    Ok(posts)
}

// ---------------------------------------------------------------------------
// In-memory persistence
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemoryInner {
    posts: Mutex<Vec<Post>>,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

/// Keeps the "durable" collection in process memory.
///
/// Clones share the same state, so a test can hand one clone to a store and
/// keep another to inspect what was saved or to make saves fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    inner: Arc<MemoryInner>,
}

impl MemoryPersistence {
    /// Empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// In-memory store that starts with `posts`.
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                posts: Mutex::new(posts),
                ..MemoryInner::default()
            }),
        }
    }

    /// Make every following load fail (or succeed again).
    pub fn set_fail_loads(&self, fail: bool) {
        self.inner.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Make every following save fail (or succeed again).
    pub fn set_fail_saves(&self, fail: bool) {
        self.inner.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.inner.saves.load(Ordering::SeqCst)
    }

    /// Copy of the last saved collection.
    pub async fn saved(&self) -> Vec<Post> {
        self.inner.posts.lock().await.clone()
    }
}

impl Persistence for MemoryPersistence {
    async fn load(&self) -> StoreResult<Vec<Post>> {
        if self.inner.fail_loads.load(Ordering::SeqCst) {
            return Err(StoreError::persistence(
                "<memory>",
                std::io::Error::other("loads disabled"),
            ));
        }
        Ok(self.saved().await)
    }

    async fn save(&self, posts: &[Post]) -> StoreResult<()> {
        if self.inner.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::persistence(
                "<memory>",
                std::io::Error::other("saves disabled"),
            ));
        }
        *self.inner.posts.lock().await = posts.to_vec();
        self.inner.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
