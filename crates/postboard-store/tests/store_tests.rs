//! Integration tests for the `postboard-store` crate.
//!
//! These drive [`PostStore`] end to end, mostly against a real JSON file in
//! a temporary directory, and check the collection-level guarantees: id
//! assignment, durability across reopen, pagination boundaries, search
//! semantics, and behavior under concurrent mutation.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use std::collections::BTreeSet;
use std::sync::Arc;

use postboard_store::{
    FilePersistence, ListParams, ListQuery, MemoryPersistence, Pagination, Persistence, PostStore,
    SearchQuery, SortField, SortSpec, StoreError, default_seed_posts,
};
use postboard_types::{NewPost, Post, PostId, PostPatch};
use tempfile::TempDir;

// =============================================================================
// Helpers
// =============================================================================

fn post(id: u64, title: &str, content: &str) -> Post {
    Post {
        id: PostId(id),
        title: String::from(title),
        content: String::from(content),
    }
}

fn titles(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|p| p.title.as_str()).collect()
}

async fn file_store(dir: &TempDir) -> PostStore<FilePersistence> {
    PostStore::open(FilePersistence::new(dir.path().join("posts.json"))).await
}

// =============================================================================
// Scenario
// =============================================================================

#[tokio::test]
async fn create_delete_update_sort_scenario() {
    let persistence = MemoryPersistence::with_posts(vec![
        post(1, "First post", "This is the first post."),
        post(2, "Second post", "This is the second post."),
    ]);
    let store = PostStore::open(persistence).await;

    let third = store.create(NewPost::new("Third", "body")).await.unwrap();
    assert_eq!(third.id, PostId(3));

    store.delete(PostId(1)).await.unwrap();
    let ids: Vec<_> = store.all().await.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![PostId(2), PostId(3)]);

    let updated = store
        .update(PostId(2), PostPatch::title("Updated"))
        .await
        .unwrap();
    assert_eq!(updated.id, PostId(2));
    assert_eq!(updated.title, "Updated");
    assert_eq!(updated.content, "This is the second post.");

    let params = ListParams {
        sort: Some(String::from("title")),
        direction: Some(String::from("desc")),
        ..ListParams::default()
    };
    let page = store.list_with_params(&params).await.unwrap();
    assert_eq!(titles(&page.posts), vec!["Updated", "Third"]);

    // Stored order is untouched by sorting.
    assert_eq!(titles(&store.all().await), vec!["Updated", "Third"]);
    let asc = store
        .list(&ListQuery {
            sort: Some(SortSpec::asc(SortField::Title)),
            pagination: Pagination::default(),
        })
        .await;
    assert_eq!(titles(&asc.posts), vec!["Third", "Updated"]);
    let ids: Vec<_> = store.all().await.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![PostId(2), PostId(3)]);
}

// =============================================================================
// Identity
// =============================================================================

#[tokio::test]
async fn sequential_creates_are_unique_and_increasing() {
    let store = PostStore::open(MemoryPersistence::new()).await;

    let mut last = 0;
    for i in 0..25 {
        let created = store
            .create(NewPost::new(format!("Post {i}"), "body"))
            .await
            .unwrap();
        assert!(created.id.into_inner() > last);
        last = created.id.into_inner();
    }

    let ids: BTreeSet<_> = store.all().await.iter().map(|p| p.id).collect();
    assert_eq!(ids.len(), 25);
}

#[tokio::test]
async fn ids_are_not_reused_while_a_higher_id_exists() {
    let store = PostStore::open(MemoryPersistence::new()).await;
    for i in 0..3 {
        store.create(NewPost::new(format!("{i}"), "x")).await.unwrap();
    }
    store.delete(PostId(2)).await.unwrap();

    let created = store.create(NewPost::new("next", "x")).await.unwrap();
    assert_eq!(created.id, PostId(4));
}

#[tokio::test]
async fn concurrent_creates_yield_one_through_n() {
    const N: u64 = 50;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(file_store(&dir).await);

    let tasks = (0..N).map(|i| {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            store
                .create(NewPost::new(format!("Post {i}"), "concurrent"))
                .await
                .unwrap()
                .id
        })
    });
    let ids: BTreeSet<PostId> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    let expected: BTreeSet<PostId> = (1..=N).map(PostId).collect();
    assert_eq!(ids, expected);

    // The file holds exactly what the store holds.
    let reopened = file_store(&dir).await;
    assert_eq!(reopened.len().await, 50);
}

#[tokio::test]
async fn readers_see_only_committed_state_during_writes() {
    let store = Arc::new(PostStore::open(MemoryPersistence::new()).await);

    let writer = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            for i in 0..30 {
                store.create(NewPost::new(format!("p{i}"), "x")).await.unwrap();
            }
        })
    };

    for _ in 0..30 {
        let snapshot = store.all().await;
        let ids: Vec<u64> = snapshot.iter().map(|p| p.id.into_inner()).collect();
        let expected: Vec<u64> = (1..=ids.len() as u64).collect();
        assert_eq!(ids, expected);
        tokio::task::yield_now().await;
    }

    writer.await.unwrap();
    assert_eq!(store.len().await, 30);
}

// =============================================================================
// Durability
// =============================================================================

#[tokio::test]
async fn mutations_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = file_store(&dir).await;
        store.create(NewPost::new("Kept", "one")).await.unwrap();
        store.create(NewPost::new("Dropped", "two")).await.unwrap();
        store.create(NewPost::new("Edited", "three")).await.unwrap();
        store.delete(PostId(2)).await.unwrap();
        store
            .update(PostId(3), PostPatch::content("changed"))
            .await
            .unwrap();
    }

    let store = file_store(&dir).await;
    assert_eq!(
        store.all().await,
        vec![post(1, "Kept", "one"), post(3, "Edited", "changed")]
    );
}

#[tokio::test]
async fn load_of_save_is_identity() {
    let dir = TempDir::new().unwrap();
    let persistence = FilePersistence::new(dir.path().join("posts.json"));
    let collection = vec![
        post(4, "Unicode ✓", "naïve café"),
        post(1, "Quotes \"inside\"", "line\nbreak"),
        post(9, "x", "y"),
    ];

    persistence.save(&collection).await.unwrap();
    let loaded = persistence.load().await.unwrap();
    assert_eq!(loaded, collection);

    // Saving what was loaded leaves the file byte-for-byte the same.
    let before = std::fs::read(persistence.path()).unwrap();
    persistence.save(&loaded).await.unwrap();
    let after = std::fs::read(persistence.path()).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn unreadable_file_is_never_overwritten() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("posts.json");
    std::fs::create_dir(&path).unwrap();

    let store = file_store(&dir).await;
    assert!(store.is_empty().await);
    let err = store.create(NewPost::new("Lost", "write")).await.unwrap_err();
    assert!(matches!(err, StoreError::Persistence { .. }));
    assert!(store.seed_if_empty(default_seed_posts()).await.is_err());
    assert!(path.is_dir());

    // Once the data file is readable again the store picks it up.
    std::fs::remove_dir(&path).unwrap();
    std::fs::write(&path, r#"[{"id":3,"title":"Old","content":"post"}]"#).unwrap();

    let created = store.create(NewPost::new("Next", "post")).await.unwrap();
    assert_eq!(created.id, PostId(4));
    assert_eq!(
        file_store(&dir).await.all().await,
        vec![post(3, "Old", "post"), post(4, "Next", "post")]
    );
}

#[tokio::test]
async fn malformed_file_opens_as_empty_store() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("posts.json"), b"[{\"id\": \"one\"}]").unwrap();

    let store = file_store(&dir).await;
    assert!(store.is_empty().await);

    // The store is still usable and the next save replaces the bad file.
    let created = store.create(NewPost::new("Fresh", "start")).await.unwrap();
    assert_eq!(created.id, PostId(1));
    assert_eq!(file_store(&dir).await.len().await, 1);
}

#[tokio::test]
async fn failed_write_leaves_durable_state_intact() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir).await;
    store.create(NewPost::new("Safe", "body")).await.unwrap();

    std::fs::create_dir(dir.path().join("posts.json.tmp")).unwrap();
    let err = store.create(NewPost::new("Lost", "body")).await.unwrap_err();
    assert!(matches!(err, StoreError::Persistence { .. }));

    assert_eq!(store.all().await, vec![post(1, "Safe", "body")]);
    std::fs::remove_dir(dir.path().join("posts.json.tmp")).unwrap();
    assert_eq!(file_store(&dir).await.all().await, vec![post(1, "Safe", "body")]);
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn repeated_valid_inputs_keep_invariants() {
    let store = PostStore::open(MemoryPersistence::new()).await;
    for _ in 0..3 {
        store.create(NewPost::new("Same", "Same")).await.unwrap();
    }
    for _ in 0..3 {
        store
            .update(PostId(2), PostPatch::title("Same again"))
            .await
            .unwrap();
    }

    let all = store.all().await;
    assert_eq!(all.len(), 3);
    let ids: BTreeSet<_> = all.iter().map(|p| p.id).collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(all[1].title, "Same again");
}

#[tokio::test]
async fn blank_inputs_never_partially_apply() {
    let persistence = MemoryPersistence::with_posts(vec![post(1, "Title", "Content")]);
    let store = PostStore::open(persistence.clone()).await;

    for (title, content) in [("", "x"), ("x", ""), ("  ", "x"), ("x", "\n\t")] {
        assert!(matches!(
            store.create(NewPost::new(title, content)).await,
            Err(StoreError::Validation(_))
        ));
        let patch = PostPatch {
            title: Some(String::from(title)),
            content: Some(String::from(content)),
        };
        assert!(matches!(
            store.update(PostId(1), patch).await,
            Err(StoreError::Validation(_))
        ));
    }

    assert_eq!(store.all().await, vec![post(1, "Title", "Content")]);
    assert_eq!(persistence.save_count(), 0);
}

#[tokio::test]
async fn stored_values_are_trimmed() {
    let store = PostStore::open(MemoryPersistence::new()).await;
    let created = store
        .create(NewPost::new("  Padded title ", "\tbody\n"))
        .await
        .unwrap();
    assert_eq!(created.title, "Padded title");
    assert_eq!(created.content, "body");
}

// =============================================================================
// Pagination
// =============================================================================

#[tokio::test]
async fn total_pages_is_ceiling_of_total_over_limit() {
    for n in 0..12_u64 {
        let posts = (1..=n).map(|i| post(i, "t", "c")).collect();
        let store = PostStore::open(MemoryPersistence::with_posts(posts)).await;

        for limit in 1..6_usize {
            let page = store
                .list(&ListQuery {
                    sort: None,
                    pagination: Pagination::new(1, limit).unwrap(),
                })
                .await;
            let n_usize = usize::try_from(n).unwrap();
            assert_eq!(page.pagination.total_pages, n_usize.div_ceil(limit));
            assert_eq!(page.pagination.total_posts, n_usize);
            assert_eq!(page.posts.len(), n_usize.min(limit));

            let beyond = store
                .list(&ListQuery {
                    sort: None,
                    pagination: Pagination::new(page.pagination.total_pages + 1, limit).unwrap(),
                })
                .await;
            assert!(beyond.posts.is_empty());
        }
    }
}

#[tokio::test]
async fn pages_cover_the_collection_in_order() {
    let posts: Vec<Post> = (1..=7).map(|i| post(i, &format!("t{i}"), "c")).collect();
    let store = PostStore::open(MemoryPersistence::with_posts(posts.clone())).await;

    let mut collected = Vec::new();
    for page in 1..=3 {
        let result = store
            .list(&ListQuery {
                sort: None,
                pagination: Pagination::new(page, 3).unwrap(),
            })
            .await;
        collected.extend(result.posts);
    }
    assert_eq!(collected, posts);
}

#[tokio::test]
async fn invalid_list_params_are_validation_errors() {
    let store = PostStore::open(MemoryPersistence::new()).await;
    let cases = [
        ListParams {
            page: Some(String::from("0")),
            ..ListParams::default()
        },
        ListParams {
            limit: Some(String::from("-1")),
            ..ListParams::default()
        },
        ListParams {
            sort: Some(String::from("id")),
            ..ListParams::default()
        },
        ListParams {
            sort: Some(String::from("title")),
            direction: Some(String::from("down")),
            ..ListParams::default()
        },
    ];

    for params in cases {
        assert!(matches!(
            store.list_with_params(&params).await,
            Err(StoreError::Validation(_))
        ));
    }
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn search_finds_title_matches_only() {
    let store = PostStore::open(MemoryPersistence::with_posts(vec![
        post(1, "Flask tutorial", "Learn..."),
        post(2, "First post", "no flask mention"),
    ]))
    .await;

    let hits = store.search(&SearchQuery::title("flask")).await;
    assert_eq!(hits, vec![post(1, "Flask tutorial", "Learn...")]);

    assert!(store.search(&SearchQuery::default()).await.is_empty());

    let both = store
        .search(&SearchQuery {
            title: Some(String::from("first")),
            content: Some(String::from("LEARN")),
        })
        .await;
    let ids: Vec<_> = both.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![PostId(1), PostId(2)]);
}

#[tokio::test]
async fn search_terms_are_not_trimmed() {
    let store = PostStore::open(MemoryPersistence::with_posts(vec![post(
        1,
        "First post",
        "This is the first post.",
    )]))
    .await;

    assert!(store.search(&SearchQuery::title("post ")).await.is_empty());
    assert_eq!(
        store.search(&SearchQuery::title(" ")).await,
        vec![post(1, "First post", "This is the first post.")]
    );
}

// =============================================================================
// Seeding
// =============================================================================

#[tokio::test]
async fn default_seed_matches_starter_posts() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir).await;

    assert_eq!(store.seed_if_empty(default_seed_posts()).await.unwrap(), 3);
    let hits = store.search(&SearchQuery::title("flask")).await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, PostId(3));

    let reopened = file_store(&dir).await;
    assert_eq!(reopened.seed_if_empty(default_seed_posts()).await.unwrap(), 0);
    assert_eq!(reopened.len().await, 3);
}
