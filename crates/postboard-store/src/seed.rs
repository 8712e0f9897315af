//! Starter posts for a fresh deployment.

use postboard_types::NewPost;

/// The three posts a brand-new board starts with when seeding is enabled.
pub fn default_seed_posts() -> Vec<NewPost> {
    vec![
        NewPost::new("First post", "This is the first post."),
        NewPost::new("Second post", "This is the second post."),
        NewPost::new("Flask tutorial", "Learn how to use Flask in this post."),
    ]
}
