// ABOUTME: Session-local copy of the posts fetched so far, keyed by index.
// ABOUTME: Shared by the coordinator (pages) and the submitter (likes, new posts).

use std::collections::BTreeMap;

use super::Post;

/// Read-only cache of ledger posts for the current session.
#[derive(Debug, Default)]
pub struct FeedStore {
    posts: BTreeMap<u64, Post>,
}

impl FeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert posts, replacing any cached copy with the same index.
    pub fn insert_all(&mut self, posts: impl IntoIterator<Item = Post>) {
        for post in posts {
            self.posts.insert(post.index, post);
        }
    }

    pub fn insert(&mut self, post: Post) {
        self.posts.insert(post.index, post);
    }

    pub fn get(&self, index: u64) -> Option<&Post> {
        self.posts.get(&index)
    }

    /// Overwrite the like state of a cached post. Returns false if it is not cached.
    pub fn set_like(&mut self, index: u64, liked: bool, like_count: Option<u64>) -> bool {
        match self.posts.get_mut(&index) {
            Some(post) => {
                post.liked_by_viewer = liked;
                if let Some(count) = like_count {
                    post.like_count = count;
                }
                true
            }
            None => false,
        }
    }

    /// All cached posts, newest first.
    pub fn newest_first(&self) -> Vec<Post> {
        self.posts.values().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn clear(&mut self) {
        self.posts.clear();
    }
}
