//! Authoritative in-memory list of posts.
//!
//! Every mutation builds a new collection and swaps the shared reference, so
//! a snapshot handed out earlier never changes underneath its holder.
//! Registered listeners are called synchronously with the new snapshot after
//! each mutation.

use std::sync::Arc;

use crate::models::{Post, PostId};

pub type Snapshot = Arc<Vec<Post>>;

type Listener = Box<dyn FnMut(&Snapshot) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct PostStore {
    posts: Snapshot,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Default for PostStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PostStore {
    pub fn new() -> Self {
        Self::with_posts(Vec::new())
    }

    /// Builds a store from restored state without notifying anyone.
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            posts: Arc::new(posts),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.posts)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn get(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Snapshot) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Installs `records` verbatim, keeping their order.
    pub fn replace_all(&mut self, records: Vec<Post>) {
        self.commit(records);
    }

    /// Inserts `record` at the head. A record already holding the same id is
    /// dropped so ids stay unique.
    pub fn prepend(&mut self, record: Post) {
        let mut next = Vec::with_capacity(self.posts.len() + 1);
        next.push(record);
        let id = next[0].id;
        let mut collided = false;
        for post in self.posts.iter() {
            if post.id == id {
                collided = true;
                continue;
            }
            next.push(post.clone());
        }
        if collided {
            tracing::warn!(post_id = id, "prepend replaced a post with the same id");
        }
        self.commit(next);
    }

    /// Overwrites the record with a matching id in place. No-op when absent.
    pub fn replace(&mut self, record: Post) {
        let Some(index) = self.posts.iter().position(|post| post.id == record.id) else {
            tracing::debug!(post_id = record.id, "replace ignored unknown post");
            return;
        };
        let mut next = self.posts.as_ref().clone();
        next[index] = record;
        self.commit(next);
    }

    /// Removes the record with a matching id. No-op when absent.
    pub fn remove(&mut self, id: PostId) {
        if !self.posts.iter().any(|post| post.id == id) {
            tracing::debug!(post_id = id, "remove ignored unknown post");
            return;
        }
        let next = self
            .posts
            .iter()
            .filter(|post| post.id != id)
            .cloned()
            .collect();
        self.commit(next);
    }

    fn commit(&mut self, posts: Vec<Post>) {
        self.posts = Arc::new(posts);
        let snapshot = self.snapshot();
        for (_, listener) in self.listeners.iter_mut() {
            listener(&snapshot);
        }
    }
}
