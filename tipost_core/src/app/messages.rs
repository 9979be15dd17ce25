use std::time::Instant;

use crate::api::ClientError;
use crate::models::{Post, PostId};
use crate::notice::NoticeKind;

use super::TiPostApp;

pub const CREATED_TEXT: &str = "Post created successfully!";
pub const CREATE_FAILED_TEXT: &str = "Failed to create post.";
pub const UPDATED_TEXT: &str = "Post updated successfully!";
pub const UPDATE_FAILED_TEXT: &str = "Failed to update post.";
pub const DELETED_TEXT: &str = "Post deleted successfully!";
pub const DELETE_FAILED_TEXT: &str = "Failed to delete post.";
pub const FETCH_FAILED_TEXT: &str = "Failed to load posts.";

#[derive(Debug)]
pub enum AppMessage {
    PostsLoaded(Result<Vec<Post>, ClientError>),
    PostCreated(Result<Post, ClientError>),
    PostUpdated {
        post: Post,
        result: Result<(), ClientError>,
    },
    PostDeleted {
        id: PostId,
        result: Result<(), ClientError>,
    },
}

impl TiPostApp {
    /// Applies a settled remote call. The store only changes on success.
    pub fn handle_message(&mut self, message: AppMessage) {
        self.handle_message_at(message, Instant::now());
    }

    pub(crate) fn handle_message_at(&mut self, message: AppMessage, now: Instant) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match message {
            AppMessage::PostsLoaded(result) => match result {
                Ok(posts) => {
                    tracing::info!(count = posts.len(), "hydrated posts from remote collection");
                    self.store.replace_all(posts);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to fetch posts");
                    self.show_notice(NoticeKind::Error, FETCH_FAILED_TEXT, now);
                }
            },
            AppMessage::PostCreated(result) => match result {
                Ok(post) => {
                    tracing::info!(post_id = post.id, "post created");
                    self.store.prepend(post);
                    self.draft.clear();
                    self.show_notice(NoticeKind::Success, CREATED_TEXT, now);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "create failed");
                    self.show_notice(NoticeKind::Error, CREATE_FAILED_TEXT, now);
                }
            },
            AppMessage::PostUpdated { post, result } => match result {
                Ok(()) => {
                    tracing::info!(post_id = post.id, "post updated");
                    if self.editing.as_ref().is_some_and(|editing| editing.id == post.id) {
                        self.editing = None;
                    }
                    self.store.replace(post);
                    self.show_notice(NoticeKind::Success, UPDATED_TEXT, now);
                }
                Err(err) => {
                    tracing::warn!(post_id = post.id, error = %err, "update failed");
                    self.show_notice(NoticeKind::Error, UPDATE_FAILED_TEXT, now);
                }
            },
            AppMessage::PostDeleted { id, result } => match result {
                Ok(()) => {
                    tracing::info!(post_id = id, "post deleted");
                    self.store.remove(id);
                    if self.editing.as_ref().is_some_and(|editing| editing.id == id) {
                        self.editing = None;
                    }
                    self.show_notice(NoticeKind::Success, DELETED_TEXT, now);
                }
                Err(err) => {
                    tracing::warn!(post_id = id, error = %err, "delete failed");
                    self.show_notice(NoticeKind::Error, DELETE_FAILED_TEXT, now);
                }
            },
        }
        self.sync_view();
    }
}
