//! Remote calls run as detached tokio tasks; each reports back with exactly
//! one `AppMessage`.

use tokio::sync::mpsc::UnboundedSender;

use crate::api::ApiClient;
use crate::models::{Post, PostId};

use super::messages::AppMessage;

pub fn fetch_posts(client: ApiClient, tx: UnboundedSender<AppMessage>, limit: usize) {
    tokio::spawn(async move {
        let result = client.fetch_initial(limit).await;
        if tx.send(AppMessage::PostsLoaded(result)).is_err() {
            tracing::error!("failed to send PostsLoaded message");
        }
    });
}

pub fn create_post(client: ApiClient, tx: UnboundedSender<AppMessage>, payload: Post) {
    tokio::spawn(async move {
        let result = client.create_post(&payload).await;
        if tx.send(AppMessage::PostCreated(result)).is_err() {
            tracing::error!("failed to send PostCreated message");
        }
    });
}

pub fn update_post(client: ApiClient, tx: UnboundedSender<AppMessage>, post: Post) {
    tokio::spawn(async move {
        let result = client.update_post(&post).await;
        if tx.send(AppMessage::PostUpdated { post, result }).is_err() {
            tracing::error!("failed to send PostUpdated message");
        }
    });
}

pub fn delete_post(client: ApiClient, tx: UnboundedSender<AppMessage>, id: PostId) {
    tokio::spawn(async move {
        let result = client.delete_post(id).await;
        if tx.send(AppMessage::PostDeleted { id, result }).is_err() {
            tracing::error!("failed to send PostDeleted message");
        }
    });
}
