use std::fmt;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use thiserror::Error;

use crate::models::{CreatedPost, Post, PostId, RemotePost};
use crate::utils::now_utc_iso;

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Remote call a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Fetch => "fetch posts",
            Operation::Create => "create post",
            Operation::Update => "update post",
            Operation::Delete => "delete post",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{operation}: request failed: {source}")]
    Network {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },
    #[error("{operation}: server responded with {status}")]
    HttpStatus {
        operation: Operation,
        status: StatusCode,
    },
    #[error("{operation}: unreadable response: {source}")]
    Decode {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ClientError {
    pub fn operation(&self) -> Option<Operation> {
        match self {
            ClientError::Network { operation, .. }
            | ClientError::HttpStatus { operation, .. }
            | ClientError::Decode { operation, .. } => Some(*operation),
            ClientError::InvalidUrl { .. } => None,
        }
    }
}

/// Client for the remote posts collection. Every call is a single round
/// trip: no retries, no queueing, and no timeout beyond the transport's own.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let base = sanitize_base_url(base_url.into())?;
        Ok(Self {
            base_url: base,
            client: Client::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) -> Result<(), ClientError> {
        self.base_url = sanitize_base_url(base_url.into())?;
        Ok(())
    }

    /// `GET /posts?_limit=N`. Each record is stamped with the local time
    /// since the collection has no creation timestamp.
    pub async fn fetch_initial(&self, limit: usize) -> Result<Vec<Post>, ClientError> {
        let op = Operation::Fetch;
        let mut url = self.url("/posts")?;
        url.query_pairs_mut()
            .append_pair("_limit", &limit.to_string());

        let response = send(op, self.client.get(url)).await?;
        let remote: Vec<RemotePost> = response
            .json()
            .await
            .map_err(|source| ClientError::Decode { operation: op, source })?;

        let stamp = now_utc_iso();
        tracing::debug!(count = remote.len(), limit, "fetched remote posts");
        Ok(remote.into_iter().map(|post| post.stamp(&stamp)).collect())
    }

    /// `POST /posts` with the locally stamped record. The echoed record is
    /// trusted, including its id.
    pub async fn create_post(&self, post: &Post) -> Result<Post, ClientError> {
        let op = Operation::Create;
        let url = self.url("/posts")?;
        let response = send(op, with_json(self.client.post(url), post)).await?;
        let created: CreatedPost = response
            .json()
            .await
            .map_err(|source| ClientError::Decode { operation: op, source })?;
        if created.id != post.id {
            tracing::debug!(sent = post.id, assigned = created.id, "remote assigned a different id");
        }
        Ok(created.merge_into(post))
    }

    /// `PUT /posts/{id}` with the full record. Only transport failures are
    /// errors; the status and body of the response are not used.
    pub async fn update_post(&self, post: &Post) -> Result<(), ClientError> {
        let op = Operation::Update;
        let url = self.url(&format!("/posts/{}", post.id))?;
        send_unchecked(op, with_json(self.client.put(url), post)).await?;
        Ok(())
    }

    /// `DELETE /posts/{id}`. Only transport failures are errors.
    pub async fn delete_post(&self, id: PostId) -> Result<(), ClientError> {
        let op = Operation::Delete;
        let url = self.url(&format!("/posts/{id}"))?;
        send_unchecked(op, self.client.delete(url)).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|err| ClientError::InvalidUrl {
            url: joined,
            reason: err.to_string(),
        })
    }
}

fn with_json<T: Serialize + ?Sized>(request: RequestBuilder, payload: &T) -> RequestBuilder {
    // Set before `.json()`, which only fills in a bare `application/json`
    // when no content type is present.
    request
        .header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
        .json(payload)
}

async fn send(operation: Operation, request: RequestBuilder) -> Result<Response, ClientError> {
    let response = send_unchecked(operation, request).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::HttpStatus { operation, status });
    }
    Ok(response)
}

/// Sends without judging the status. The stub collection answers 5xx for
/// records it never stored, such as ones created in this session.
async fn send_unchecked(
    operation: Operation,
    request: RequestBuilder,
) -> Result<Response, ClientError> {
    let response = request
        .send()
        .await
        .map_err(|source| ClientError::Network { operation, source })?;
    if !response.status().is_success() {
        tracing::debug!(%operation, status = %response.status(), "ignoring response status");
    }
    Ok(response)
}

fn sanitize_base_url(mut base: String) -> Result<String, ClientError> {
    base = base.trim().to_string();
    if !base.starts_with("http://") && !base.starts_with("https://") {
        base = format!("https://{base}");
    }
    while base.ends_with('/') {
        base.pop();
    }
    Url::parse(&base).map_err(|err| ClientError::InvalidUrl {
        url: base.clone(),
        reason: err.to_string(),
    })?;
    Ok(base)
}
