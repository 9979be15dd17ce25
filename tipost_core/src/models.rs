use serde::{Deserialize, Serialize};

/// Identifier of a post. Remote records carry the id assigned by the
/// collection; locally created ones use wall-clock milliseconds.
pub type PostId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl Post {
    pub fn from_draft(id: PostId, draft: &PostDraft, created_at: String) -> Self {
        Self {
            id,
            title: draft.title.clone(),
            body: draft.body.clone(),
            created_at,
        }
    }

    /// Case-insensitive substring match against title or body. `needle`
    /// must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.body.to_lowercase().contains(needle)
    }
}

/// The create/edit form as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Drafts with a blank title or body are never sent.
    pub fn is_submittable(&self) -> bool {
        !self.title.trim().is_empty() && !self.body.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.title.clear();
        self.body.clear();
    }
}

/// Element of the `GET /posts` listing. The collection has no creation
/// timestamp and extra fields such as `userId` are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RemotePost {
    pub id: PostId,
    pub title: String,
    pub body: String,
}

impl RemotePost {
    pub fn stamp(self, created_at: &str) -> Post {
        Post {
            id: self.id,
            title: self.title,
            body: self.body,
            created_at: created_at.to_string(),
        }
    }
}

/// Body returned by `POST /posts`. Fields missing from the echo fall back to
/// the values that were sent.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedPost {
    pub id: PostId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
}

impl CreatedPost {
    pub fn merge_into(self, sent: &Post) -> Post {
        Post {
            id: self.id,
            title: self.title.unwrap_or_else(|| sent.title.clone()),
            body: self.body.unwrap_or_else(|| sent.body.clone()),
            created_at: self.created_at.unwrap_or_else(|| sent.created_at.clone()),
        }
    }
}
