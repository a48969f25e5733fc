use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post entity - a feed item belonging to one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: ObjectId,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub creator: ObjectId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post owned by `creator`.
    pub fn new(creator: ObjectId, title: String, content: String, image_url: String) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            title,
            content,
            image_url,
            creator,
            created_at: now,
            updated_at: now,
        }
    }
}
