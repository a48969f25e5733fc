use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status given to users who have not set one yet.
pub const DEFAULT_STATUS: &str = "I am new!";

/// User entity - an account that can own posts.
///
/// `posts` is the ordered list of owned post ids; it is kept in sync with
/// `Post.creator` by [`crate::service::FeedService`], not by the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: ObjectId,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub status: String,
    pub posts: Vec<ObjectId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated id, default status and timestamps.
    pub fn new(email: String, password_hash: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            email,
            password_hash,
            name,
            status: DEFAULT_STATUS.to_string(),
            posts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
