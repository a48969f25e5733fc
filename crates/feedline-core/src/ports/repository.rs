use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::domain::{Post, User};
use crate::error::RepoError;

/// User repository over the `users` collection.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their unique id.
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<User>, RepoError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Insert a freshly created user.
    async fn insert(&self, user: &User) -> Result<(), RepoError>;

    /// Overwrite a user's free-text status.
    async fn update_status(&self, id: ObjectId, status: &str) -> Result<(), RepoError>;

    /// Append a post id to the user's owned-posts list.
    async fn push_post(&self, user_id: ObjectId, post_id: ObjectId) -> Result<(), RepoError>;

    /// Remove a post id from the user's owned-posts list.
    async fn pull_post(&self, user_id: ObjectId, post_id: ObjectId) -> Result<(), RepoError>;
}

/// One page of posts plus the total count for pagination UI.
#[derive(Debug, Clone)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total: u64,
}

/// Post repository over the `posts` collection.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Find a post by its unique id.
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Post>, RepoError>;

    /// Find posts by id, preserving the order of `ids`.
    async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Post>, RepoError>;

    /// Insert a freshly created post.
    async fn insert(&self, post: &Post) -> Result<(), RepoError>;

    /// Replace an existing post.
    async fn update(&self, post: &Post) -> Result<(), RepoError>;

    /// Delete a post by id.
    async fn delete(&self, id: ObjectId) -> Result<(), RepoError>;

    /// One page, newest first, plus the total collection count.
    /// `page` is 1-based.
    async fn page(&self, page: u64, per_page: u64) -> Result<PostPage, RepoError>;
}
