//! MongoDB repository implementations.

use async_trait::async_trait;
use bson::doc;
use bson::oid::ObjectId;
use futures::TryStreamExt;
use mongodb::Collection;

use feedline_core::domain::{Post, User};
use feedline_core::error::RepoError;
use feedline_core::ports::{PostPage, PostRepository, UserRepository};

use super::connections::{MongoConnection, POSTS, USERS};
use super::document::{PostDocument, UserDocument};

fn query_err(e: mongodb::error::Error) -> RepoError {
    let msg = e.to_string();
    if msg.contains("E11000") || msg.contains("duplicate key") {
        RepoError::Constraint("email already registered".to_string())
    } else {
        RepoError::Query(msg)
    }
}

/// Mask an email before logging to keep PII out of logs.
fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at) if at > 1 => format!("{}***{}", &email[..1], &email[at..]),
        Some(at) => format!("***{}", &email[at..]),
        None => "***".to_string(),
    }
}

/// User repository over the `users` collection.
pub struct MongoUserRepository {
    users: Collection<UserDocument>,
}

impl MongoUserRepository {
    pub fn new(conn: &MongoConnection) -> Self {
        Self {
            users: conn.db.collection(USERS),
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<User>, RepoError> {
        let doc = self
            .users
            .find_one(doc! { "_id": id })
            .await
            .map_err(query_err)?;
        Ok(doc.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let doc = self
            .users
            .find_one(doc! { "email": email })
            .await
            .map_err(query_err)?;
        Ok(doc.map(Into::into))
    }

    async fn insert(&self, user: &User) -> Result<(), RepoError> {
        self.users
            .insert_one(UserDocument::from(user))
            .await
            .map_err(query_err)?;
        Ok(())
    }

    async fn update_status(&self, id: ObjectId, status: &str) -> Result<(), RepoError> {
        let result = self
            .users
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "status": status, "updated_at": bson::DateTime::now() } },
            )
            .await
            .map_err(query_err)?;

        if result.matched_count == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn push_post(&self, user_id: ObjectId, post_id: ObjectId) -> Result<(), RepoError> {
        let result = self
            .users
            .update_one(
                doc! { "_id": user_id },
                doc! {
                    "$push": { "posts": post_id },
                    "$set": { "updated_at": bson::DateTime::now() },
                },
            )
            .await
            .map_err(query_err)?;

        if result.matched_count == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn pull_post(&self, user_id: ObjectId, post_id: ObjectId) -> Result<(), RepoError> {
        let result = self
            .users
            .update_one(
                doc! { "_id": user_id },
                doc! {
                    "$pull": { "posts": post_id },
                    "$set": { "updated_at": bson::DateTime::now() },
                },
            )
            .await
            .map_err(query_err)?;

        if result.matched_count == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

/// Post repository over the `posts` collection.
pub struct MongoPostRepository {
    posts: Collection<PostDocument>,
}

impl MongoPostRepository {
    pub fn new(conn: &MongoConnection) -> Self {
        Self {
            posts: conn.db.collection(POSTS),
        }
    }
}

#[async_trait]
impl PostRepository for MongoPostRepository {
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Post>, RepoError> {
        let doc = self
            .posts
            .find_one(doc! { "_id": id })
            .await
            .map_err(query_err)?;
        Ok(doc.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Post>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let docs: Vec<PostDocument> = self
            .posts
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await
            .map_err(query_err)?
            .try_collect()
            .await
            .map_err(query_err)?;

        // Mongo returns `$in` matches in arbitrary order; restore list order.
        let mut posts: Vec<Post> = Vec::with_capacity(docs.len());
        for id in ids {
            if let Some(doc) = docs.iter().find(|d| d.id == *id) {
                posts.push(doc.clone().into());
            }
        }
        Ok(posts)
    }

    async fn insert(&self, post: &Post) -> Result<(), RepoError> {
        self.posts
            .insert_one(PostDocument::from(post))
            .await
            .map_err(query_err)?;
        Ok(())
    }

    async fn update(&self, post: &Post) -> Result<(), RepoError> {
        let result = self
            .posts
            .replace_one(doc! { "_id": post.id }, PostDocument::from(post))
            .await
            .map_err(query_err)?;

        if result.matched_count == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: ObjectId) -> Result<(), RepoError> {
        let result = self
            .posts
            .delete_one(doc! { "_id": id })
            .await
            .map_err(query_err)?;

        if result.deleted_count == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn page(&self, page: u64, per_page: u64) -> Result<PostPage, RepoError> {
        let total = self
            .posts
            .count_documents(doc! {})
            .await
            .map_err(query_err)?;

        let docs: Vec<PostDocument> = self
            .posts
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .skip(page.saturating_sub(1).saturating_mul(per_page))
            .limit(per_page as i64)
            .await
            .map_err(query_err)?
            .try_collect()
            .await
            .map_err(query_err)?;

        Ok(PostPage {
            posts: docs.into_iter().map(Into::into).collect(),
            total,
        })
    }
}
