//! BSON document shapes for the two collections, with conversions to and
//! from the domain entities. Timestamps are stored as BSON datetimes.

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use feedline_core::domain::{Post, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub status: String,
    pub posts: Vec<ObjectId>,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        Self {
            id: doc.id,
            email: doc.email,
            password_hash: doc.password_hash,
            name: doc.name,
            status: doc.status,
            posts: doc.posts,
            created_at: doc.created_at.to_chrono(),
            updated_at: doc.updated_at.to_chrono(),
        }
    }
}

impl From<&User> for UserDocument {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            name: user.name.clone(),
            status: user.status.clone(),
            posts: user.posts.clone(),
            created_at: bson::DateTime::from_chrono(user.created_at),
            updated_at: bson::DateTime::from_chrono(user.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub creator: ObjectId,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

impl From<PostDocument> for Post {
    fn from(doc: PostDocument) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            content: doc.content,
            image_url: doc.image_url,
            creator: doc.creator,
            created_at: doc.created_at.to_chrono(),
            updated_at: doc.updated_at.to_chrono(),
        }
    }
}

impl From<&Post> for PostDocument {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            content: post.content.clone(),
            image_url: post.image_url.clone(),
            creator: post.creator,
            created_at: bson::DateTime::from_chrono(post.created_at),
            updated_at: bson::DateTime::from_chrono(post.updated_at),
        }
    }
}
