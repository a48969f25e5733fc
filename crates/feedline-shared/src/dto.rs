//! Data Transfer Objects - request/response types for the REST API.
//!
//! Ids cross the wire as hex strings under `_id`, timestamps as ISO-8601,
//! matching what feed clients expect. The password hash never appears here.

use serde::{Deserialize, Serialize};

use feedline_core::domain::{Post, User};

/// Request to create an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub message: String,
    pub user_id: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub message: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// A post as serialized on the REST surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub creator: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Post> for PostDto {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.to_hex(),
            title: post.title.clone(),
            content: post.content.clone(),
            image_url: post.image_url.clone(),
            creator: post.creator.to_hex(),
            created_at: post.created_at.to_rfc3339(),
            updated_at: post.updated_at.to_rfc3339(),
        }
    }
}

/// Creator summary attached to a freshly created post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

impl From<&User> for CreatorDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsResponse {
    pub message: String,
    pub posts: Vec<PostDto>,
    pub total_items: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub message: String,
    pub post: PostDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostResponse {
    pub message: String,
    pub post: PostDto,
    pub creator: CreatorDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub file_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;

    #[test]
    fn post_dto_uses_wire_keys() {
        let post = Post::new(
            ObjectId::new(),
            "Title here".to_string(),
            "Content here".to_string(),
            "images/p.png".to_string(),
        );

        let json = serde_json::to_value(PostDto::from(&post)).unwrap();

        assert!(json.get("_id").is_some());
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("image_url").is_none());
        assert_eq!(json["creator"], post.creator.to_hex());
    }
}
