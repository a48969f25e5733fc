//! Feed handlers: status, post CRUD, image upload.

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use actix_web::{HttpResponse, web};
use bson::oid::ObjectId;
use serde::Deserialize;

use feedline_core::DomainError;
use feedline_core::service::PostDraft;
use feedline_shared::dto::{
    CreatePostResponse, MessageResponse, PostResponse, PostsResponse, StatusResponse,
    UpdateStatusRequest, UploadResponse,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const ALLOWED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpg", "image/jpeg"];

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
}

#[derive(Debug, MultipartForm)]
pub struct CreatePostForm {
    pub title: Text<String>,
    pub content: Text<String>,
    pub image: Option<TempFile>,
}

#[derive(Debug, MultipartForm)]
pub struct UpdatePostForm {
    pub title: Text<String>,
    pub content: Text<String>,
    pub image: Option<TempFile>,
}

#[derive(Debug, MultipartForm)]
pub struct UploadImageForm {
    pub image: Option<TempFile>,
    #[multipart(rename = "oldPath")]
    pub old_path: Option<Text<String>>,
}

/// A malformed id cannot match any post.
fn parse_post_id(raw: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| AppError::NotFound(format!("post {raw} not found")))
}

/// Reject anything that is not an accepted image upload.
fn image_name(file: &TempFile) -> AppResult<String> {
    let mime = file
        .content_type
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_default();
    if !ALLOWED_IMAGE_TYPES.contains(&mime.as_str()) {
        return Err(AppError::Validation(vec![format!(
            "image: unsupported type {mime}"
        )]));
    }
    Ok(file.file_name.clone().unwrap_or_else(|| "image".to_string()))
}

async fn store_image(state: &AppState, file: &TempFile) -> AppResult<String> {
    let name = image_name(file)?;
    state
        .images
        .store(file.file.path(), &name)
        .await
        .map_err(|e| AppError::from(DomainError::from(e)))
}

/// GET /status
pub async fn get_status(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let status = state.feed.get_status(identity.user_id).await?;

    Ok(HttpResponse::Ok().json(StatusResponse {
        message: "Status loaded!".to_string(),
        status,
    }))
}

/// PUT /status
pub async fn update_status(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateStatusRequest>,
) -> AppResult<HttpResponse> {
    let user = state
        .feed
        .update_status(identity.user_id, &body.status)
        .await?;

    Ok(HttpResponse::Ok().json(StatusResponse {
        message: "Status updated!".to_string(),
        status: user.status,
    }))
}

/// GET /posts?page=N
pub async fn get_posts(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state.feed.list_posts(query.page.unwrap_or(1)).await?;

    Ok(HttpResponse::Ok().json(PostsResponse {
        message: "Posts fetched!".to_string(),
        posts: page.posts.iter().map(Into::into).collect(),
        total_items: page.total,
    }))
}

/// POST /posts (multipart: title, content, image)
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    MultipartForm(form): MultipartForm<CreatePostForm>,
) -> AppResult<HttpResponse> {
    let image = form
        .image
        .as_ref()
        .ok_or_else(|| AppError::Validation(vec!["image: no image provided".to_string()]))?;
    let image_url = store_image(&state, image).await?;

    let (post, creator) = state
        .feed
        .create_post(
            identity.user_id,
            PostDraft {
                title: form.title.into_inner(),
                content: form.content.into_inner(),
            },
            image_url,
        )
        .await?;

    Ok(HttpResponse::Created().json(CreatePostResponse {
        message: "Post created!".to_string(),
        post: (&post).into(),
        creator: (&creator).into(),
    }))
}

/// GET /posts/{postId}
pub async fn get_post(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post_id = parse_post_id(&path)?;
    let post = state.feed.get_post(post_id).await?;

    Ok(HttpResponse::Ok().json(PostResponse {
        message: "Post fetched!".to_string(),
        post: (&post).into(),
    }))
}

/// PUT /posts/{postId} (multipart: title, content, image?)
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    MultipartForm(form): MultipartForm<UpdatePostForm>,
) -> AppResult<HttpResponse> {
    let post_id = parse_post_id(&path)?;

    let new_image_url = match &form.image {
        Some(file) if file.size > 0 => Some(store_image(&state, file).await?),
        _ => None,
    };

    let post = state
        .feed
        .update_post(
            identity.user_id,
            post_id,
            PostDraft {
                title: form.title.into_inner(),
                content: form.content.into_inner(),
            },
            new_image_url,
        )
        .await?;

    Ok(HttpResponse::Ok().json(PostResponse {
        message: "Post updated!".to_string(),
        post: (&post).into(),
    }))
}

/// DELETE /posts/{postId}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post_id = parse_post_id(&path)?;
    state.feed.delete_post(identity.user_id, post_id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Post deleted!".to_string(),
    }))
}

/// PUT /post-image (multipart: image, oldPath?)
///
/// Stores an image ahead of a GraphQL `createPost`/`updatePost` mutation and
/// returns the path to reference; a replaced image is removed best-effort.
pub async fn upload_image(
    state: web::Data<AppState>,
    _identity: Identity,
    MultipartForm(form): MultipartForm<UploadImageForm>,
) -> AppResult<HttpResponse> {
    let image = form
        .image
        .as_ref()
        .ok_or_else(|| AppError::Validation(vec!["image: no image provided".to_string()]))?;
    let file_path = store_image(&state, image).await?;

    if let Some(old_path) = form.old_path {
        state.images.remove(&old_path).await;
    }

    Ok(HttpResponse::Created().json(UploadResponse {
        message: "File stored".to_string(),
        file_path,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_post_id_is_not_found() {
        let err = parse_post_id("definitely-not-hex").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let id = ObjectId::new();
        assert_eq!(parse_post_id(&id.to_hex()).unwrap(), id);
    }
}
