//! Status and post operations.

use std::sync::Arc;

use bson::oid::ObjectId;
use chrono::Utc;
use validator::Validate;

use crate::DomainError;
use crate::domain::{Post, User};
use crate::ports::{ImageStore, PostPage, PostRepository, UserRepository};

/// Fixed feed page size.
pub const POSTS_PER_PAGE: u64 = 2;

/// Validated title/content for a new or updated post.
#[derive(Debug, Validate)]
pub struct PostDraft {
    #[validate(length(min = 5, message = "must be at least 5 characters"))]
    pub title: String,
    #[validate(length(min = 5, message = "must be at least 5 characters"))]
    pub content: String,
}

/// Feed operations: status, post CRUD, pagination.
///
/// This is where the `User.posts` / `Post.creator` cross-references are
/// maintained. The paired writes are not transactional; post creation
/// compensates a failed back-reference append by deleting the fresh post.
#[derive(Clone)]
pub struct FeedService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    images: Arc<dyn ImageStore>,
}

impl FeedService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            users,
            posts,
            images,
        }
    }

    /// Load a user or fail with 404 semantics.
    pub async fn get_user(&self, id: ObjectId) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", id.to_hex()))
    }

    pub async fn get_status(&self, user_id: ObjectId) -> Result<String, DomainError> {
        Ok(self.get_user(user_id).await?.status)
    }

    pub async fn update_status(
        &self,
        user_id: ObjectId,
        status: &str,
    ) -> Result<User, DomainError> {
        let mut user = self.get_user(user_id).await?;
        self.users.update_status(user.id, status).await?;
        user.status = status.to_string();
        Ok(user)
    }

    /// One page of the feed, newest first, with the total post count.
    /// Pages are 1-based; anything below 1 is clamped.
    pub async fn list_posts(&self, page: u64) -> Result<PostPage, DomainError> {
        let page = page.max(1);
        Ok(self.posts.page(page, POSTS_PER_PAGE).await?)
    }

    pub async fn get_post(&self, id: ObjectId) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", id.to_hex()))
    }

    /// Create a post and append it to the creator's owned-posts list.
    ///
    /// Returns the post together with its creator for the response payload.
    pub async fn create_post(
        &self,
        creator: ObjectId,
        draft: PostDraft,
        image_url: String,
    ) -> Result<(Post, User), DomainError> {
        draft.validate()?;

        // The token may outlive the account.
        let user = self
            .users
            .find_by_id(creator)
            .await?
            .ok_or(DomainError::Unauthenticated)?;

        let post = Post::new(creator, draft.title, draft.content, image_url);
        self.posts.insert(&post).await?;

        if let Err(err) = self.users.push_post(creator, post.id).await {
            // Compensate: a post without a back-reference would be invisible
            // to its owner.
            if let Err(cleanup) = self.posts.delete(post.id).await {
                tracing::warn!(post_id = %post.id, error = %cleanup, "orphaned post left behind");
            }
            return Err(err.into());
        }

        tracing::debug!(post_id = %post.id, creator = %user.id, "post created");
        Ok((post, user))
    }

    /// Update a post's title, content and optionally its image. Creator only.
    pub async fn update_post(
        &self,
        user_id: ObjectId,
        post_id: ObjectId,
        draft: PostDraft,
        new_image_url: Option<String>,
    ) -> Result<Post, DomainError> {
        let mut post = self.get_post(post_id).await?;
        if post.creator != user_id {
            return Err(DomainError::Forbidden);
        }
        draft.validate()?;

        if let Some(image_url) = new_image_url {
            if image_url != post.image_url {
                self.images.remove(&post.image_url).await;
            }
            post.image_url = image_url;
        }
        post.title = draft.title;
        post.content = draft.content;
        post.updated_at = Utc::now();

        self.posts.update(&post).await?;
        Ok(post)
    }

    /// Delete a post, its stored image and the creator's back-reference.
    /// Creator only. Three dependent steps, executed in sequence.
    pub async fn delete_post(&self, user_id: ObjectId, post_id: ObjectId) -> Result<(), DomainError> {
        let post = self.get_post(post_id).await?;
        if post.creator != user_id {
            return Err(DomainError::Forbidden);
        }

        self.images.remove(&post.image_url).await;
        self.posts.delete(post.id).await?;
        self.users.pull_post(user_id, post.id).await?;

        tracing::debug!(post_id = %post.id, "post deleted");
        Ok(())
    }

    /// Resolve a post's creator ("populate" in the GraphQL path).
    pub async fn creator_of(&self, post: &Post) -> Result<User, DomainError> {
        self.get_user(post.creator).await
    }

    /// Resolve a user's owned posts, in list order.
    pub async fn posts_of(&self, user: &User) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_by_ids(&user.posts).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::memory::{MemoryImages, MemoryPosts, MemoryUsers};

    struct Fixture {
        service: FeedService,
        users: Arc<MemoryUsers>,
        posts: Arc<MemoryPosts>,
        images: Arc<MemoryImages>,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(MemoryUsers::default());
        let posts = Arc::new(MemoryPosts::default());
        let images = Arc::new(MemoryImages::default());
        Fixture {
            service: FeedService::new(users.clone(), posts.clone(), images.clone()),
            users,
            posts,
            images,
        }
    }

    async fn seed_user(fx: &Fixture, email: &str) -> User {
        let user = User::new(email.to_string(), "hash".to_string(), "Anna".to_string());
        fx.users.insert(&user).await.unwrap();
        user
    }

    fn draft(title: &str) -> PostDraft {
        PostDraft {
            title: title.to_string(),
            content: "some longer content".to_string(),
        }
    }

    #[tokio::test]
    async fn create_post_links_both_directions() {
        let fx = fixture();
        let user = seed_user(&fx, "a@b.com").await;

        let (post, creator) = fx
            .service
            .create_post(user.id, draft("First post"), "images/p.png".to_string())
            .await
            .unwrap();

        assert_eq!(creator.id, user.id);
        assert_eq!(post.creator, user.id);
        let stored_user = fx.users.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored_user.posts, vec![post.id]);
    }

    #[tokio::test]
    async fn create_post_rejects_short_title() {
        let fx = fixture();
        let user = seed_user(&fx, "a@b.com").await;

        let err = fx
            .service
            .create_post(user.id, draft("hey"), "images/p.png".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert!(fx.posts.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_post_for_vanished_user_is_unauthenticated() {
        let fx = fixture();

        let err = fx
            .service
            .create_post(ObjectId::new(), draft("First post"), "images/p.png".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Unauthenticated));
    }

    #[tokio::test]
    async fn update_post_by_non_creator_is_forbidden_and_changes_nothing() {
        let fx = fixture();
        let owner = seed_user(&fx, "owner@b.com").await;
        let intruder = seed_user(&fx, "intruder@b.com").await;
        let (post, _) = fx
            .service
            .create_post(owner.id, draft("First post"), "images/p.png".to_string())
            .await
            .unwrap();

        let err = fx
            .service
            .update_post(intruder.id, post.id, draft("Hijacked post"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Forbidden));
        let stored = fx.service.get_post(post.id).await.unwrap();
        assert_eq!(stored.title, "First post");
    }

    #[tokio::test]
    async fn update_post_with_new_image_removes_the_old_file() {
        let fx = fixture();
        let owner = seed_user(&fx, "owner@b.com").await;
        let (post, _) = fx
            .service
            .create_post(owner.id, draft("First post"), "images/old.png".to_string())
            .await
            .unwrap();

        let updated = fx
            .service
            .update_post(
                owner.id,
                post.id,
                draft("First post, edited"),
                Some("images/new.png".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(updated.image_url, "images/new.png");
        assert!(updated.updated_at >= post.updated_at);
        assert_eq!(
            *fx.images.removed.lock().unwrap(),
            vec!["images/old.png".to_string()]
        );
    }

    #[tokio::test]
    async fn update_post_without_image_keeps_the_old_one() {
        let fx = fixture();
        let owner = seed_user(&fx, "owner@b.com").await;
        let (post, _) = fx
            .service
            .create_post(owner.id, draft("First post"), "images/old.png".to_string())
            .await
            .unwrap();

        let updated = fx
            .service
            .update_post(owner.id, post.id, draft("First post, edited"), None)
            .await
            .unwrap();

        assert_eq!(updated.image_url, "images/old.png");
        assert!(fx.images.removed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_post_by_non_creator_is_forbidden() {
        let fx = fixture();
        let owner = seed_user(&fx, "owner@b.com").await;
        let intruder = seed_user(&fx, "intruder@b.com").await;
        let (post, _) = fx
            .service
            .create_post(owner.id, draft("First post"), "images/p.png".to_string())
            .await
            .unwrap();

        let err = fx.service.delete_post(intruder.id, post.id).await.unwrap_err();

        assert!(matches!(err, DomainError::Forbidden));
        assert!(fx.service.get_post(post.id).await.is_ok());
    }

    #[tokio::test]
    async fn delete_post_removes_document_back_reference_and_image() {
        let fx = fixture();
        let owner = seed_user(&fx, "owner@b.com").await;
        let (post, _) = fx
            .service
            .create_post(owner.id, draft("First post"), "images/p.png".to_string())
            .await
            .unwrap();

        fx.service.delete_post(owner.id, post.id).await.unwrap();

        assert!(matches!(
            fx.service.get_post(post.id).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
        let stored_user = fx.users.find_by_id(owner.id).await.unwrap().unwrap();
        assert!(stored_user.posts.is_empty());
        assert_eq!(
            *fx.images.removed.lock().unwrap(),
            vec!["images/p.png".to_string()]
        );
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let fx = fixture();
        let err = fx.service.get_post(ObjectId::new()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn pagination_returns_at_most_two_and_the_full_count() {
        let fx = fixture();
        let user = seed_user(&fx, "a@b.com").await;
        for i in 0..5 {
            fx.service
                .create_post(user.id, draft(&format!("Post number {i}")), "images/p.png".to_string())
                .await
                .unwrap();
        }

        let first = fx.service.list_posts(1).await.unwrap();
        assert_eq!(first.posts.len(), 2);
        assert_eq!(first.total, 5);

        let third = fx.service.list_posts(3).await.unwrap();
        assert_eq!(third.posts.len(), 1);
        assert_eq!(third.total, 5);

        let beyond = fx.service.list_posts(9).await.unwrap();
        assert!(beyond.posts.is_empty());
        assert_eq!(beyond.total, 5);

        // Page 0 is clamped to the first page.
        let clamped = fx.service.list_posts(0).await.unwrap();
        assert_eq!(clamped.posts.len(), 2);
    }

    #[tokio::test]
    async fn huge_page_number_yields_empty_page_without_overflow() {
        let fx = fixture();
        let user = seed_user(&fx, "a@b.com").await;
        for i in 0..3 {
            fx.service
                .create_post(user.id, draft(&format!("Post number {i}")), "images/p.png".to_string())
                .await
                .unwrap();
        }

        let page = fx.service.list_posts(u64::MAX).await.unwrap();
        assert!(page.posts.is_empty());
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn status_round_trip() {
        let fx = fixture();
        let user = seed_user(&fx, "a@b.com").await;

        assert_eq!(
            fx.service.get_status(user.id).await.unwrap(),
            crate::domain::DEFAULT_STATUS
        );

        let updated = fx.service.update_status(user.id, "shipping").await.unwrap();
        assert_eq!(updated.status, "shipping");
        assert_eq!(fx.service.get_status(user.id).await.unwrap(), "shipping");
    }

    #[tokio::test]
    async fn status_of_vanished_user_is_not_found() {
        let fx = fixture();
        let err = fx.service.get_status(ObjectId::new()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
