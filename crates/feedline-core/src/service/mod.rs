//! Services - the business rules shared by the REST and GraphQL transports.
//!
//! Both transports call into these, so validation, ownership checks and the
//! paired-write bookkeeping between `User.posts` and `Post.creator` cannot
//! drift between them.

mod auth;
mod feed;

pub use auth::{AuthService, Session, Signup};
pub use feed::{FeedService, POSTS_PER_PAGE, PostDraft};

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory port implementations for service tests.

    use std::path::Path;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bson::oid::ObjectId;

    use crate::domain::{Post, User};
    use crate::error::RepoError;
    use crate::ports::{
        AuthError, ImageStore, PasswordService, PostPage, PostRepository, StorageError,
        TokenClaims, TokenService, UserRepository,
    };

    #[derive(Default)]
    pub struct MemoryUsers(pub Mutex<Vec<User>>);

    #[async_trait]
    impl UserRepository for MemoryUsers {
        async fn find_by_id(&self, id: ObjectId) -> Result<Option<User>, RepoError> {
            Ok(self.0.lock().unwrap().iter().find(|u| u.id == id).cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn insert(&self, user: &User) -> Result<(), RepoError> {
            self.0.lock().unwrap().push(user.clone());
            Ok(())
        }

        async fn update_status(&self, id: ObjectId, status: &str) -> Result<(), RepoError> {
            let mut users = self.0.lock().unwrap();
            let user = users.iter_mut().find(|u| u.id == id).ok_or(RepoError::NotFound)?;
            user.status = status.to_string();
            Ok(())
        }

        async fn push_post(&self, user_id: ObjectId, post_id: ObjectId) -> Result<(), RepoError> {
            let mut users = self.0.lock().unwrap();
            let user = users
                .iter_mut()
                .find(|u| u.id == user_id)
                .ok_or(RepoError::NotFound)?;
            user.posts.push(post_id);
            Ok(())
        }

        async fn pull_post(&self, user_id: ObjectId, post_id: ObjectId) -> Result<(), RepoError> {
            let mut users = self.0.lock().unwrap();
            let user = users
                .iter_mut()
                .find(|u| u.id == user_id)
                .ok_or(RepoError::NotFound)?;
            user.posts.retain(|p| *p != post_id);
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MemoryPosts(pub Mutex<Vec<Post>>);

    #[async_trait]
    impl PostRepository for MemoryPosts {
        async fn find_by_id(&self, id: ObjectId) -> Result<Option<Post>, RepoError> {
            Ok(self.0.lock().unwrap().iter().find(|p| p.id == id).cloned())
        }

        async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Post>, RepoError> {
            let posts = self.0.lock().unwrap();
            Ok(ids
                .iter()
                .filter_map(|id| posts.iter().find(|p| p.id == *id).cloned())
                .collect())
        }

        async fn insert(&self, post: &Post) -> Result<(), RepoError> {
            self.0.lock().unwrap().push(post.clone());
            Ok(())
        }

        async fn update(&self, post: &Post) -> Result<(), RepoError> {
            let mut posts = self.0.lock().unwrap();
            let slot = posts
                .iter_mut()
                .find(|p| p.id == post.id)
                .ok_or(RepoError::NotFound)?;
            *slot = post.clone();
            Ok(())
        }

        async fn delete(&self, id: ObjectId) -> Result<(), RepoError> {
            let mut posts = self.0.lock().unwrap();
            let before = posts.len();
            posts.retain(|p| p.id != id);
            if posts.len() == before {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }

        async fn page(&self, page: u64, per_page: u64) -> Result<PostPage, RepoError> {
            let mut posts = self.0.lock().unwrap().clone();
            posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            let total = posts.len() as u64;
            let posts = posts
                .into_iter()
                .skip(page.saturating_sub(1).saturating_mul(per_page) as usize)
                .take(per_page as usize)
                .collect();
            Ok(PostPage { posts, total })
        }
    }

    #[derive(Default)]
    pub struct MemoryImages {
        pub removed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ImageStore for MemoryImages {
        async fn store(&self, _src: &Path, original_name: &str) -> Result<String, StorageError> {
            Ok(format!("images/{original_name}"))
        }

        async fn remove(&self, path: &str) {
            self.removed.lock().unwrap().push(path.to_string());
        }
    }

    /// Reversible "hash" so tests can assert without a real KDF.
    pub struct PlainPasswords;

    impl PasswordService for PlainPasswords {
        fn hash(&self, password: &str) -> Result<String, AuthError> {
            Ok(format!("hashed:{password}"))
        }

        fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
            Ok(hash == format!("hashed:{password}"))
        }
    }

    pub struct StaticTokens;

    impl TokenService for StaticTokens {
        fn generate_token(&self, user_id: ObjectId, email: &str) -> Result<String, AuthError> {
            Ok(format!("{}:{}", user_id.to_hex(), email))
        }

        fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
            let (id, email) = token
                .split_once(':')
                .ok_or_else(|| AuthError::InvalidToken("malformed".to_string()))?;
            let user_id = ObjectId::parse_str(id)
                .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
            Ok(TokenClaims {
                user_id,
                email: email.to_string(),
                exp: 0,
            })
        }

        fn expiration_seconds(&self) -> i64 {
            3600
        }
    }
}
