//! Application state - shared across all handlers and resolvers.

use std::sync::Arc;

use feedline_core::ports::{ImageStore, TokenService};
use feedline_core::service::{AuthService, FeedService};
use feedline_infra::auth::{Argon2PasswordService, JwtTokenService};
use feedline_infra::database::{MongoConnection, MongoPostRepository, MongoUserRepository};
use feedline_infra::storage::FsImageStore;

use crate::config::AppConfig;

/// Shared application state: the two services plus the pieces the transport
/// layer needs directly (token validation, image storage).
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub feed: FeedService,
    pub tokens: Arc<dyn TokenService>,
    pub images: Arc<dyn ImageStore>,
}

impl AppState {
    /// Connect to MongoDB and wire the services.
    pub async fn new(config: &AppConfig) -> Result<Self, String> {
        let conn = MongoConnection::init(&config.database)
            .await
            .map_err(|e| format!("failed to connect to MongoDB: {e}"))?;

        let users = Arc::new(MongoUserRepository::new(&conn));
        let posts = Arc::new(MongoPostRepository::new(&conn));

        let images = Arc::new(FsImageStore::new(config.upload_dir.clone()));
        images
            .ensure_dir()
            .await
            .map_err(|e| format!("failed to prepare upload dir: {e}"))?;
        let images: Arc<dyn ImageStore> = images;

        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let passwords = Arc::new(Argon2PasswordService::new());

        let auth = AuthService::new(users.clone(), passwords, tokens.clone());
        let feed = FeedService::new(users, posts, images.clone());

        tracing::info!("Application state initialized");

        Ok(Self {
            auth,
            feed,
            tokens,
            images,
        })
    }
}
