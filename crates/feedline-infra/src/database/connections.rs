//! Database connection management.

use bson::doc;
use mongodb::{Client, Database, IndexModel, options::IndexOptions};

use super::document::UserDocument;

/// Collection names.
pub(crate) const USERS: &str = "users";
pub(crate) const POSTS: &str = "posts";

/// Configuration for the MongoDB connection.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub url: String,
    pub database: String,
}

/// Handle to the feed database. The driver pools connections internally.
#[derive(Clone)]
pub struct MongoConnection {
    pub db: Database,
}

impl MongoConnection {
    /// Connect and ensure the indexes the handlers rely on.
    pub async fn init(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        tracing::info!(database = %config.database, "Connecting to MongoDB...");

        let client = Client::with_uri_str(&config.url).await?;
        let db = client.database(&config.database);

        // Duplicate-signup rejection leans on this; the paired-write
        // invariants have no database-side enforcement.
        let users = db.collection::<UserDocument>(USERS);
        users
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;

        tracing::info!("MongoDB connected, unique email index ensured");
        Ok(Self { db })
    }
}
