//! MongoDB persistence.

mod connections;
mod document;
mod mongo_repo;

pub use connections::{MongoConfig, MongoConnection};
pub use mongo_repo::{MongoPostRepository, MongoUserRepository};
