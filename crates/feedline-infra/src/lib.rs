//! # Feedline Infra
//!
//! Infrastructure implementations of the core ports: MongoDB repositories,
//! JWT tokens, Argon2 password hashing and the filesystem image store.

pub mod auth;
pub mod database;
pub mod storage;
