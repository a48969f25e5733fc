//! # Feedline Core
//!
//! The domain layer of the Feedline backend.
//! This crate contains the entities, ports and services that carry the
//! validation, authorization and cross-reference rules shared by the REST
//! and GraphQL transports. No infrastructure lives here.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use error::DomainError;
