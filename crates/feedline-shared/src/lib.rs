//! # Feedline Shared
//!
//! REST wire types: request/response DTOs and the JSON error envelope.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
