//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization and validator
//! for input validation. Entities are never serialized directly.

pub mod auth;
pub mod file;
pub mod health;
pub mod pagination;
pub mod product;
pub mod user;
