//! Domain layer: entities, the caller identity and repository contracts.
//!
//! - [`entities`] - users, products and stored files
//! - [`identity`] - the identity reconstructed from a bearer token
//! - [`repositories`] - data access traits implemented in
//!   [`crate::infrastructure::persistence`]
//!
//! The domain layer has no dependencies on infrastructure or presentation layers.

pub mod entities;
pub mod identity;
pub mod repositories;
