//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence` (PostgreSQL) and
//! `crate::infrastructure::memory` (in-process). Mock implementations are
//! generated via `mockall` for service tests.
//!
//! - [`UserRepository`] - user accounts and roles
//! - [`ProductRepository`] - product catalogue and stock
//! - [`FileRepository`] - uploaded file metadata

pub mod file_repository;
pub mod product_repository;
pub mod user_repository;

pub use file_repository::FileRepository;
pub use product_repository::ProductRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use file_repository::MockFileRepository;
#[cfg(test)]
pub use product_repository::MockProductRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
