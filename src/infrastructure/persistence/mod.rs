//! PostgreSQL repository implementations.
//!
//! Concrete implementations of the domain repository traits using SQLx runtime
//! queries with bound parameters. The schema lives in `migrations/`.
//!
//! # Repositories
//!
//! - [`PgUserRepository`] - user accounts and roles
//! - [`PgProductRepository`] - product catalogue and stock
//! - [`PgFileRepository`] - uploaded file metadata

pub mod pg_file_repository;
pub mod pg_product_repository;
pub mod pg_user_repository;

pub use pg_file_repository::PgFileRepository;
pub use pg_product_repository::PgProductRepository;
pub use pg_user_repository::PgUserRepository;
