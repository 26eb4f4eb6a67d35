//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls and business rules. They consume the
//! repository traits from [`crate::domain::repositories`] and are called by the
//! HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::user_service::UserService`] - registration, login and account administration
//! - [`services::product_service::ProductService`] - product catalogue and stock
//! - [`services::file_service::FileService`] - uploads, downloads and file metadata
//! - [`services::token_service::TokenService`] - bearer token issuing and verification

pub mod services;
