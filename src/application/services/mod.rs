//! Business logic services for the application layer.

pub mod file_service;
pub mod password;
pub mod product_service;
pub mod token_service;
pub mod user_service;

pub use file_service::{FileService, Upload, UploadPolicy};
pub use product_service::ProductService;
pub use token_service::{Claims, IssuedToken, TokenError, TokenService};
pub use user_service::{Registration, UserService};
