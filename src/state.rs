//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{
    FileService, ProductService, TokenService, UploadPolicy, UserService,
};
use crate::domain::repositories::{FileRepository, ProductRepository, UserRepository};
use crate::infrastructure::storage::FileStorage;
use crate::security::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService<dyn UserRepository>>,
    pub product_service: Arc<ProductService<dyn ProductRepository>>,
    pub file_service: Arc<FileService<dyn FileRepository, dyn FileStorage>>,
    pub token_service: Arc<TokenService>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Builds the services over the given backends.
    pub fn new(
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
        files: Arc<dyn FileRepository>,
        storage: Arc<dyn FileStorage>,
        upload_policy: UploadPolicy,
        token_service: Arc<TokenService>,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            user_service: Arc::new(UserService::new(users)),
            product_service: Arc::new(ProductService::new(products)),
            file_service: Arc::new(FileService::new(files, storage, upload_policy)),
            token_service,
            rate_limiter,
        }
    }
}
