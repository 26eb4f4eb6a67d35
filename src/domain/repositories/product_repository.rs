//! Repository trait for the product catalogue.

use crate::domain::entities::{NewProduct, Product, ProductPatch};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for products. Only active products are returned.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, new_product: NewProduct) -> Result<Product, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, AppError>;

    /// Lists products ordered by id.
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Product>, AppError>;

    async fn count(&self) -> Result<i64, AppError>;

    /// Case-insensitive substring search over name and description.
    async fn search(&self, term: &str) -> Result<Vec<Product>, AppError>;

    /// Replaces the editable fields. Returns `Ok(None)` if not found.
    async fn update(&self, id: i64, patch: ProductPatch) -> Result<Option<Product>, AppError>;

    /// Marks the product inactive. Returns `Ok(false)` if not found.
    async fn soft_delete(&self, id: i64) -> Result<bool, AppError>;

    /// Adds `delta` to the stock quantity unless the result would be negative.
    ///
    /// Returns `Ok(None)` if the product does not exist or the stock is insufficient.
    async fn adjust_stock(&self, id: i64, delta: i32) -> Result<Option<Product>, AppError>;
}
