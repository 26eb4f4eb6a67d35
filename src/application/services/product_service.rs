//! Product catalogue management.

use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{NewProduct, Product, ProductPatch};
use crate::domain::repositories::ProductRepository;
use crate::error::AppError;

/// Service for the product catalogue.
pub struct ProductService<R: ProductRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: ProductRepository + ?Sized> ProductService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, new_product: NewProduct) -> Result<Product, AppError> {
        let product = self.repository.create(new_product).await?;
        tracing::info!(product_id = product.id, "Product created");
        Ok(product)
    }

    pub async fn get(&self, id: i64) -> Result<Product, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| product_not_found(id))
    }

    /// Returns one page of active products and the total count.
    pub async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<Product>, i64), AppError> {
        let products = self.repository.list(offset, limit).await?;
        let total = self.repository.count().await?;
        Ok((products, total))
    }

    pub async fn search(&self, term: &str) -> Result<Vec<Product>, AppError> {
        self.repository.search(term).await
    }

    /// Products in `category`.
    ///
    /// Products carry no category, so every active product is returned.
    pub async fn by_category(&self, category: &str) -> Result<Vec<Product>, AppError> {
        tracing::debug!(category, "Listing products by category");
        let total = self.repository.count().await?;
        self.repository.list(0, total).await
    }

    pub async fn update(&self, id: i64, patch: ProductPatch) -> Result<Product, AppError> {
        self.repository
            .update(id, patch)
            .await?
            .ok_or_else(|| product_not_found(id))
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.repository.soft_delete(id).await? {
            return Err(product_not_found(id));
        }
        tracing::info!(product_id = id, "Product deactivated");
        Ok(())
    }

    /// Adds `delta` to the stock quantity.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown product and
    /// [`AppError::Validation`] if the stock would become negative.
    pub async fn adjust_stock(&self, id: i64, delta: i32) -> Result<Product, AppError> {
        let current = self.get(id).await?;

        if i64::from(current.stock_quantity) + i64::from(delta) < 0 {
            return Err(insufficient_stock(id, current.stock_quantity));
        }

        // The store re-checks atomically; a concurrent decrement may still win.
        match self.repository.adjust_stock(id, delta).await? {
            Some(product) => Ok(product),
            None => Err(insufficient_stock(id, current.stock_quantity)),
        }
    }
}

fn product_not_found(id: i64) -> AppError {
    AppError::not_found("Product not found", json!({ "id": id }))
}

fn insufficient_stock(id: i64, available: i32) -> AppError {
    AppError::bad_request(
        "Insufficient stock",
        json!({ "id": id, "available": available }),
    )
}
