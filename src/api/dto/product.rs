//! DTOs for product endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::validation::no_xss;
use crate::domain::entities::{NewProduct, Product, ProductPatch, to_cents};

/// Create or replace a product.
#[derive(Debug, Deserialize, Validate)]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    #[validate(custom(function = "no_xss"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    #[validate(custom(function = "no_xss"))]
    pub description: Option<String>,

    #[validate(range(min = 0.01, message = "Price must be at least 0.01"))]
    pub price: f64,

    #[validate(range(min = 0, message = "Stock quantity cannot be negative"))]
    pub stock_quantity: i32,
}

impl From<ProductRequest> for NewProduct {
    fn from(req: ProductRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            price_cents: to_cents(req.price),
            stock_quantity: req.stock_quantity,
        }
    }
}

impl From<ProductRequest> for ProductPatch {
    fn from(req: ProductRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            price_cents: to_cents(req.price),
            stock_quantity: req.stock_quantity,
        }
    }
}

/// Stock change. Negative quantities remove stock.
#[derive(Debug, Deserialize)]
pub struct StockAdjustmentRequest {
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProductSearchParams {
    #[validate(length(min = 1, max = 200))]
    pub search_term: String,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            price: product.price(),
            id: product.id,
            name: product.name,
            description: product.description,
            stock_quantity: product.stock_quantity,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(price: f64, stock: i32) -> ProductRequest {
        ProductRequest {
            name: "Widget".to_string(),
            description: Some("A handy widget".to_string()),
            price,
            stock_quantity: stock,
        }
    }

    #[test]
    fn test_price_and_stock_bounds() {
        assert!(request(0.01, 0).validate().is_ok());
        assert!(request(0.0, 0).validate().is_err());
        assert!(request(1.0, -1).validate().is_err());
    }

    #[test]
    fn test_price_converted_to_cents() {
        let new: NewProduct = request(19.99, 1).into();
        assert_eq!(new.price_cents, 1999);
    }
}
