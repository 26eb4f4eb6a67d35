//! Product catalogue entity.

use chrono::{DateTime, Utc};

/// A catalogue item. Prices are stored as integer cents.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock_quantity: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Price in currency units.
    pub fn price(&self) -> f64 {
        self.price_cents as f64 / 100.0
    }
}

/// Converts a currency amount to cents, rounding to the nearest cent.
pub fn to_cents(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

/// Input data for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock_quantity: i32,
}

/// Full replacement of the editable product fields.
#[derive(Debug, Clone)]
pub struct ProductPatch {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock_quantity: i32,
}
