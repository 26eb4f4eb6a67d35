//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod auth;
pub mod files;
pub mod health;
pub mod products;
pub mod users;

pub use auth::{change_password_handler, login_handler, profile_handler, register_handler};
pub use files::{
    delete_file_handler, download_file_handler, get_file_handler, list_files_handler,
    upload_file_handler,
};
pub use health::health_handler;
pub use products::{
    adjust_stock_handler, create_product_handler, delete_product_handler, get_product_handler,
    list_products_handler, products_by_category_handler, search_products_handler,
    update_product_handler,
};
pub use users::{
    delete_user_handler, get_user_handler, list_users_handler, public_search_handler,
    search_users_handler, update_user_handler,
};
