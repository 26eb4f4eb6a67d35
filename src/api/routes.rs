//! v1 API route configuration.
//!
//! Access rules are not attached here. Every route sits behind the security
//! pipeline, whose [`crate::security::AccessPolicy`] decides which callers may
//! reach it.

use crate::api::handlers::{
    adjust_stock_handler, change_password_handler, create_product_handler, delete_file_handler,
    delete_product_handler, delete_user_handler, download_file_handler, get_file_handler,
    get_product_handler, get_user_handler, list_files_handler, list_products_handler,
    list_users_handler, login_handler, products_by_category_handler, profile_handler,
    public_search_handler, register_handler, search_products_handler, search_users_handler,
    update_product_handler, update_user_handler, upload_file_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch, post},
};

/// All v1 routes, to be nested under `/api/v1`.
///
/// # Endpoints
///
/// - `POST   /auth/register`              - Create an account (public)
/// - `POST   /auth/login`                 - Obtain a bearer token (public)
/// - `POST   /auth/change-password`       - Change own password
/// - `GET    /auth/profile`               - Own account
/// - `GET    /users`                      - List users (Admin)
/// - `GET    /users/search`               - Search users (Admin)
/// - `GET    /users/public-search`        - Username lookup (public)
/// - `GET    /users/{id}`                 - Get, update or delete a user (Admin)
/// - `GET    /products`                   - List products (public), create (Admin)
/// - `GET    /products/search`            - Search products (public)
/// - `GET    /products/category/{name}`   - Products by category (public)
/// - `GET    /products/{id}`              - Get (public), update or delete (Admin)
/// - `PATCH  /products/{id}/stock`        - Adjust stock (Admin)
/// - `GET    /files`                      - List visible files
/// - `POST   /files/upload`               - Upload a file
/// - `GET    /files/download/{id}`        - Download a file
/// - `GET    /files/{id}`                 - File metadata, delete own file
pub fn v1_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/change-password", post(change_password_handler))
        .route("/auth/profile", get(profile_handler))
        .route("/users", get(list_users_handler))
        .route("/users/search", get(search_users_handler))
        .route("/users/public-search", get(public_search_handler))
        .route(
            "/users/{id}",
            get(get_user_handler)
                .put(update_user_handler)
                .delete(delete_user_handler),
        )
        .route(
            "/products",
            get(list_products_handler).post(create_product_handler),
        )
        .route("/products/search", get(search_products_handler))
        .route(
            "/products/category/{category}",
            get(products_by_category_handler),
        )
        .route(
            "/products/{id}",
            get(get_product_handler)
                .put(update_product_handler)
                .delete(delete_product_handler),
        )
        .route("/products/{id}/stock", patch(adjust_stock_handler))
        .route("/files", get(list_files_handler))
        .route("/files/upload", post(upload_file_handler))
        .route("/files/download/{id}", get(download_file_handler))
        .route(
            "/files/{id}",
            get(get_file_handler).delete(delete_file_handler),
        )
}
