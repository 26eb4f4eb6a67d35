//! User account entity.

use chrono::{DateTime, Utc};

/// Role granted to every registered account.
pub const ROLE_USER: &str = "User";
/// Role required by the administrative endpoints.
pub const ROLE_ADMIN: &str = "Admin";

/// A registered account.
///
/// `password_hash` holds an Argon2 PHC string and never leaves the service layer.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub age: i32,
    pub roles: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Returns true if the account holds `role`.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Input data for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub age: i32,
    pub roles: Vec<String>,
}

/// Partial update for an existing user. `None` fields are unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.age.is_none()
    }
}
