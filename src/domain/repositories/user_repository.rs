//! Repository trait for user accounts.

use crate::domain::entities::{NewUser, User, UserPatch};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for user accounts.
///
/// Lookups only return active (not soft-deleted) users.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUserRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::InMemoryUserRepository`] - process-local store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the username or email is taken.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Lists users ordered by id.
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>, AppError>;

    async fn count(&self) -> Result<i64, AppError>;

    /// Case-insensitive substring search over username and email.
    async fn search(&self, term: &str, limit: i64) -> Result<Vec<User>, AppError>;

    /// Applies a partial update. Returns `Ok(None)` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the new username or email is taken.
    async fn update(&self, id: i64, patch: UserPatch) -> Result<Option<User>, AppError>;

    /// Replaces the password hash. Returns `Ok(false)` if the user does not exist.
    async fn set_password_hash(&self, id: i64, password_hash: &str) -> Result<bool, AppError>;

    /// Replaces the role set. Returns `Ok(None)` if the user does not exist.
    async fn set_roles(&self, id: i64, roles: Vec<String>) -> Result<Option<User>, AppError>;

    async fn touch_last_login(&self, id: i64) -> Result<(), AppError>;

    /// Marks the user inactive. Returns `Ok(false)` if not found or already deleted.
    async fn soft_delete(&self, id: i64) -> Result<bool, AppError>;

    /// Round-trips to the backing store.
    async fn health_check(&self) -> Result<(), AppError>;
}
