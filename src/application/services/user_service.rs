//! User accounts: registration, login, profile and administration.

use serde_json::json;
use std::sync::Arc;

use crate::application::services::password::{hash_password_blocking, verify_password_blocking};
use crate::domain::entities::{NewUser, ROLE_ADMIN, ROLE_USER, User, UserPatch};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;

/// Maximum rows returned by the public username search.
pub const PUBLIC_SEARCH_LIMIT: i64 = 5;
/// Maximum rows returned by the admin search.
pub const ADMIN_SEARCH_LIMIT: i64 = 50;

/// Registration input after field validation.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub age: i32,
}

/// Service for user accounts.
///
/// Passwords are hashed with Argon2 on the blocking pool and never returned.
pub struct UserService<R: UserRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: UserRepository + ?Sized> UserService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Registers a new account with the `User` role.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the username or email is taken.
    pub async fn register(&self, registration: Registration) -> Result<User, AppError> {
        if self
            .repository
            .find_by_username(&registration.username)
            .await?
            .is_some()
            || self
                .repository
                .find_by_email(&registration.email)
                .await?
                .is_some()
        {
            return Err(already_exists());
        }

        let password_hash = hash_password_blocking(registration.password).await?;

        let new_user = NewUser {
            username: registration.username,
            email: registration.email,
            password_hash,
            age: registration.age,
            roles: vec![ROLE_USER.to_string()],
        };

        let user = self
            .repository
            .create(new_user)
            .await
            .map_err(|e| match e {
                AppError::Conflict { .. } => already_exists(),
                other => other,
            })?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Verifies credentials and records the login time.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for an unknown user, an inactive
    /// account or a wrong password. The three cases are indistinguishable.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AppError> {
        let user = self
            .repository
            .find_by_username(username)
            .await?
            .filter(|u| u.is_active);

        let Some(user) = user else {
            return Err(invalid_credentials());
        };

        if !verify_password_blocking(password.to_string(), user.password_hash.clone()).await {
            return Err(invalid_credentials());
        }

        self.repository.touch_last_login(user.id).await?;
        Ok(user)
    }

    /// Replaces the password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `current_password` is wrong and
    /// [`AppError::NotFound`] if the account no longer exists.
    pub async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let user = self.get(user_id).await?;

        if !verify_password_blocking(current_password.to_string(), user.password_hash).await {
            return Err(AppError::bad_request(
                "Current password is incorrect",
                json!({}),
            ));
        }

        let password_hash = hash_password_blocking(new_password.to_string()).await?;
        if !self
            .repository
            .set_password_hash(user_id, &password_hash)
            .await?
        {
            return Err(user_not_found(user_id));
        }

        tracing::info!(user_id, "Password changed");
        Ok(())
    }

    pub async fn get(&self, id: i64) -> Result<User, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| user_not_found(id))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<User, AppError> {
        self.repository
            .find_by_username(username)
            .await?
            .ok_or_else(|| {
                AppError::not_found("User not found", json!({ "username": username }))
            })
    }

    /// Returns one page of users and the total count.
    pub async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<User>, i64), AppError> {
        let users = self.repository.list(offset, limit).await?;
        let total = self.repository.count().await?;
        Ok((users, total))
    }

    pub async fn search(&self, term: &str) -> Result<Vec<User>, AppError> {
        self.repository.search(term, ADMIN_SEARCH_LIMIT).await
    }

    /// Usernames matching `username`, at most [`PUBLIC_SEARCH_LIMIT`].
    pub async fn public_search(&self, username: &str) -> Result<Vec<String>, AppError> {
        Ok(self
            .repository
            .search(username, PUBLIC_SEARCH_LIMIT)
            .await?
            .into_iter()
            .map(|u| u.username)
            .collect())
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the new username or email belongs
    /// to another account, [`AppError::NotFound`] if the user does not exist.
    pub async fn update(&self, id: i64, patch: UserPatch) -> Result<User, AppError> {
        if let Some(ref username) = patch.username
            && self
                .repository
                .find_by_username(username)
                .await?
                .is_some_and(|u| u.id != id)
        {
            return Err(already_exists());
        }

        if let Some(ref email) = patch.email
            && self
                .repository
                .find_by_email(email)
                .await?
                .is_some_and(|u| u.id != id)
        {
            return Err(already_exists());
        }

        self.repository
            .update(id, patch)
            .await?
            .ok_or_else(|| user_not_found(id))
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.repository.soft_delete(id).await? {
            return Err(user_not_found(id));
        }
        tracing::info!(user_id = id, "User deactivated");
        Ok(())
    }

    /// Grants or revokes the `Admin` role.
    pub async fn set_admin(&self, username: &str, admin: bool) -> Result<User, AppError> {
        let user = self.get_by_username(username).await?;

        let mut roles: Vec<String> = user
            .roles
            .iter()
            .filter(|r| r.as_str() != ROLE_ADMIN)
            .cloned()
            .collect();
        if admin {
            roles.push(ROLE_ADMIN.to_string());
        }
        if !roles.iter().any(|r| r == ROLE_USER) {
            roles.insert(0, ROLE_USER.to_string());
        }

        self.repository
            .set_roles(user.id, roles)
            .await?
            .ok_or_else(|| user_not_found(user.id))
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.repository.health_check().await
    }
}

fn already_exists() -> AppError {
    AppError::bad_request("Username or email already exists", json!({}))
}

fn invalid_credentials() -> AppError {
    AppError::unauthorized("Invalid credentials", json!({}))
}

fn user_not_found(id: i64) -> AppError {
    AppError::not_found("User not found", json!({ "id": id }))
}
