//! DTOs for user endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::validation::no_xss;
use crate::domain::entities::{User, UserPatch};

/// Public view of an account. Never includes the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub age: i32,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            age: user.age,
            roles: user.roles,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// Partial update. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 100, message = "Username must be 3-100 characters"))]
    #[validate(custom(function = "no_xss"))]
    pub username: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(range(min = 18, max = 120, message = "Age must be between 18 and 120"))]
    pub age: Option<i32>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            age: req.age,
        }
    }
}

/// Admin search over username and email.
#[derive(Debug, Deserialize, Validate)]
pub struct UserSearchParams {
    #[validate(length(min = 1, max = 100))]
    pub term: String,
}

/// Public username lookup. The parameter is mandatory.
#[derive(Debug, Deserialize, Validate)]
pub struct PublicSearchParams {
    #[validate(length(min = 1, max = 100))]
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PublicSearchResponse {
    pub usernames: Vec<String>,
}
