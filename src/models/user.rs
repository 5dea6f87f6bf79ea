//! User domain models

use super::role::Role;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_.-]+$").expect("USERNAME_REGEX should be a valid regex pattern")
});

/// A registered user. Never carries credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(
        length(min = 1, max = 64, message = "username must be 1 to 64 characters"),
        regex(path = *USERNAME_REGEX, message = "username may only contain letters, digits, '.', '_' and '-'")
    )]
    pub username: String,
    #[validate(length(min = 1, max = 1024, message = "password must not be empty"))]
    pub password: String,
    /// Parsed into [`Role`] by the auth service so an unknown value is a typed failure
    pub role: String,
}

/// User response (without sensitive data)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

impl From<Identity> for UserResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username,
            role: identity.role,
        }
    }
}
