pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::models::UserView;

pub use extractors::Caller;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, IssuedToken, TokenSigner};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Payload of a registration request. Required fields are optional at the
/// type level so that every missing one is reported with a single message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl RegisterRequest {
    /// Checks that username, password and email are present.
    pub fn into_registration(self) -> Result<Registration, AppError> {
        match (self.username, self.password, self.email) {
            (Some(username), Some(password), Some(email)) => Ok(Registration {
                username,
                password,
                email,
                first_name: self.first_name,
                last_name: self.last_name,
            }),
            _ => Err(AppError::BadRequest(
                "Missing required fields: username, password, email".into(),
            )),
        }
    }
}

/// A registration with all required fields present, ready for entity
/// validation.
#[derive(Debug, Clone, Validate)]
pub struct Registration {
    /// Between 3 and 32 characters: letters, digits, underscores or hyphens.
    #[validate(
        length(min = 3, max = 32, message = "Username must be between 3 and 32 characters."),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long."))]
    pub password: String,
    #[validate(email(message = "This value is not a valid email address."))]
    pub email: String,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
}

/// Payload for a user login request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response after successful authentication (login or registration).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserView,
    pub token: String,
}

impl AuthResponse {
    pub fn new(message: &str, issued: IssuedToken) -> Self {
        Self {
            message: message.to_string(),
            user: issued.user,
            token: issued.token,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: UserView,
}
