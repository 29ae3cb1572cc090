//! Registration, login and profile lookup.

use validator::Validate;

use crate::auth::{hash_password, verify_password, IssuedToken, LoginRequest, RegisterRequest, TokenSigner};
use crate::error::AppError;
use crate::models::{datetime, NewUser, User, ROLE_USER};
use crate::store::UserRepository;

/// Registers a new account and issues its first token.
///
/// Checks run in order: required fields, username clash, email clash, then
/// entity validation. A taken username is reported as a conflict even when
/// other fields are also invalid.
pub async fn register(
    users: &dyn UserRepository,
    signer: &TokenSigner,
    password_cost: u32,
    request: RegisterRequest,
) -> Result<IssuedToken, AppError> {
    let registration = request.into_registration()?;

    if users.find_by_username(&registration.username).await?.is_some() {
        return Err(AppError::Conflict("Username already taken".into()));
    }
    if users.find_by_email(&registration.email).await?.is_some() {
        return Err(AppError::Conflict("Email already exists".into()));
    }

    registration.validate()?;

    let password_hash = hash_password(&registration.password, password_cost).await?;
    let user = users
        .insert(NewUser {
            username: registration.username,
            email: registration.email,
            password_hash,
            first_name: registration.first_name,
            last_name: registration.last_name,
            roles: vec![ROLE_USER.to_string()],
            created_at: datetime::now(),
        })
        .await?;

    log::info!("Registered user {} ({})", user.id, user.username);
    signer.issue(&user)
}

/// Resolves a username/password pair to a user, or `None` when nothing
/// matches. Unknown users and wrong passwords are indistinguishable.
pub async fn verify_credentials(
    users: &dyn UserRepository,
    credentials: &LoginRequest,
) -> Result<Option<User>, AppError> {
    let Some(user) = users.find_by_username(&credentials.username).await? else {
        return Ok(None);
    };
    if verify_password(&credentials.password, &user.password_hash).await {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

/// Authenticates, stamps the login time and issues a token.
pub async fn login(
    users: &dyn UserRepository,
    signer: &TokenSigner,
    credentials: LoginRequest,
) -> Result<IssuedToken, AppError> {
    let Some(user) = verify_credentials(users, &credentials).await? else {
        log::warn!("Failed login attempt for {}", credentials.username);
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };

    let user = users.touch(user.id, datetime::now()).await?;
    log::info!("User {} logged in", user.id);
    signer.issue(&user)
}

/// Loads the caller's own record. A token whose user no longer exists is
/// treated as unauthenticated.
pub async fn profile(users: &dyn UserRepository, user_id: i64) -> Result<User, AppError> {
    users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Access denied".into()))
}
