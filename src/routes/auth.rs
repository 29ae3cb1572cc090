use crate::{
    auth::{AuthResponse, Caller, LoginRequest, ProfileResponse, RegisterRequest},
    error::AppError,
    models::UserView,
    services,
    state::AppState,
};
use actix_web::{get, post, web, HttpResponse, Responder};

/// Register a new user
///
/// Creates the account and returns it together with a fresh token.
///
/// ## Responses:
/// - `201 Created`: `{message, user, token}`.
/// - `400 Bad Request`: Missing fields or entity validation failures (with `details`).
/// - `409 Conflict`: Username or email already in use.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let issued = services::auth::register(
        &*state.users,
        &state.tokens,
        state.password_cost,
        register_data.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Created().json(AuthResponse::new("User created successfully", issued)))
}

/// Login user
///
/// Exchanges a username and password for a token.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let issued = services::auth::login(&*state.users, &state.tokens, login_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(AuthResponse::new("Login successful", issued)))
}

#[get("/profile")]
pub async fn profile(state: web::Data<AppState>, caller: Caller) -> Result<impl Responder, AppError> {
    let user = services::auth::profile(&*state.users, caller.id).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse {
        user: UserView::from(&user),
    }))
}
