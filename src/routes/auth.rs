use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use tower_sessions::Session;

use crate::{
    dto::auth::{LoginRequest, LoginResponse, RegisterRequest},
    error::AppResult,
    middleware::auth::jwt_secret,
    models::User,
    response::{ApiResponse, Meta},
    services::auth_service::{login_user, register_user},
    session,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Register user", body = ApiResponse<User>),
        (status = 400, description = "Invalid input or email taken")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let resp = register_user(&state.orm, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user and merge carts", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let secret = jwt_secret()?;
    let mut cart = session::load_cart(&session).await?;
    let outcome = login_user(&state.orm, &mut cart, payload, &secret).await?;

    // New session id on privilege change; the data moves with it.
    session.cycle_id().await?;
    session::bind_user(&session, &outcome.value.user).await?;
    if outcome.dirty {
        session::store_cart(&session, &cart).await?;
    }

    Ok(Json(ApiResponse::success(
        "Logged in",
        outcome.value.response,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session binding and session cart dropped")
    ),
    tag = "Auth"
)]
pub async fn logout(session: Session) -> AppResult<Json<ApiResponse<()>>> {
    session::unbind_user(&session).await?;
    session::store_cart(&session, &Default::default()).await?;
    session::clear_coupon(&session).await?;
    Ok(Json(ApiResponse::message("Logged out")))
}
