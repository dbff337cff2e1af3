use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, session::AUTH_USER_KEY};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
}

/// Authenticated user if the request carries one, `None` for guests.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

/// HMAC key for bearer tokens, read from `JWT_SECRET` on every use.
pub fn jwt_secret() -> Result<String, AppError> {
    std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))
}

pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, "admin")
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        resolve_user(parts).await?.ok_or(AppError::Unauthorized)
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(resolve_user(parts).await?))
    }
}

// A bearer token wins over the session binding. The session binding is what
// authenticates browser redirects coming back from the payment gateway.
async fn resolve_user(parts: &Parts) -> Result<Option<AuthUser>, AppError> {
    if let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid Authorization header".into()))?;
        return decode_bearer(auth_str).map(Some);
    }

    let Some(session) = parts.extensions.get::<Session>() else {
        return Ok(None);
    };
    Ok(session.get::<AuthUser>(AUTH_USER_KEY).await?)
}

fn decode_bearer(auth_str: &str) -> Result<AuthUser, AppError> {
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(AppError::BadRequest("Invalid Authorization scheme".into()));
    };

    let secret = jwt_secret()?;

    let decoded = decode::<Claims>(
        token.trim(),
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized)?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::BadRequest("Invalid user id in token".into()))?;

    Ok(AuthUser {
        user_id,
        role: decoded.claims.role,
    })
}
