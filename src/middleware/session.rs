//! Session layer configuration.
//!
//! Visitors are tracked with a cookie-identified session stored in Postgres. The session
//! carries the cart, the applied coupon and the login binding.

use sqlx::PgPool;
use tower_sessions::{
    Expiry, SessionManagerLayer, SessionStore,
    cookie::{SameSite, time::Duration},
};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AppConfig;

pub const SESSION_COOKIE_NAME: &str = "shop_session";

/// 14 days of inactivity.
const SESSION_EXPIRY_SECONDS: i64 = 14 * 24 * 60 * 60;

/// Postgres-backed session store. Call `migrate()` on it before serving.
pub fn create_session_store(pool: &PgPool) -> PostgresStore {
    PostgresStore::new(pool.clone())
}

pub fn create_session_layer<S: SessionStore + Clone>(
    store: S,
    config: &AppConfig,
) -> SessionManagerLayer<S> {
    let is_secure = config.gateway.callback_url.starts_with("https://");
    session_layer(store, is_secure)
}

pub fn session_layer<S: SessionStore + Clone>(store: S, secure: bool) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(SESSION_EXPIRY_SECONDS)))
        .with_secure(secure)
        // Lax so the cookie survives the top-level redirect back from the gateway.
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
