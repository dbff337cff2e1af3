mod common;

use common::{create_course, setup_db};
use course_shop_api::{
    dto::auth::{LoginRequest, RegisterRequest},
    error::AppError,
    models::ItemRef,
    services::{auth_service, cart_service},
    session::SessionCart,
};

const SECRET: &str = "test-secret";

fn register(email: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.into(),
        password: password.into(),
    }
}

fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.into(),
        password: password.into(),
    }
}

#[tokio::test]
async fn register_normalises_email_and_rejects_duplicates() -> anyhow::Result<()> {
    let db = setup_db().await?;

    let created = auth_service::register_user(&db, register(" Sara@Example.com ", "secret123")).await?;
    let user = created.data.expect("user");
    assert_eq!(user.email, "sara@example.com");
    assert_eq!(user.role, "user");

    let duplicate = auth_service::register_user(&db, register("sara@example.com", "secret123")).await;
    assert!(matches!(duplicate, Err(AppError::BadRequest(_))));

    let short = auth_service::register_user(&db, register("other@example.com", "short")).await;
    assert!(matches!(short, Err(AppError::BadRequest(_))));
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_rejected() -> anyhow::Result<()> {
    let db = setup_db().await?;
    auth_service::register_user(&db, register("sara@example.com", "secret123")).await?;

    let mut cart = SessionCart::default();
    let result =
        auth_service::login_user(&db, &mut cart, login("sara@example.com", "wrong-pass"), SECRET).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
    Ok(())
}

#[tokio::test]
async fn login_merges_the_guest_cart_with_the_saved_one() -> anyhow::Result<()> {
    let db = setup_db().await?;
    let created = auth_service::register_user(&db, register("sara@example.com", "secret123")).await?;
    let user_id = created.data.expect("user").id;

    let saved = ItemRef::course(create_course(&db, 100_000).await?.id);
    let guest = ItemRef::course(create_course(&db, 150_000).await?.id);
    cart_service::sync_durable_cart(&db, &SessionCart::from_items([saved]), user_id).await?;

    let mut cart = SessionCart::from_items([guest]);
    let outcome =
        auth_service::login_user(&db, &mut cart, login("SARA@example.com", "secret123"), SECRET).await?;

    assert!(outcome.dirty);
    assert!(outcome.value.response.token.starts_with("Bearer "));
    assert_eq!(outcome.value.response.cart_quantity, 2);
    assert_eq!(outcome.value.user.user_id, user_id);
    assert!(cart.contains(&saved) && cart.contains(&guest));
    assert_eq!(cart_service::durable_items(&db, user_id).await?.len(), 2);
    Ok(())
}
