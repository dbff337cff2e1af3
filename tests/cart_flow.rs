mod common;

use common::{create_course, create_product, create_user, setup_db};
use course_shop_api::{
    entity::{courses::ActiveModel as CourseActive, products::ActiveModel as ProductActive},
    error::AppError,
    models::ItemRef,
    services::cart_service,
    session::SessionCart,
};
use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};
use uuid::Uuid;

#[tokio::test]
async fn adding_the_same_item_twice_keeps_one_entry() -> anyhow::Result<()> {
    let db = setup_db().await?;
    let course = create_course(&db, 199_000).await?;
    let mut cart = SessionCart::default();

    let first = cart_service::add_item(&db, &mut cart, ItemRef::course(course.id)).await?;
    let second = cart_service::add_item(&db, &mut cart, ItemRef::course(course.id)).await?;

    assert!(first.value && first.dirty);
    assert!(!second.value && !second.dirty);
    assert_eq!(cart.len(), 1);
    Ok(())
}

#[tokio::test]
async fn unknown_or_unavailable_items_are_rejected() -> anyhow::Result<()> {
    let db = setup_db().await?;
    let sold_out = create_product(&db, 50_000, None, 0).await?;
    let mut cart = SessionCart::default();

    let missing = cart_service::add_item(&db, &mut cart, ItemRef::course(Uuid::new_v4())).await;
    assert!(matches!(missing, Err(AppError::BadRequest(_))));

    let unavailable = cart_service::add_item(&db, &mut cart, ItemRef::product(sold_out.id)).await;
    assert!(matches!(unavailable, Err(AppError::BadRequest(_))));

    assert!(cart.is_empty());
    Ok(())
}

#[tokio::test]
async fn listing_prices_live_and_drops_deactivated_items() -> anyhow::Result<()> {
    let db = setup_db().await?;
    let course = create_course(&db, 199_000).await?;
    let product = create_product(&db, 80_000, Some(60_000), 5).await?;
    let mut cart = SessionCart::default();
    cart_service::add_item(&db, &mut cart, ItemRef::course(course.id)).await?;
    cart_service::add_item(&db, &mut cart, ItemRef::product(product.id)).await?;

    let listed = cart_service::list_items(&db, &mut cart).await?;
    assert_eq!(listed.value.total_quantity, 2);
    assert_eq!(listed.value.total_price, 259_000);
    assert!(!listed.dirty);

    let mut repriced: ProductActive = product.into_active_model();
    repriced.discounted_price = Set(None);
    repriced.update(&db).await?;
    let mut retired: CourseActive = course.into_active_model();
    retired.is_active = Set(false);
    retired.update(&db).await?;

    let listed = cart_service::list_items(&db, &mut cart).await?;
    assert!(listed.dirty);
    assert_eq!(listed.value.total_quantity, 1);
    assert_eq!(listed.value.total_price, 80_000);
    assert_eq!(cart.len(), 1);
    Ok(())
}

#[tokio::test]
async fn remove_and_clear_report_changes() -> anyhow::Result<()> {
    let db = setup_db().await?;
    let course = create_course(&db, 10_000).await?;
    let item = ItemRef::course(course.id);
    let mut cart = SessionCart::from_items([item]);

    assert!(cart_service::remove_item(&mut cart, &item).value);
    assert!(!cart_service::remove_item(&mut cart, &item).value);

    let cleared = cart_service::clear(&mut cart);
    assert!(!cleared.dirty);
    Ok(())
}

#[tokio::test]
async fn reconcile_unions_session_and_durable_carts() -> anyhow::Result<()> {
    let db = setup_db().await?;
    let user = create_user(&db, "user").await?;
    let saved = ItemRef::course(create_course(&db, 100_000).await?.id);
    let fresh = ItemRef::course(create_course(&db, 120_000).await?.id);

    // Left over from an earlier visit on another device.
    cart_service::sync_durable_cart(&db, &SessionCart::from_items([saved]), user.user_id).await?;

    let mut cart = SessionCart::from_items([fresh]);
    let merged = cart_service::reconcile(&db, &mut cart, user.user_id).await?;
    assert_eq!(merged.value, 2);
    assert!(merged.dirty);
    assert!(cart.contains(&saved) && cart.contains(&fresh));

    let mut durable = cart_service::durable_items(&db, user.user_id).await?;
    durable.sort_by_key(|item| item.id);
    let mut session = cart.items().to_vec();
    session.sort_by_key(|item| item.id);
    assert_eq!(durable, session);

    let again = cart_service::reconcile(&db, &mut cart, user.user_id).await?;
    assert_eq!(again.value, 2);
    assert!(!again.dirty);
    assert_eq!(cart_service::durable_items(&db, user.user_id).await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn empty_session_adopts_the_durable_cart() -> anyhow::Result<()> {
    let db = setup_db().await?;
    let user = create_user(&db, "user").await?;
    let saved = ItemRef::course(create_course(&db, 100_000).await?.id);
    cart_service::sync_durable_cart(&db, &SessionCart::from_items([saved]), user.user_id).await?;

    let mut cart = SessionCart::default();
    let merged = cart_service::reconcile(&db, &mut cart, user.user_id).await?;

    assert!(merged.dirty);
    assert_eq!(merged.value, 1);
    assert_eq!(cart.items(), [saved].as_slice());
    assert_eq!(cart_service::durable_items(&db, user.user_id).await?, vec![saved]);
    Ok(())
}

#[tokio::test]
async fn durable_cart_follows_session_writes() -> anyhow::Result<()> {
    let db = setup_db().await?;
    let user = create_user(&db, "user").await?;
    let a = ItemRef::course(create_course(&db, 100_000).await?.id);
    let b = ItemRef::course(create_course(&db, 120_000).await?.id);

    cart_service::sync_durable_cart(&db, &SessionCart::from_items([a, b]), user.user_id).await?;
    assert_eq!(cart_service::durable_items(&db, user.user_id).await?.len(), 2);

    cart_service::sync_durable_cart(&db, &SessionCart::from_items([b]), user.user_id).await?;
    assert_eq!(cart_service::durable_items(&db, user.user_id).await?, vec![b]);

    cart_service::clear_durable_cart(&db, user.user_id).await?;
    assert!(cart_service::durable_items(&db, user.user_id).await?.is_empty());
    Ok(())
}
