mod common;

use common::{create_user, setup_db};
use course_shop_api::{
    dto::catalog::{CreateCourseRequest, CreateProductRequest, UpdateCourseRequest, UpdateProductRequest},
    error::AppError,
    routes::params::CatalogQuery,
    services::catalog_service,
};

fn course_request(title: &str, slug: &str, price: i64) -> CreateCourseRequest {
    CreateCourseRequest {
        title: title.into(),
        slug: slug.into(),
        description: String::new(),
        price,
        is_active: None,
    }
}

#[tokio::test]
async fn only_admins_manage_the_catalog() -> anyhow::Result<()> {
    let db = setup_db().await?;
    let user = create_user(&db, "user").await?;

    let result =
        catalog_service::create_course(&db, &user, course_request("Rust", "rust", 100_000)).await;
    assert!(matches!(result, Err(AppError::Forbidden)));
    Ok(())
}

#[tokio::test]
async fn slugs_are_unique_and_inactive_courses_are_hidden() -> anyhow::Result<()> {
    let db = setup_db().await?;
    let admin = create_user(&db, "admin").await?;

    let rust = catalog_service::create_course(&db, &admin, course_request("Rust Basics", "rust-basics", 100_000))
        .await?
        .data
        .expect("course");
    catalog_service::create_course(&db, &admin, course_request("Go Basics", "go-basics", 90_000)).await?;

    let taken =
        catalog_service::create_course(&db, &admin, course_request("Again", "rust-basics", 1)).await;
    assert!(matches!(taken, Err(AppError::BadRequest(_))));

    let found = catalog_service::list_courses(
        &db,
        CatalogQuery {
            q: Some("Rust".into()),
            ..CatalogQuery::default()
        },
    )
    .await?;
    let items = found.data.expect("courses").items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, rust.id);

    catalog_service::update_course(
        &db,
        &admin,
        rust.id,
        UpdateCourseRequest {
            title: None,
            description: None,
            price: None,
            is_active: Some(false),
        },
    )
    .await?;

    let hidden = catalog_service::get_course(&db, rust.id).await;
    assert!(matches!(hidden, Err(AppError::NotFound)));
    let listed = catalog_service::list_courses(&db, CatalogQuery::default()).await?;
    assert_eq!(listed.data.expect("courses").items.len(), 1);
    Ok(())
}

#[tokio::test]
async fn product_discount_can_be_removed() -> anyhow::Result<()> {
    let db = setup_db().await?;
    let admin = create_user(&db, "admin").await?;

    let product = catalog_service::create_product(
        &db,
        &admin,
        CreateProductRequest {
            title: "Notebook".into(),
            slug: "notebook".into(),
            description: String::new(),
            price: 80_000,
            discounted_price: Some(60_000),
            is_free: None,
            stock: 3,
            is_active: None,
        },
    )
    .await?
    .data
    .expect("product");
    assert_eq!(product.final_price, 60_000);

    let updated = catalog_service::update_product(
        &db,
        &admin,
        product.id,
        UpdateProductRequest {
            title: None,
            description: None,
            price: None,
            discounted_price: Some(0),
            is_free: None,
            stock: None,
            is_active: None,
        },
    )
    .await?
    .data
    .expect("product");
    assert_eq!(updated.discounted_price, None);
    assert_eq!(updated.final_price, 80_000);
    Ok(())
}
