use chrono::{Duration, Utc};
use course_shop_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, sync_schema},
    entity::{
        coupons::{ActiveModel as CouponActive, Column as CouponCol, Entity as Coupons},
        courses::{ActiveModel as CourseActive, Column as CourseCol, Entity as Courses},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    services::auth_service::hash_password,
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, sea_query::OnConflict,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, 1).await?;
    let orm = create_orm_conn(pool);
    sync_schema(&orm).await?;

    let admin_id = ensure_user(&orm, "admin@example.com", "admin1234", "admin").await?;
    let user_id = ensure_user(&orm, "user@example.com", "user1234", "user").await?;
    seed_courses(&orm).await?;
    seed_products(&orm).await?;
    seed_coupon(&orm).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    Users::insert(UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        role: Set(role.to_string()),
        created_at: Set(Utc::now().into()),
    })
    .on_conflict(
        OnConflict::column(UserCol::Email)
            .update_column(UserCol::Role)
            .to_owned(),
    )
    .exec_without_returning(orm)
    .await?;

    let user = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user {email} missing after upsert"))?;

    println!("Ensured user {email} (role={role})");
    Ok(user.id)
}

async fn seed_courses(orm: &DatabaseConnection) -> anyhow::Result<()> {
    let courses = [
        ("Rust Fundamentals", "rust-fundamentals", "Ownership, borrowing and the type system", 199_000),
        ("Async Rust in Practice", "async-rust", "Tokio, futures and structured concurrency", 349_000),
        ("Building APIs with Axum", "axum-apis", "Routing, extractors and middleware", 279_000),
    ];

    let now = Utc::now();
    for (title, slug, description, price) in courses {
        Courses::insert(CourseActive {
            id: Set(Uuid::new_v4()),
            title: Set(title.to_string()),
            slug: Set(slug.to_string()),
            description: Set(description.to_string()),
            price: Set(price),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        })
        .on_conflict(OnConflict::column(CourseCol::Slug).do_nothing().to_owned())
        .exec_without_returning(orm)
        .await?;
    }

    println!("Seeded courses");
    Ok(())
}

async fn seed_products(orm: &DatabaseConnection) -> anyhow::Result<()> {
    let products = [
        ("Ferris Mug", "ferris-mug", "Coffee tastes better with Ferris", 120_000, Some(99_000), false, 100),
        ("Rust Sticker Pack", "sticker-pack", "Decorate your laptop", 50_000, None, false, 200),
        ("Cheat Sheet PDF", "cheat-sheet", "Printable syntax reference", 30_000, None, true, 1_000),
    ];

    let now = Utc::now();
    for (title, slug, description, price, discounted_price, is_free, stock) in products {
        Products::insert(ProductActive {
            id: Set(Uuid::new_v4()),
            title: Set(title.to_string()),
            slug: Set(slug.to_string()),
            description: Set(description.to_string()),
            price: Set(price),
            discounted_price: Set(discounted_price),
            is_free: Set(is_free),
            stock: Set(stock),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        })
        .on_conflict(OnConflict::column(ProdCol::Slug).do_nothing().to_owned())
        .exec_without_returning(orm)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}

async fn seed_coupon(orm: &DatabaseConnection) -> anyhow::Result<()> {
    let now = Utc::now();
    Coupons::insert(CouponActive {
        id: Set(Uuid::new_v4()),
        code: Set("SAVE10".to_string()),
        discount_percent: Set(10),
        discount_amount: Set(0),
        max_usage: Set(5),
        current_usage: Set(0),
        min_purchase_amount: Set(100_000),
        is_active: Set(true),
        valid_from: Set(now.into()),
        valid_to: Set((now + Duration::days(30)).into()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    })
    .on_conflict(OnConflict::column(CouponCol::Code).do_nothing().to_owned())
    .exec_without_returning(orm)
    .await?;

    println!("Seeded coupon SAVE10");
    Ok(())
}
