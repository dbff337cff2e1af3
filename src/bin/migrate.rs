use course_shop_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, sync_schema},
    middleware::session::create_session_store,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url, 1).await?;

    create_session_store(&pool).migrate().await?;
    let orm = create_orm_conn(pool);
    sync_schema(&orm).await?;

    println!("Schema applied");
    Ok(())
}
