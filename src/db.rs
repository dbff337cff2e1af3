use std::time::Duration;

use anyhow::Result;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, EntityTrait, Schema, SqlxPostgresConnector,
    sea_query::{Index, IndexCreateStatement},
};
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::entity::{
    AuditLogs, CartItems, Carts, Coupons, Courses, Enrollments, OrderItems, Orders, Products,
    Users, cart_items, enrollments, order_items,
};

/// Create the Postgres pool shared by the ORM and the session store.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Wrap an existing pool in a SeaORM connection.
pub fn create_orm_conn(pool: PgPool) -> DatabaseConnection {
    SqlxPostgresConnector::from_sqlx_postgres_pool(pool)
}

/// Create every table and index the service needs if it is missing.
///
/// The schema is derived from the entities, so the same call works for Postgres
/// and for the in-memory SQLite databases used by the test suite.
pub async fn sync_schema(conn: &DatabaseConnection) -> Result<()> {
    // Parents before children so foreign keys resolve.
    create_table(conn, Users).await?;
    create_table(conn, Courses).await?;
    create_table(conn, Products).await?;
    create_table(conn, Coupons).await?;
    create_table(conn, Carts).await?;
    create_table(conn, CartItems).await?;
    create_table(conn, Orders).await?;
    create_table(conn, OrderItems).await?;
    create_table(conn, Enrollments).await?;
    create_table(conn, AuditLogs).await?;

    let backend = conn.get_database_backend();
    let schema = Schema::new(backend);
    for mut index in schema.create_index_from_entity(Orders) {
        let stmt = index.if_not_exists().to_owned();
        conn.execute(backend.build(&stmt)).await?;
    }

    for index in unique_indexes() {
        conn.execute(backend.build(&index)).await?;
    }

    Ok(())
}

async fn create_table<E: EntityTrait>(conn: &DatabaseConnection, entity: E) -> Result<()> {
    let backend = conn.get_database_backend();
    let stmt = Schema::new(backend)
        .create_table_from_entity(entity)
        .if_not_exists()
        .to_owned();
    conn.execute(backend.build(&stmt)).await?;
    Ok(())
}

fn unique_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("ux_cart_items_cart_item")
            .table(CartItems)
            .col(cart_items::Column::CartId)
            .col(cart_items::Column::ItemKind)
            .col(cart_items::Column::ItemId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("ux_order_items_order_item")
            .table(OrderItems)
            .col(order_items::Column::OrderId)
            .col(order_items::Column::ItemKind)
            .col(order_items::Column::ItemId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("ux_enrollments_user_course")
            .table(Enrollments)
            .col(enrollments::Column::UserId)
            .col(enrollments::Column::CourseId)
            .unique()
            .if_not_exists()
            .to_owned(),
    ]
}
