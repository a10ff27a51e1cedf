//! Read-only lookups over stores, products, and orders. Absence is `None` or
//! an empty list, never an error; callers decide what missing means.
//!
//! Functions take any Postgres executor so the same reads work against the
//! pool and inside a transaction.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::{Order, Product, Store, User};

pub async fn find_product<'e>(db: impl PgExecutor<'e>, id: Uuid) -> sqlx::Result<Option<Product>> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_store<'e>(db: impl PgExecutor<'e>, id: Uuid) -> sqlx::Result<Option<Store>> {
    sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_store_by_owner<'e>(
    db: impl PgExecutor<'e>,
    owner_id: Uuid,
) -> sqlx::Result<Option<Store>> {
    sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE owner_id = $1")
        .bind(owner_id)
        .fetch_optional(db)
        .await
}

pub async fn find_order<'e>(db: impl PgExecutor<'e>, id: Uuid) -> sqlx::Result<Option<Order>> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_user<'e>(db: impl PgExecutor<'e>, id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn list_products_by_store<'e>(
    db: impl PgExecutor<'e>,
    store_id: Uuid,
    available_only: bool,
) -> sqlx::Result<Vec<Product>> {
    if available_only {
        sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE store_id = $1 AND is_available = TRUE ORDER BY created_at",
        )
        .bind(store_id)
        .fetch_all(db)
        .await
    } else {
        sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE store_id = $1 ORDER BY created_at",
        )
        .bind(store_id)
        .fetch_all(db)
        .await
    }
}
