use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    catalog,
    db::DbPool,
    dto::{
        UserSummary,
        products::{ProductDetail, ProductList},
        stores::{CreateStoreRequest, StoreDetail, StoreList, UpdateStoreRequest},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{STORE_TYPES, Store},
    policy,
    response::ApiResponse,
};

/// Public listing of open stores, owner inlined.
pub async fn list_stores(pool: &DbPool) -> AppResult<ApiResponse<StoreList>> {
    let stores: Vec<Store> = sqlx::query_as("SELECT * FROM stores WHERE is_open = TRUE")
        .fetch_all(pool)
        .await?;

    let mut items = Vec::with_capacity(stores.len());
    for store in stores {
        let owner = catalog::find_user(pool, store.owner_id)
            .await?
            .as_ref()
            .map(UserSummary::from);
        items.push(StoreDetail { store, owner });
    }

    Ok(ApiResponse::success(
        "Stores",
        StoreList { items },
    ))
}

pub async fn get_store(pool: &DbPool, id: Uuid) -> AppResult<ApiResponse<StoreDetail>> {
    let store = catalog::find_store(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store".into()))?;
    let owner = catalog::find_user(pool, store.owner_id)
        .await?
        .as_ref()
        .map(UserSummary::from);

    Ok(ApiResponse::success(
        "Store",
        StoreDetail { store, owner },
    ))
}

/// Public listing of a store's available products.
pub async fn list_store_products(pool: &DbPool, store_id: Uuid) -> AppResult<ApiResponse<ProductList>> {
    let products = catalog::list_products_by_store(pool, store_id, true).await?;
    let items = products
        .into_iter()
        .map(|product| ProductDetail {
            product,
            store: None,
        })
        .collect();

    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
    ))
}

pub async fn create_store(
    pool: &DbPool,
    user: &AuthUser,
    payload: CreateStoreRequest,
) -> AppResult<ApiResponse<Store>> {
    if !policy::can_create_store(user) {
        return Err(AppError::Forbidden);
    }

    let mut errors = HashMap::new();
    if payload.name.is_empty() {
        errors.insert("name".into(), "is required".into());
    }
    if payload.address.is_empty() {
        errors.insert("address".into(), "is required".into());
    }
    if payload.phone.is_empty() {
        errors.insert("phone".into(), "is required".into());
    }
    if !STORE_TYPES.contains(&payload.store_type.as_str()) {
        errors.insert(
            "store_type".into(),
            format!("must be one of: {}", STORE_TYPES.join(", ")),
        );
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let store: Store = sqlx::query_as(
        r#"
        INSERT INTO stores (
            id, owner_id, name, description, address, phone, email, store_type,
            gst_number, delivery_time, delivery_radius, opening_time,
            closing_time, latitude, longitude, image
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(payload.name)
    .bind(payload.description.unwrap_or_default())
    .bind(payload.address)
    .bind(payload.phone)
    .bind(payload.email.unwrap_or_default())
    .bind(payload.store_type)
    .bind(payload.gst_number.unwrap_or_default())
    .bind(payload.delivery_time.unwrap_or_else(|| "15-30 min".into()))
    .bind(payload.delivery_radius.unwrap_or(5.0))
    .bind(payload.opening_time.unwrap_or_else(|| "08:00".into()))
    .bind(payload.closing_time.unwrap_or_else(|| "22:00".into()))
    .bind(payload.latitude)
    .bind(payload.longitude)
    .bind(payload.image.unwrap_or_default())
    .fetch_one(pool)
    .await?;

    tracing::info!(store_id = %store.id, owner_id = %user.user_id, "store created");
    Ok(ApiResponse::success(
        "Store created",
        store,
    ))
}

pub async fn update_store(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
    patch: UpdateStoreRequest,
) -> AppResult<ApiResponse<Store>> {
    // Existence is revealed before the ownership check.
    let store = catalog::find_store(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store".into()))?;
    if !policy::can_mutate_store(user, &store) {
        return Err(AppError::Forbidden);
    }

    if let Some(store_type) = patch.store_type.as_deref()
        && !STORE_TYPES.contains(&store_type)
    {
        return Err(AppError::invalid(
            "store_type",
            format!("must be one of: {}", STORE_TYPES.join(", ")),
        ));
    }

    let merged = patch.apply(store);
    let updated: Store = sqlx::query_as(
        r#"
        UPDATE stores
        SET name = $2, description = $3, address = $4, phone = $5, email = $6,
            store_type = $7, gst_number = $8, delivery_time = $9,
            delivery_radius = $10, is_open = $11, opening_time = $12,
            closing_time = $13, latitude = $14, longitude = $15, image = $16,
            updated_at = $17
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(merged.id)
    .bind(merged.name)
    .bind(merged.description)
    .bind(merged.address)
    .bind(merged.phone)
    .bind(merged.email)
    .bind(merged.store_type)
    .bind(merged.gst_number)
    .bind(merged.delivery_time)
    .bind(merged.delivery_radius)
    .bind(merged.is_open)
    .bind(merged.opening_time)
    .bind(merged.closing_time)
    .bind(merged.latitude)
    .bind(merged.longitude)
    .bind(merged.image)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(
        "Store updated",
        updated,
    ))
}

/// Hard delete. Products and orders referencing the store are left in place;
/// references are weak throughout.
pub async fn delete_store(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let store = catalog::find_store(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store".into()))?;
    if !policy::can_mutate_store(user, &store) {
        return Err(AppError::Forbidden);
    }

    sqlx::query("DELETE FROM stores WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    tracing::info!(store_id = %id, "store deleted");
    Ok(ApiResponse::success(
        "Store deleted successfully",
        serde_json::json!({}),
    ))
}
