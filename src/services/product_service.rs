use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    catalog,
    db::DbPool,
    dto::{
        StoreSummary,
        products::{CreateProductRequest, ProductDetail, ProductList, UpdateProductRequest},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{PRODUCT_CATEGORIES, Product, Role},
    policy,
    response::ApiResponse,
    routes::params::ProductListQuery,
};

/// Public listing: available products only, optionally filtered by category
/// and store, store summary inlined.
pub async fn list_products(
    pool: &DbPool,
    query: ProductListQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let products: Vec<Product> = match (query.category.as_deref(), query.store_id) {
        (Some(category), Some(store_id)) => sqlx::query_as(
            "SELECT * FROM products WHERE is_available = TRUE AND category = $1 AND store_id = $2",
        )
        .bind(category)
        .bind(store_id)
        .fetch_all(pool)
        .await?,
        (Some(category), None) => {
            sqlx::query_as("SELECT * FROM products WHERE is_available = TRUE AND category = $1")
                .bind(category)
                .fetch_all(pool)
                .await?
        }
        (None, Some(store_id)) => {
            sqlx::query_as("SELECT * FROM products WHERE is_available = TRUE AND store_id = $1")
                .bind(store_id)
                .fetch_all(pool)
                .await?
        }
        (None, None) => {
            sqlx::query_as("SELECT * FROM products WHERE is_available = TRUE")
                .fetch_all(pool)
                .await?
        }
    };

    let mut items = Vec::with_capacity(products.len());
    for product in products {
        let store = catalog::find_store(pool, product.store_id)
            .await?
            .as_ref()
            .map(StoreSummary::from);
        items.push(ProductDetail { product, store });
    }

    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
    ))
}

pub async fn get_product(pool: &DbPool, id: Uuid) -> AppResult<ApiResponse<ProductDetail>> {
    let product = catalog::find_product(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".into()))?;
    let store = catalog::find_store(pool, product.store_id)
        .await?
        .as_ref()
        .map(StoreSummary::from);

    Ok(ApiResponse::success(
        "Product",
        ProductDetail { product, store },
    ))
}

pub async fn create_product(
    pool: &DbPool,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    if user.role != Role::Vendor {
        return Err(AppError::Forbidden);
    }
    let store = catalog::find_store_by_owner(pool, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store".into()))?;
    if !policy::can_create_product(user, &store) {
        return Err(AppError::Forbidden);
    }

    let mut errors = HashMap::new();
    if payload.name.is_empty() {
        errors.insert("name".into(), "is required".into());
    }
    if payload.price <= 0 {
        errors.insert("price".into(), "must be greater than zero".into());
    }
    if !PRODUCT_CATEGORIES.contains(&payload.category.as_str()) {
        errors.insert(
            "category".into(),
            format!("must be one of: {}", PRODUCT_CATEGORIES.join(", ")),
        );
    }
    if payload.stock.is_some_and(|stock| stock < 0) {
        errors.insert("stock".into(), "must not be negative".into());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let product: Product = sqlx::query_as(
        r#"
        INSERT INTO products (
            id, store_id, name, description, price, category, image, stock,
            unit, is_available
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(store.id)
    .bind(payload.name)
    .bind(payload.description.unwrap_or_default())
    .bind(payload.price)
    .bind(payload.category)
    .bind(payload.image.unwrap_or_default())
    .bind(payload.stock.unwrap_or(0))
    .bind(payload.unit.unwrap_or_else(|| "piece".into()))
    .bind(payload.is_available.unwrap_or(true))
    .fetch_one(pool)
    .await?;

    tracing::info!(product_id = %product.id, store_id = %store.id, "product created");
    Ok(ApiResponse::success(
        "Product created",
        product,
    ))
}

pub async fn update_product(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
    patch: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    if user.role != Role::Vendor {
        return Err(AppError::Forbidden);
    }
    let product = catalog::find_product(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".into()))?;
    let store = catalog::find_store(pool, product.store_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store".into()))?;
    if !policy::can_mutate_store(user, &store) {
        return Err(AppError::Forbidden);
    }

    let mut errors = HashMap::new();
    if patch.price.is_some_and(|price| price <= 0) {
        errors.insert("price".into(), "must be greater than zero".into());
    }
    if patch.stock.is_some_and(|stock| stock < 0) {
        errors.insert("stock".into(), "must not be negative".into());
    }
    if let Some(category) = patch.category.as_deref()
        && !PRODUCT_CATEGORIES.contains(&category)
    {
        errors.insert(
            "category".into(),
            format!("must be one of: {}", PRODUCT_CATEGORIES.join(", ")),
        );
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let merged = patch.apply(product);
    let updated: Product = sqlx::query_as(
        r#"
        UPDATE products
        SET name = $2, description = $3, price = $4, category = $5, image = $6,
            stock = $7, unit = $8, is_available = $9, updated_at = $10
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(merged.id)
    .bind(merged.name)
    .bind(merged.description)
    .bind(merged.price)
    .bind(merged.category)
    .bind(merged.image)
    .bind(merged.stock)
    .bind(merged.unit)
    .bind(merged.is_available)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(
        "Product updated",
        updated,
    ))
}

pub async fn delete_product(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if user.role != Role::Vendor {
        return Err(AppError::Forbidden);
    }
    let product = catalog::find_product(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".into()))?;
    let store = catalog::find_store(pool, product.store_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store".into()))?;
    if !policy::can_mutate_store(user, &store) {
        return Err(AppError::Forbidden);
    }

    sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(ApiResponse::success(
        "Product deleted successfully",
        serde_json::json!({}),
    ))
}
