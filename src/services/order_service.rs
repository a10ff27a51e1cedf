use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    catalog,
    db::DbPool,
    dto::{
        ProductSummary, StoreSummary, UserSummary,
        orders::{
            CreateOrderRequest, OrderDetail, OrderItemDetail, OrderList, UpdateOrderStatusRequest,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem, OrderStatus, PaymentMethod, Role},
    policy,
    response::ApiResponse,
};

/// Create an order from a cart of product references. Every line is re-priced
/// from the live catalog inside one transaction; a missing or unavailable
/// product aborts the whole request with nothing persisted. Stock is
/// informational and never decremented here.
pub async fn create_order(
    pool: &DbPool,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderDetail>> {
    if !policy::can_place_order(user) {
        return Err(AppError::Forbidden);
    }

    let mut errors = HashMap::new();
    if payload.items.is_empty() {
        errors.insert("items".into(), "must not be empty".into());
    }
    if payload.items.iter().any(|item| item.quantity <= 0) {
        errors.insert("quantity".into(), "must be greater than zero".into());
    }
    if payload.delivery_address.trim().is_empty() {
        errors.insert("delivery_address".into(), "is required".into());
    }
    let payment_method = match payload.payment_method.as_deref() {
        None => PaymentMethod::Cash,
        Some(raw) => match raw.parse::<PaymentMethod>() {
            Ok(method) => method,
            Err(()) => {
                errors.insert(
                    "payment_method".into(),
                    "must be one of: cash, card, upi, wallet".into(),
                );
                PaymentMethod::Cash
            }
        },
    };
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let mut txn = pool.begin().await?;

    // Re-price every line from the catalog; client-supplied prices do not
    // exist in the request shape at all.
    let mut total_amount: i64 = 0;
    let mut lines: Vec<(Uuid, i32, i64, ProductSummary)> = Vec::with_capacity(payload.items.len());
    for item in &payload.items {
        let product = catalog::find_product(&mut *txn, item.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {}", item.product_id)))?;
        if !product.is_available {
            return Err(AppError::BadRequest(format!(
                "Product {} is not available",
                product.name
            )));
        }
        total_amount += product.price * i64::from(item.quantity);
        lines.push((
            product.id,
            item.quantity,
            product.price,
            ProductSummary::from(&product),
        ));
    }

    let order: Order = sqlx::query_as(
        r#"
        INSERT INTO orders (
            id, customer_id, store_id, total_amount, delivery_address, status,
            payment_status, payment_method, delivery_time, notes
        )
        VALUES ($1, $2, $3, $4, $5, 'pending', 'pending', $6, '15-30 min', $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(payload.store_id)
    .bind(total_amount)
    .bind(payload.delivery_address.as_str())
    .bind(payment_method.as_str())
    .bind(payload.notes.unwrap_or_default())
    .fetch_one(&mut *txn)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for (product_id, quantity, price, product) in lines {
        sqlx::query(
            r#"
            INSERT INTO order_items (id, order_id, product_id, quantity, price)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order.id)
        .bind(product_id)
        .bind(quantity)
        .bind(price)
        .execute(&mut *txn)
        .await?;

        items.push(OrderItemDetail {
            product_id,
            quantity,
            price,
            product: Some(product),
        });
    }

    txn.commit().await?;
    tracing::info!(
        order_id = %order.id,
        customer_id = %user.user_id,
        total_amount,
        "order created"
    );

    let customer = catalog::find_user(pool, order.customer_id)
        .await?
        .as_ref()
        .map(UserSummary::from);
    let store = catalog::find_store(pool, order.store_id)
        .await?
        .as_ref()
        .map(StoreSummary::from);

    Ok(ApiResponse::success(
        "Order placed",
        OrderDetail {
            order,
            items,
            customer,
            store,
        },
    ))
}

/// Apply a status change. Any member of the status set is a legal target
/// from any current status; only set membership is validated.
pub async fn update_status(
    pool: &DbPool,
    user: &AuthUser,
    order_id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<OrderDetail>> {
    let status = payload.status.parse::<OrderStatus>().map_err(|_| {
        AppError::invalid(
            "status",
            format!(
                "must be one of: {}",
                OrderStatus::ALL.map(|s| s.as_str()).join(", ")
            ),
        )
    })?;

    let order = catalog::find_order(pool, order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".into()))?;
    authorize_order_access(pool, user, &order).await?;

    let updated: Order = sqlx::query_as(
        "UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
    )
    .bind(order.id)
    .bind(status.as_str())
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    tracing::info!(order_id = %updated.id, status = %status, "order status updated");

    let detail = order_detail(pool, updated, true).await?;
    Ok(ApiResponse::success(
        "Order status updated",
        detail,
    ))
}

pub async fn get_order(
    pool: &DbPool,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    // Existence is revealed before the ownership check.
    let order = catalog::find_order(pool, order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".into()))?;
    authorize_order_access(pool, user, &order).await?;

    let detail = order_detail(pool, order, true).await?;
    Ok(ApiResponse::success("Order", detail))
}

pub async fn list_customer_orders(
    pool: &DbPool,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderList>> {
    let orders: Vec<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE customer_id = $1 ORDER BY created_at DESC")
            .bind(user.user_id)
            .fetch_all(pool)
            .await?;

    let mut items = Vec::with_capacity(orders.len());
    for order in orders {
        items.push(order_detail(pool, order, true).await?);
    }

    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
    ))
}

pub async fn list_vendor_orders(
    pool: &DbPool,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderList>> {
    if user.role != Role::Vendor {
        return Err(AppError::Forbidden);
    }
    let store = catalog::find_store_by_owner(pool, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store".into()))?;

    let orders: Vec<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE store_id = $1 ORDER BY created_at DESC")
            .bind(store.id)
            .fetch_all(pool)
            .await?;

    let mut items = Vec::with_capacity(orders.len());
    for order in orders {
        items.push(order_detail(pool, order, true).await?);
    }

    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
    ))
}

async fn authorize_order_access(pool: &DbPool, user: &AuthUser, order: &Order) -> AppResult<()> {
    let vendor_store = match user.role {
        Role::Vendor => catalog::find_store_by_owner(pool, user.user_id).await?,
        Role::Customer => None,
    };
    if !policy::can_view_or_alter_order(user, order, vendor_store.as_ref()) {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

async fn order_detail(
    pool: &DbPool,
    order: Order,
    include_relations: bool,
) -> AppResult<OrderDetail> {
    let rows: Vec<OrderItem> =
        sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY created_at")
            .bind(order.id)
            .fetch_all(pool)
            .await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let product = if include_relations {
            catalog::find_product(pool, row.product_id)
                .await?
                .as_ref()
                .map(ProductSummary::from)
        } else {
            None
        };
        items.push(OrderItemDetail {
            product_id: row.product_id,
            quantity: row.quantity,
            price: row.price,
            product,
        });
    }

    let (customer, store) = if include_relations {
        let customer = catalog::find_user(pool, order.customer_id)
            .await?
            .as_ref()
            .map(UserSummary::from);
        let store = catalog::find_store(pool, order.store_id)
            .await?
            .as_ref()
            .map(StoreSummary::from);
        (customer, store)
    } else {
        (None, None)
    };

    Ok(OrderDetail {
        order,
        items,
        customer,
        store,
    })
}
