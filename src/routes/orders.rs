use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::orders::{CreateOrderRequest, OrderDetail, OrderList, UpdateOrderStatusRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::order_service,
};

pub fn router() -> Router<DbPool> {
    Router::new()
        .route("/", post(create_order))
        .route("/customer", get(list_customer_orders))
        .route("/vendor", get(list_vendor_orders))
        .route("/{id}", get(get_order))
        .route("/{id}/status", put(update_order_status))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<OrderDetail>),
        (status = 400, description = "Validation failure or unavailable product"),
        (status = 403, description = "Not a customer"),
        (status = 404, description = "Referenced product not found")
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(pool): State<DbPool>,
    user: AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderDetail>>)> {
    let resp = order_service::create_order(&pool, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/orders/customer",
    responses(
        (status = 200, description = "Orders placed by the caller, newest first", body = ApiResponse<OrderList>)
    ),
    tag = "Orders"
)]
pub async fn list_customer_orders(
    State(pool): State<DbPool>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_customer_orders(&pool, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/vendor",
    responses(
        (status = 200, description = "Orders against the caller's store, newest first", body = ApiResponse<OrderList>),
        (status = 403, description = "Not a vendor"),
        (status = 404, description = "Vendor has no store")
    ),
    tag = "Orders"
)]
pub async fn list_vendor_orders(
    State(pool): State<DbPool>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_vendor_orders(&pool, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order detail", body = ApiResponse<OrderDetail>),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Order not found")
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(pool): State<DbPool>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let resp = order_service::get_order(&pool, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = ApiResponse<OrderDetail>),
        (status = 400, description = "Status outside the enumerated set"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Order not found")
    ),
    tag = "Orders"
)]
pub async fn update_order_status(
    State(pool): State<DbPool>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let resp = order_service::update_status(&pool, &user, id, payload).await?;
    Ok(Json(resp))
}
