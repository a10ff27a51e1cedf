use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::{
        products::ProductList,
        stores::{CreateStoreRequest, StoreDetail, StoreList, UpdateStoreRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Store,
    response::ApiResponse,
    services::store_service,
};

pub fn router() -> Router<DbPool> {
    Router::new()
        .route("/", get(list_stores))
        .route("/", post(create_store))
        .route("/{id}", get(get_store))
        .route("/{id}", put(update_store))
        .route("/{id}", delete(delete_store))
        .route("/{id}/products", get(list_store_products))
}

#[utoipa::path(
    get,
    path = "/api/stores",
    responses(
        (status = 200, description = "Open stores", body = ApiResponse<StoreList>)
    ),
    tag = "Stores"
)]
pub async fn list_stores(State(pool): State<DbPool>) -> AppResult<Json<ApiResponse<StoreList>>> {
    let resp = store_service::list_stores(&pool).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/stores/{id}",
    params(("id" = Uuid, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Store detail", body = ApiResponse<StoreDetail>),
        (status = 404, description = "Store not found")
    ),
    tag = "Stores"
)]
pub async fn get_store(
    State(pool): State<DbPool>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<StoreDetail>>> {
    let resp = store_service::get_store(&pool, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/stores/{id}/products",
    params(("id" = Uuid, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Available products of the store", body = ApiResponse<ProductList>)
    ),
    tag = "Stores"
)]
pub async fn list_store_products(
    State(pool): State<DbPool>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = store_service::list_store_products(&pool, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/stores",
    request_body = CreateStoreRequest,
    responses(
        (status = 201, description = "Store created", body = ApiResponse<Store>),
        (status = 403, description = "Not a vendor")
    ),
    tag = "Stores"
)]
pub async fn create_store(
    State(pool): State<DbPool>,
    user: AuthUser,
    Json(payload): Json<CreateStoreRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Store>>)> {
    let resp = store_service::create_store(&pool, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/stores/{id}",
    params(("id" = Uuid, Path, description = "Store ID")),
    request_body = UpdateStoreRequest,
    responses(
        (status = 200, description = "Store updated", body = ApiResponse<Store>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Store not found")
    ),
    tag = "Stores"
)]
pub async fn update_store(
    State(pool): State<DbPool>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStoreRequest>,
) -> AppResult<Json<ApiResponse<Store>>> {
    let resp = store_service::update_store(&pool, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/stores/{id}",
    params(("id" = Uuid, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Store deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Store not found")
    ),
    tag = "Stores"
)]
pub async fn delete_store(
    State(pool): State<DbPool>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = store_service::delete_store(&pool, &user, id).await?;
    Ok(Json(resp))
}
