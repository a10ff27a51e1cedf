use axum::Router;

use crate::db::DbPool;

pub mod auth;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod products;
pub mod stores;

// Build the API router without binding state; it is provided at the top level.
pub fn create_api_router() -> Router<DbPool> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/stores", stores::router())
        .nest("/products", products::router())
        .nest("/orders", orders::router())
}
