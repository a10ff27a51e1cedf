use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub store_id: Option<Uuid>,
}
