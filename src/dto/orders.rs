use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::{ProductSummary, StoreSummary, UserSummary};
use crate::models::Order;

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Note the absence of any price field: line prices always come from the
/// catalog at creation time.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub store_id: Uuid,
    pub items: Vec<OrderItemRequest>,
    pub delivery_address: String,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemDetail {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderDetail>,
}
