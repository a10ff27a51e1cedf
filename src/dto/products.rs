use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dto::StoreSummary;
use crate::models::Product;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub category: String,
    pub image: Option<String>,
    pub stock: Option<i32>,
    pub unit: Option<String>,
    pub is_available: Option<bool>,
}

/// Explicit patch for product updates.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub stock: Option<i32>,
    pub unit: Option<String>,
    pub is_available: Option<bool>,
}

impl UpdateProductRequest {
    pub fn apply(self, mut product: Product) -> Product {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(image) = self.image {
            product.image = image;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(unit) = self.unit {
            product.unit = unit;
        }
        if let Some(is_available) = self.is_available {
            product.is_available = is_available;
        }
        product
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<ProductDetail>,
}
