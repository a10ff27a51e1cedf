use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

pub mod auth;
pub mod orders;
pub mod products;
pub mod stores;

// Inlined-relation shapes shared across responses.

#[derive(Debug, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreSummary {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub image: String,
}

impl From<&crate::models::User> for UserSummary {
    fn from(user: &crate::models::User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
        }
    }
}

impl From<&crate::models::Store> for StoreSummary {
    fn from(store: &crate::models::Store) -> Self {
        Self {
            id: store.id,
            name: store.name.clone(),
            address: store.address.clone(),
            phone: store.phone.clone(),
        }
    }
}

impl From<&crate::models::Product> for ProductSummary {
    fn from(product: &crate::models::Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
        }
    }
}
