use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dto::UserSummary;
use crate::models::Store;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStoreRequest {
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub phone: String,
    pub email: Option<String>,
    pub store_type: String,
    pub gst_number: Option<String>,
    pub delivery_time: Option<String>,
    pub delivery_radius: Option<f64>,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image: Option<String>,
}

/// Explicit patch: only these fields may change on update, and only when
/// present in the payload.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateStoreRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub store_type: Option<String>,
    pub gst_number: Option<String>,
    pub delivery_time: Option<String>,
    pub delivery_radius: Option<f64>,
    pub is_open: Option<bool>,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image: Option<String>,
}

impl UpdateStoreRequest {
    /// Merge the patch over an existing store, leaving absent fields alone.
    pub fn apply(self, mut store: Store) -> Store {
        if let Some(name) = self.name {
            store.name = name;
        }
        if let Some(description) = self.description {
            store.description = description;
        }
        if let Some(address) = self.address {
            store.address = address;
        }
        if let Some(phone) = self.phone {
            store.phone = phone;
        }
        if let Some(email) = self.email {
            store.email = email;
        }
        if let Some(store_type) = self.store_type {
            store.store_type = store_type;
        }
        if let Some(gst_number) = self.gst_number {
            store.gst_number = gst_number;
        }
        if let Some(delivery_time) = self.delivery_time {
            store.delivery_time = delivery_time;
        }
        if let Some(delivery_radius) = self.delivery_radius {
            store.delivery_radius = delivery_radius;
        }
        if let Some(is_open) = self.is_open {
            store.is_open = is_open;
        }
        if let Some(opening_time) = self.opening_time {
            store.opening_time = opening_time;
        }
        if let Some(closing_time) = self.closing_time {
            store.closing_time = closing_time;
        }
        if let Some(latitude) = self.latitude {
            store.latitude = Some(latitude);
        }
        if let Some(longitude) = self.longitude {
            store.longitude = Some(longitude);
        }
        if let Some(image) = self.image {
            store.image = image;
        }
        store
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreDetail {
    #[serde(flatten)]
    pub store: Store,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreList {
    pub items: Vec<StoreDetail>,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn base_store() -> Store {
        Store {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Gupta General".into(),
            description: String::new(),
            address: "7 Station Road".into(),
            phone: "8888888888".into(),
            email: String::new(),
            store_type: "general".into(),
            gst_number: String::new(),
            rating: 4.2,
            delivery_time: "15-30 min".into(),
            delivery_radius: 5.0,
            is_open: true,
            opening_time: "08:00".into(),
            closing_time: "22:00".into(),
            latitude: None,
            longitude: None,
            image: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let store = base_store();
        let id = store.id;
        let owner_id = store.owner_id;

        let patch = UpdateStoreRequest {
            name: Some("Gupta Superstore".into()),
            is_open: Some(false),
            ..Default::default()
        };
        let merged = patch.apply(store);

        assert_eq!(merged.name, "Gupta Superstore");
        assert!(!merged.is_open);
        assert_eq!(merged.address, "7 Station Road");
        assert_eq!(merged.id, id);
        assert_eq!(merged.owner_id, owner_id);
        assert_eq!(merged.rating, 4.2);
    }
}
