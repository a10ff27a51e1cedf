//! Access control decisions over the customer/vendor/store relationship
//! graph. Every function is pure and total; callers decide how a denial is
//! surfaced (detail lookups reveal existence before checking ownership).

use crate::{
    middleware::auth::AuthUser,
    models::{Order, Role, Store},
};

pub fn can_create_store(user: &AuthUser) -> bool {
    user.role == Role::Vendor
}

pub fn can_mutate_store(user: &AuthUser, store: &Store) -> bool {
    user.role == Role::Vendor && store.owner_id == user.user_id
}

pub fn can_create_product(user: &AuthUser, store: &Store) -> bool {
    can_mutate_store(user, store)
}

pub fn can_place_order(user: &AuthUser) -> bool {
    user.role == Role::Customer
}

/// An order is visible and mutable to its own customer and to the vendor
/// whose store it was placed against. `vendor_store` is the acting vendor's
/// store, if any; customers pass `None`.
pub fn can_view_or_alter_order(user: &AuthUser, order: &Order, vendor_store: Option<&Store>) -> bool {
    match user.role {
        Role::Customer => order.customer_id == user.user_id,
        Role::Vendor => vendor_store.is_some_and(|store| store.id == order.store_id),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn store(owner_id: Uuid) -> Store {
        Store {
            id: Uuid::new_v4(),
            owner_id,
            name: "Sharma Kirana".into(),
            description: String::new(),
            address: "12 MG Road".into(),
            phone: "9999999999".into(),
            email: String::new(),
            store_type: "kirana".into(),
            gst_number: String::new(),
            rating: 0.0,
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

    fn order(customer_id: Uuid, store_id: Uuid) -> Order {
        Order {
            id: Uuid::new_v4(),
            customer_id,
            store_id,
            total_amount: 130,
            delivery_address: "Flat 4B".into(),
            status: "pending".into(),
            payment_status: "pending".into(),
            payment_method: "cash".into(),
            delivery_time: "15-30 min".into(),
            notes: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn identity(role: Role) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn only_vendors_create_stores_and_only_customers_place_orders() {
        assert!(can_create_store(&identity(Role::Vendor)));
        assert!(!can_create_store(&identity(Role::Customer)));
        assert!(can_place_order(&identity(Role::Customer)));
        assert!(!can_place_order(&identity(Role::Vendor)));
    }

    #[test]
    fn store_mutation_requires_ownership() {
        let vendor = identity(Role::Vendor);
        let own = store(vendor.user_id);
        let other = store(Uuid::new_v4());

        assert!(can_mutate_store(&vendor, &own));
        assert!(!can_mutate_store(&vendor, &other));
        // A customer never mutates a store, even a hypothetical one they "own".
        let customer = identity(Role::Customer);
        let odd = store(customer.user_id);
        assert!(!can_mutate_store(&customer, &odd));
    }

    #[test]
    fn order_access_is_symmetric_between_customer_and_owning_vendor() {
        let customer = identity(Role::Customer);
        let vendor = identity(Role::Vendor);
        let vendor_store = store(vendor.user_id);
        let placed = order(customer.user_id, vendor_store.id);

        assert!(can_view_or_alter_order(&customer, &placed, None));
        assert!(can_view_or_alter_order(&vendor, &placed, Some(&vendor_store)));
    }

    #[test]
    fn order_access_denies_everyone_else() {
        let customer = identity(Role::Customer);
        let vendor = identity(Role::Vendor);
        let vendor_store = store(vendor.user_id);
        let placed = order(customer.user_id, vendor_store.id);

        let other_customer = identity(Role::Customer);
        assert!(!can_view_or_alter_order(&other_customer, &placed, None));

        let other_vendor = identity(Role::Vendor);
        let other_store = store(other_vendor.user_id);
        assert!(!can_view_or_alter_order(&other_vendor, &placed, Some(&other_store)));

        // Vendor with no store at all.
        assert!(!can_view_or_alter_order(&other_vendor, &placed, None));
    }
}
