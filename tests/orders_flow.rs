use kirana_api::{
    catalog,
    db::{DbPool, create_pool},
    dto::{
        orders::{CreateOrderRequest, OrderItemRequest, UpdateOrderStatusRequest},
        products::{CreateProductRequest, UpdateProductRequest},
        stores::CreateStoreRequest,
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::Role,
    services::{order_service, product_service, store_service},
};
use uuid::Uuid;

// Full marketplace flow: vendors open stores and list products, a customer
// places orders priced from the catalog, and both sides drive the status.
#[tokio::test]
async fn order_lifecycle_and_authorization_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let pool = setup_pool(&database_url).await?;

    // Seed accounts directly; token mechanics are covered elsewhere.
    let customer = AuthUser {
        user_id: create_user(&pool, "customer", "asha").await?,
        role: Role::Customer,
    };
    let other_customer = AuthUser {
        user_id: create_user(&pool, "customer", "vikram").await?,
        role: Role::Customer,
    };
    let vendor = AuthUser {
        user_id: create_user(&pool, "vendor", "ramesh").await?,
        role: Role::Vendor,
    };
    let other_vendor = AuthUser {
        user_id: create_user(&pool, "vendor", "suresh").await?,
        role: Role::Vendor,
    };

    // A vendor with no store cannot list vendor orders.
    let err = order_service::list_vendor_orders(&pool, &other_vendor)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let store = store_service::create_store(&pool, &vendor, store_request("Ramesh Kirana"))
        .await?
        .data
        .unwrap();
    store_service::create_store(&pool, &other_vendor, store_request("Suresh Stores")).await?;

    // A customer cannot open a store.
    let err = store_service::create_store(&pool, &customer, store_request("Nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let product_p = product_service::create_product(&pool, &vendor, product_request("Rice", 50, true))
        .await?
        .data
        .unwrap();
    let product_q = product_service::create_product(&pool, &vendor, product_request("Dal", 30, true))
        .await?
        .data
        .unwrap();
    let unavailable =
        product_service::create_product(&pool, &vendor, product_request("Ghee", 90, false))
            .await?
            .data
            .unwrap();

    // Scenario A: 2 x Rice(50) + 1 x Dal(30) totals 130.
    let placed = order_service::create_order(
        &pool,
        &customer,
        CreateOrderRequest {
            store_id: store.id,
            items: vec![
                OrderItemRequest {
                    product_id: product_p.id,
                    quantity: 2,
                },
                OrderItemRequest {
                    product_id: product_q.id,
                    quantity: 1,
                },
            ],
            delivery_address: "Flat 4B, Rose Apartments".into(),
            payment_method: Some("upi".into()),
            notes: None,
        },
    )
    .await?
    .data
    .unwrap();

    assert_eq!(placed.order.total_amount, 130);
    assert_eq!(placed.order.status, "pending");
    assert_eq!(placed.order.payment_status, "pending");
    assert_eq!(placed.order.delivery_time, "15-30 min");
    assert_eq!(placed.items.len(), 2);

    // Price integrity: every line snapshots the catalog price, and the total
    // is the sum of quantity * snapshot.
    let by_product: Vec<(Uuid, i32, i64)> = placed
        .items
        .iter()
        .map(|item| (item.product_id, item.quantity, item.price))
        .collect();
    assert!(by_product.contains(&(product_p.id, 2, 50)));
    assert!(by_product.contains(&(product_q.id, 1, 30)));
    let summed: i64 = placed
        .items
        .iter()
        .map(|item| item.price * i64::from(item.quantity))
        .sum();
    assert_eq!(placed.order.total_amount, summed);

    // Relations are inlined on creation.
    assert_eq!(placed.store.as_ref().unwrap().id, store.id);
    assert_eq!(placed.customer.as_ref().unwrap().id, customer.user_id);
    assert_eq!(
        placed.items[0].product.as_ref().unwrap().id,
        placed.items[0].product_id
    );

    // Vendors cannot place orders.
    let err = order_service::create_order(
        &pool,
        &vendor,
        order_request(store.id, product_p.id, 1),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Atomicity: a nonexistent product aborts the whole order.
    let orders_before = count_orders(&pool).await?;
    let err = order_service::create_order(
        &pool,
        &customer,
        order_request(store.id, Uuid::new_v4(), 1),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(count_orders(&pool).await?, orders_before);

    // Scenario C: an unavailable product aborts the whole order, even when
    // other lines are fine.
    let err = order_service::create_order(
        &pool,
        &customer,
        CreateOrderRequest {
            store_id: store.id,
            items: vec![
                OrderItemRequest {
                    product_id: product_p.id,
                    quantity: 1,
                },
                OrderItemRequest {
                    product_id: unavailable.id,
                    quantity: 1,
                },
            ],
            delivery_address: "Flat 4B".into(),
            payment_method: None,
            notes: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(count_orders(&pool).await?, orders_before);

    // Empty carts, whitespace-only addresses and bad payment methods are
    // validation failures.
    let err = order_service::create_order(
        &pool,
        &customer,
        CreateOrderRequest {
            store_id: store.id,
            items: vec![],
            delivery_address: "   ".into(),
            payment_method: Some("cheque".into()),
            notes: None,
        },
    )
    .await
    .unwrap_err();
    match err {
        AppError::Validation(errors) => {
            assert!(errors.contains_key("items"));
            assert!(errors.contains_key("delivery_address"));
            assert!(errors.contains_key("payment_method"));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }

    // Scenario B: a vendor who does not own the store is denied, and the
    // order is left untouched.
    let err = order_service::update_status(
        &pool,
        &other_vendor,
        placed.order.id,
        status_request("accepted"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    let unchanged = catalog::find_order(&pool, placed.order.id).await?.unwrap();
    assert_eq!(unchanged.status, "pending");

    // A different customer cannot even view it.
    let err = order_service::get_order(&pool, &other_customer, placed.order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Authorization symmetry: the owning vendor and the order's customer can
    // both drive the status.
    let accepted = order_service::update_status(
        &pool,
        &vendor,
        placed.order.id,
        status_request("accepted"),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(accepted.order.status, "accepted");

    // Status set closure: any member is reachable from any state, including
    // jumps and reversals.
    for target in ["delivered", "pending", "out_for_delivery"] {
        let updated = order_service::update_status(
            &pool,
            &vendor,
            placed.order.id,
            status_request(target),
        )
        .await?
        .data
        .unwrap();
        assert_eq!(updated.order.status, target);
    }
    let cancelled = order_service::update_status(
        &pool,
        &customer,
        placed.order.id,
        status_request("cancelled"),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(cancelled.order.status, "cancelled");

    // Values outside the set are rejected before any load or access check.
    let err = order_service::update_status(
        &pool,
        &customer,
        placed.order.id,
        status_request("shipped"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // A price change after the fact never rewrites an existing snapshot.
    product_service::update_product(
        &pool,
        &vendor,
        product_p.id,
        UpdateProductRequest {
            price: Some(80),
            ..Default::default()
        },
    )
    .await?;
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    let second = order_service::create_order(
        &pool,
        &customer,
        order_request(store.id, product_p.id, 1),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(second.order.total_amount, 80);
    let first_again = order_service::get_order(&pool, &customer, placed.order.id)
        .await?
        .data
        .unwrap();
    assert!(
        first_again
            .items
            .iter()
            .any(|item| item.product_id == product_p.id && item.price == 50)
    );

    // Scenario D: customer listing is newest first.
    let listing = order_service::list_customer_orders(&pool, &customer)
        .await?
        .data
        .unwrap();
    assert_eq!(listing.items.len(), 2);
    assert_eq!(listing.items[0].order.id, second.order.id);
    assert!(listing.items[0].order.created_at >= listing.items[1].order.created_at);

    // The vendor sees the same orders against their store.
    let vendor_listing = order_service::list_vendor_orders(&pool, &vendor)
        .await?
        .data
        .unwrap();
    assert_eq!(vendor_listing.items.len(), 2);

    // Idempotent reads: repeated lookups return the same snapshot.
    let read_one = catalog::find_product(&pool, product_q.id).await?.unwrap();
    let read_two = catalog::find_product(&pool, product_q.id).await?.unwrap();
    assert_eq!(read_one.price, read_two.price);
    assert_eq!(read_one.updated_at, read_two.updated_at);

    Ok(())
}

async fn setup_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let pool = create_pool(database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Clean tables between runs.
    sqlx::query("TRUNCATE TABLE order_items, orders, products, stores, users")
        .execute(&pool)
        .await?;

    Ok(pool)
}

async fn create_user(pool: &DbPool, role: &str, username: &str) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash, phone, address, role)
        VALUES ($1, $2, $3, 'dummy', '9999999999', '12 MG Road', $4)
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(format!("{username}@example.com"))
    .bind(role)
    .execute(pool)
    .await?;
    Ok(id)
}

async fn count_orders(pool: &DbPool) -> anyhow::Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT count(*) FROM orders")
        .fetch_one(pool)
        .await?;
    Ok(count.0)
}

fn store_request(name: &str) -> CreateStoreRequest {
    CreateStoreRequest {
        name: name.into(),
        description: None,
        address: "12 MG Road".into(),
        phone: "9999999999".into(),
        email: None,
        store_type: "kirana".into(),
        gst_number: None,
        delivery_time: None,
        delivery_radius: None,
        opening_time: None,
        closing_time: None,
        latitude: None,
        longitude: None,
        image: None,
    }
}

fn product_request(name: &str, price: i64, available: bool) -> CreateProductRequest {
    CreateProductRequest {
        name: name.into(),
        description: None,
        price,
        category: "groceries".into(),
        image: None,
        stock: Some(100),
        unit: None,
        is_available: Some(available),
    }
}

fn order_request(store_id: Uuid, product_id: Uuid, quantity: i32) -> CreateOrderRequest {
    CreateOrderRequest {
        store_id,
        items: vec![OrderItemRequest {
            product_id,
            quantity,
        }],
        delivery_address: "Flat 4B, Rose Apartments".into(),
        payment_method: None,
        notes: None,
    }
}

fn status_request(status: &str) -> UpdateOrderStatusRequest {
    UpdateOrderStatusRequest {
        status: status.into(),
    }
}
