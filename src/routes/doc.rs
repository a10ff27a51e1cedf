use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        ProductSummary, StoreSummary, UserSummary,
        auth::{AuthResponse, LoginRequest, RegisterRequest},
        orders::{
            CreateOrderRequest, OrderDetail, OrderItemRequest, OrderList, UpdateOrderStatusRequest,
        },
        products::{CreateProductRequest, ProductDetail, ProductList, UpdateProductRequest},
        stores::{CreateStoreRequest, StoreDetail, StoreList, UpdateStoreRequest},
    },
    models::{Order, OrderItem, Product, Store, User},
    response::ApiResponse,
    routes::{auth, health, orders, params, products, stores},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        stores::list_stores,
        stores::get_store,
        stores::list_store_products,
        stores::create_store,
        stores::update_store,
        stores::delete_store,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        orders::create_order,
        orders::list_customer_orders,
        orders::list_vendor_orders,
        orders::get_order,
        orders::update_order_status,
    ),
    components(
        schemas(
            User,
            Store,
            Product,
            Order,
            OrderItem,
            UserSummary,
            StoreSummary,
            ProductSummary,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            CreateStoreRequest,
            UpdateStoreRequest,
            StoreDetail,
            StoreList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductDetail,
            ProductList,
            CreateOrderRequest,
            OrderItemRequest,
            UpdateOrderStatusRequest,
            OrderDetail,
            OrderList,
            params::ProductListQuery,
            ApiResponse<AuthResponse>,
            ApiResponse<StoreList>,
            ApiResponse<ProductList>,
            ApiResponse<OrderDetail>,
            ApiResponse<OrderList>,
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and login"),
        (name = "Stores", description = "Store endpoints"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Orders", description = "Order lifecycle endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
