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
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, AddToCartResponse, CartCount, CartSummary, InCart},
        catalog::{
            CourseList, CreateCourseRequest, CreateProductRequest, ProductList,
            UpdateCourseRequest, UpdateProductRequest,
        },
        coupons::{AppliedCouponResponse, ApplyCouponRequest, CouponList, CreateCouponRequest},
        orders::{
            CheckoutRequest, OrderList, OrderWithItems, PaymentOutcome, PaymentRedirect,
            PaymentResult, UpdateOrderStatusRequest,
        },
    },
    models::{CartLine, Coupon, Course, ItemKind, ItemRef, Order, OrderItem, OrderStatus, Product, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, catalog, health, orders, params},
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
        auth::logout,
        catalog::list_courses,
        catalog::get_course,
        catalog::list_products,
        catalog::get_product,
        cart::cart_list,
        cart::add_to_cart,
        cart::clear_cart,
        cart::cart_count,
        cart::in_cart,
        cart::remove_from_cart,
        orders::list_orders,
        orders::get_order,
        orders::order_success,
        orders::apply_coupon,
        orders::remove_coupon,
        orders::checkout,
        orders::pay_order,
        orders::payment_callback,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status,
        admin::create_course,
        admin::update_course,
        admin::create_product,
        admin::update_product,
        admin::list_coupons,
        admin::create_coupon
    ),
    components(
        schemas(
            User,
            Course,
            Product,
            Coupon,
            ItemKind,
            ItemRef,
            CartLine,
            Order,
            OrderItem,
            OrderStatus,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            AddToCartRequest,
            AddToCartResponse,
            CartSummary,
            CartCount,
            InCart,
            CourseList,
            ProductList,
            CreateCourseRequest,
            UpdateCourseRequest,
            CreateProductRequest,
            UpdateProductRequest,
            ApplyCouponRequest,
            AppliedCouponResponse,
            CreateCouponRequest,
            CouponList,
            CheckoutRequest,
            OrderList,
            OrderWithItems,
            PaymentRedirect,
            PaymentOutcome,
            PaymentResult,
            UpdateOrderStatusRequest,
            params::Pagination,
            params::CatalogQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Course>,
            ApiResponse<Product>,
            ApiResponse<CartSummary>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<PaymentResult>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Catalog", description = "Course and product browsing"),
        (name = "Cart", description = "Session cart endpoints"),
        (name = "Orders", description = "Checkout, coupons and payment"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
