#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use chrono::{Duration, Utc};
use course_shop_api::{
    config::GatewayConfig,
    db::sync_schema,
    dto::orders::CheckoutRequest,
    entity::{
        coupons::{ActiveModel as CouponActive, Model as CouponModel},
        courses::{ActiveModel as CourseActive, Model as CourseModel},
        products::{ActiveModel as ProductActive, Model as ProductModel},
        users::ActiveModel as UserActive,
    },
    gateway::{GatewayError, PaymentGateway, PaymentRequest, ZarinpalGateway},
    middleware::auth::AuthUser,
    state::AppState,
};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use uuid::Uuid;

/// Fresh in-memory SQLite database with the full schema.
///
/// A single connection keeps every query on the same in-memory database.
pub async fn setup_db() -> anyhow::Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(opts).await?;
    sync_schema(&db).await?;
    Ok(db)
}

pub fn gateway_config() -> GatewayConfig {
    GatewayConfig {
        merchant_id: "test-merchant".into(),
        sandbox: true,
        callback_url: "http://localhost:3000/api/orders/payment/callback".into(),
        timeout_secs: 1,
    }
}

pub async fn setup_state() -> anyhow::Result<AppState> {
    let orm = setup_db().await?;
    let gateway = ZarinpalGateway::new(&gateway_config())?;
    Ok(AppState { orm, gateway })
}

pub async fn create_user(db: &DatabaseConnection, role: &str) -> anyhow::Result<AuthUser> {
    let id = Uuid::new_v4();
    UserActive {
        id: Set(id),
        email: Set(format!("{id}@example.com")),
        password_hash: Set("not-a-real-hash".into()),
        role: Set(role.into()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;
    Ok(AuthUser {
        user_id: id,
        role: role.into(),
    })
}

pub async fn create_course(db: &DatabaseConnection, price: i64) -> anyhow::Result<CourseModel> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let course = CourseActive {
        id: Set(id),
        title: Set(format!("Course {price}")),
        slug: Set(format!("course-{id}")),
        description: Set(String::new()),
        price: Set(price),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;
    Ok(course)
}

pub async fn create_product(
    db: &DatabaseConnection,
    price: i64,
    discounted_price: Option<i64>,
    stock: i32,
) -> anyhow::Result<ProductModel> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let product = ProductActive {
        id: Set(id),
        title: Set(format!("Product {price}")),
        slug: Set(format!("product-{id}")),
        description: Set(String::new()),
        price: Set(price),
        discounted_price: Set(discounted_price),
        is_free: Set(false),
        stock: Set(stock),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;
    Ok(product)
}

pub struct NewCoupon {
    pub code: &'static str,
    pub percent: i32,
    pub amount: i64,
    pub max_usage: i32,
    pub min_purchase: i64,
}

impl NewCoupon {
    /// 10% off, minimum purchase 100000, five uses.
    pub fn save10() -> Self {
        Self {
            code: "SAVE10",
            percent: 10,
            amount: 0,
            max_usage: 5,
            min_purchase: 100_000,
        }
    }
}

pub async fn create_coupon(db: &DatabaseConnection, coupon: NewCoupon) -> anyhow::Result<CouponModel> {
    let now = Utc::now();
    let coupon = CouponActive {
        id: Set(Uuid::new_v4()),
        code: Set(coupon.code.into()),
        discount_percent: Set(coupon.percent),
        discount_amount: Set(coupon.amount),
        max_usage: Set(coupon.max_usage),
        current_usage: Set(0),
        min_purchase_amount: Set(coupon.min_purchase),
        is_active: Set(true),
        valid_from: Set((now - Duration::days(1)).into()),
        valid_to: Set((now + Duration::days(1)).into()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;
    Ok(coupon)
}

pub fn checkout_form() -> CheckoutRequest {
    CheckoutRequest {
        first_name: "Sara".into(),
        last_name: "Ahmadi".into(),
        email: "sara@example.com".into(),
        phone: "09123456789".into(),
        address: "Valiasr St".into(),
        apartment: String::new(),
        city: "Tehran".into(),
        state: String::new(),
        zip_code: "1234567890".into(),
        country: None,
        notes: String::new(),
        terms_accepted: true,
    }
}

/// Scripted gateway. `None` makes the corresponding call fail with a rejection.
#[derive(Debug, Default)]
pub struct MockGateway {
    pub authority: Option<String>,
    pub ref_id: Option<String>,
    pub request_calls: AtomicUsize,
    pub verify_calls: AtomicUsize,
    pub verified_amount: AtomicI64,
}

impl MockGateway {
    pub fn approving(authority: &str, ref_id: &str) -> Self {
        Self {
            authority: Some(authority.into()),
            ref_id: Some(ref_id.into()),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> usize {
        self.request_calls.load(Ordering::SeqCst)
    }

    pub fn verifications(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }
}

impl PaymentGateway for MockGateway {
    async fn request_payment(&self, _request: &PaymentRequest) -> Result<String, GatewayError> {
        self.request_calls.fetch_add(1, Ordering::SeqCst);
        self.authority.clone().ok_or(GatewayError::Rejected {
            code: Some(-9),
            message: "merchant rejected".into(),
        })
    }

    async fn verify_payment(&self, _authority: &str, amount: i64) -> Result<String, GatewayError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.verified_amount.store(amount, Ordering::SeqCst);
        self.ref_id.clone().ok_or(GatewayError::Rejected {
            code: Some(-51),
            message: "payment not successful".into(),
        })
    }

    fn payment_url(&self, authority: &str) -> String {
        format!("https://gateway.test/StartPay/{authority}")
    }
}

/// Catalog ids seeded for HTTP tests.
pub struct SeededIds {
    pub course: Uuid,
}
