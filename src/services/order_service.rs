use chrono::{DateTime, Utc};
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
    TransactionTrait,
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, LockType, OnConflict},
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{
        CheckoutRequest, OrderList, OrderWithItems, PaymentCallbackQuery, PaymentOutcome,
        PaymentRedirect, PaymentResult,
    },
    entity::{
        coupons::Entity as Coupons,
        enrollments::{ActiveModel as EnrollmentActive, Column as EnrollmentCol, Entity as Enrollments},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems, Model as OrderItemModel},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    },
    error::{AppError, AppResult},
    gateway::{PaymentGateway, PaymentRequest},
    middleware::auth::AuthUser,
    models::{ItemKind, Order, OrderItem, OrderStatus},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{cart_service, coupon_service},
    session::{AppliedCoupon, CartUpdate, SessionCart},
};

const ORDER_NUMBER_ATTEMPTS: usize = 5;
const ORDER_NUMBER_SUFFIX_LEN: usize = 6;
const ORDER_NUMBER_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const DEFAULT_COUNTRY: &str = "IR";
const MIN_PHONE_DIGITS: usize = 10;

/// `ORD-YYYYMMDD-XXXXXX`
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ORDER_NUMBER_SUFFIX_LEN)
        .map(|_| {
            let idx = rng.random_range(0..ORDER_NUMBER_ALPHABET.len());
            ORDER_NUMBER_ALPHABET[idx] as char
        })
        .collect();
    format!("ORD-{}-{suffix}", now.format("%Y%m%d"))
}

/// Check and normalise the checkout form.
pub fn validate_checkout(form: CheckoutRequest) -> AppResult<CheckoutRequest> {
    let first_name = form.first_name.trim().to_string();
    let last_name = form.last_name.trim().to_string();
    if first_name.is_empty() || last_name.is_empty() {
        return Err(AppError::BadRequest("first and last name are required".into()));
    }

    let email = form.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("invalid email address".into()));
    }

    let phone: String = form
        .phone
        .chars()
        .filter(|c| !matches!(c, '-' | ' ' | '(' | ')'))
        .collect();
    if phone.len() < MIN_PHONE_DIGITS || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest("invalid phone number".into()));
    }

    let zip_code: String = form
        .zip_code
        .chars()
        .filter(|c| !matches!(c, '-' | ' '))
        .collect();
    if !zip_code.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest("invalid zip code".into()));
    }

    if !form.terms_accepted {
        return Err(AppError::BadRequest("terms must be accepted".into()));
    }

    let country = form
        .country
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_COUNTRY.to_string());

    Ok(CheckoutRequest {
        first_name,
        last_name,
        email,
        phone,
        address: form.address.trim().to_string(),
        apartment: form.apartment.trim().to_string(),
        city: form.city.trim().to_string(),
        state: form.state.trim().to_string(),
        zip_code,
        country: Some(country),
        notes: form.notes.trim().to_string(),
        terms_accepted: true,
    })
}

/// Turn the session cart into a pending order.
///
/// Prices are read live at this point. A coupon from the session is re-checked against
/// the locked coupon row and consumed in the same transaction as the order insert.
pub async fn checkout(
    db: &DatabaseConnection,
    user: &AuthUser,
    cart: &mut SessionCart,
    coupon: Option<&AppliedCoupon>,
    payload: CheckoutRequest,
) -> AppResult<CartUpdate<OrderWithItems>> {
    let form = validate_checkout(payload)?;

    let listed = cart_service::list_items(db, cart).await?;
    let summary = listed.value;
    if summary.items.is_empty() {
        return Err(AppError::BadRequest("cart is empty".into()));
    }
    let total_price = summary.total_price;

    let txn = db.begin().await?;

    let mut discount_amount = 0;
    let mut coupon_id = None;
    if let Some(applied) = coupon {
        let locked = Coupons::find_by_id(applied.coupon_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::CouponRejected("invalid coupon code".into()))?;
        if !coupon_service::can_use(&locked, total_price, Utc::now()) {
            return Err(AppError::CouponRejected(
                "coupon is no longer valid for this cart".into(),
            ));
        }
        if !coupon_service::redeem(&txn, locked.id).await? {
            return Err(AppError::CouponRejected("coupon usage limit reached".into()));
        }
        discount_amount = coupon_service::calculate_discount(&locked, total_price);
        coupon_id = Some(locked.id);
    }

    let tax_amount = 0;
    let final_price = (total_price - discount_amount + tax_amount).max(0);

    let now = Utc::now();
    let order = insert_order(
        &txn,
        OrderActive {
            id: Set(Uuid::new_v4()),
            order_number: Set(String::new()),
            user_id: Set(user.user_id),
            first_name: Set(form.first_name),
            last_name: Set(form.last_name),
            email: Set(form.email),
            phone: Set(form.phone),
            address: Set(form.address),
            apartment: Set(form.apartment),
            city: Set(form.city),
            state: Set(form.state),
            zip_code: Set(form.zip_code),
            country: Set(form.country.unwrap_or_else(|| DEFAULT_COUNTRY.to_string())),
            notes: Set(form.notes),
            total_price: Set(total_price),
            discount_amount: Set(discount_amount),
            tax_amount: Set(tax_amount),
            final_price: Set(final_price),
            coupon_id: Set(coupon_id),
            status: Set(OrderStatus::Pending.as_str().to_string()),
            is_paid: Set(false),
            gateway_authority: Set(None),
            gateway_ref_id: Set(None),
            payment_date: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        },
    )
    .await?;

    let mut items = Vec::with_capacity(summary.items.len());
    for line in &summary.items {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            item_kind: Set(line.item_kind.as_str().to_string()),
            item_id: Set(line.item_id),
            title: Set(line.title.clone()),
            price: Set(line.price),
            quantity: Set(line.quantity),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(item)?);
    }

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        order_number = %order.order_number,
        total_price,
        discount_amount,
        final_price,
        "order created"
    );
    audit::record(
        db,
        Some(user.user_id),
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order.id, "order_number": order.order_number }),
    )
    .await;
    if let Some(coupon_id) = coupon_id {
        audit::record(
            db,
            Some(user.user_id),
            "coupon_redeem",
            "coupons",
            serde_json::json!({ "coupon_id": coupon_id, "order_id": order.id }),
        )
        .await;
    }

    Ok(CartUpdate::new(
        OrderWithItems {
            order: order_from_entity(order)?,
            items,
        },
        listed.dirty,
    ))
}

// Each attempt runs under its own savepoint so a duplicate number does not poison the
// surrounding transaction.
async fn insert_order(txn: &DatabaseTransaction, mut active: OrderActive) -> AppResult<OrderModel> {
    for attempt in 1..=ORDER_NUMBER_ATTEMPTS {
        active.order_number = Set(generate_order_number(Utc::now()));
        let savepoint = txn.begin().await?;
        match active.clone().insert(&savepoint).await {
            Ok(order) => {
                savepoint.commit().await?;
                return Ok(order);
            }
            Err(err) if is_unique_violation(&err) => {
                savepoint.rollback().await?;
                tracing::warn!(attempt, "order number collision, regenerating");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(AppError::Internal(anyhow::anyhow!(
        "could not allocate a unique order number"
    )))
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Open a gateway payment for a pending order and move it to `processing`.
///
/// A gateway failure marks the order `failed`; the visitor checks out again to retry.
pub async fn pay_order<G: PaymentGateway>(
    db: &DatabaseConnection,
    gateway: &G,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<PaymentRedirect> {
    let order = find_user_order(db, user, id).await?;
    if !can_be_paid(&order)? {
        return Err(AppError::BadRequest("order cannot be paid".into()));
    }

    let request = PaymentRequest {
        amount: order.final_price,
        description: format!("Payment for order {}", order.order_number),
        email: order.email.clone(),
        mobile: order.phone.clone(),
    };

    match gateway.request_payment(&request).await {
        Ok(authority) => {
            let mut active = transition(order, OrderStatus::Processing)?;
            active.gateway_authority = Set(Some(authority.clone()));
            let order = active.update(db).await?;

            tracing::info!(order_id = %order.id, %authority, "payment initiated");
            audit::record(
                db,
                Some(user.user_id),
                "payment_request",
                "orders",
                serde_json::json!({ "order_id": order.id, "authority": authority }),
            )
            .await;

            Ok(PaymentRedirect {
                order_id: order.id,
                payment_url: gateway.payment_url(&authority),
                authority,
            })
        }
        Err(err) => {
            tracing::warn!(order_id = %order.id, error = %err, "payment request failed");
            let message = err.user_message();
            let Some(order) = settle_unpaid(db, &order, OrderStatus::Failed).await? else {
                return Err(AppError::Gateway(message));
            };
            audit::record(
                db,
                Some(user.user_id),
                "payment_failed",
                "orders",
                serde_json::json!({ "order_id": order.id, "stage": "request", "error": err.to_string() }),
            )
            .await;
            Err(AppError::Gateway(message))
        }
    }
}

/// Handle the visitor coming back from the gateway.
///
/// Orders already in a terminal state are returned untouched, so repeated callbacks
/// never verify, enroll or clear twice.
pub async fn finalize_payment<G: PaymentGateway>(
    db: &DatabaseConnection,
    gateway: &G,
    user: &AuthUser,
    cart: &mut SessionCart,
    query: PaymentCallbackQuery,
) -> AppResult<CartUpdate<PaymentResult>> {
    let authority = query
        .authority
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .ok_or_else(|| AppError::BadRequest("invalid payment data".into()))?;

    let order = Orders::find()
        .filter(OrderCol::GatewayAuthority.eq(authority.as_str()))
        .filter(OrderCol::UserId.eq(user.user_id))
        .one(db)
        .await?
        .ok_or(AppError::NotFound)?;

    let status = order.status.parse::<OrderStatus>()?;
    if status.is_terminal() {
        tracing::debug!(order_id = %order.id, %status, "callback for finalized order");
        return Ok(CartUpdate::new(
            PaymentResult {
                order: order_from_entity(order)?,
                outcome: PaymentOutcome::AlreadyFinalized { status },
            },
            false,
        ));
    }

    if query.status.as_deref() != Some("OK") {
        let Some(order) = settle_unpaid(db, &order, OrderStatus::Cancelled).await? else {
            return already_finalized(db, order.id).await;
        };
        tracing::info!(order_id = %order.id, "payment cancelled by payer");
        audit::record(
            db,
            Some(user.user_id),
            "payment_cancelled",
            "orders",
            serde_json::json!({ "order_id": order.id }),
        )
        .await;
        return Ok(CartUpdate::new(
            PaymentResult {
                order: order_from_entity(order)?,
                outcome: PaymentOutcome::Cancelled,
            },
            false,
        ));
    }

    let ref_id = match gateway.verify_payment(&authority, order.final_price).await {
        Ok(ref_id) => ref_id,
        Err(err) => {
            tracing::warn!(order_id = %order.id, error = %err, "payment verification failed");
            let message = err.user_message();
            let Some(order) = settle_unpaid(db, &order, OrderStatus::Failed).await? else {
                return already_finalized(db, order.id).await;
            };
            audit::record(
                db,
                Some(user.user_id),
                "payment_failed",
                "orders",
                serde_json::json!({ "order_id": order.id, "stage": "verify", "error": err.to_string() }),
            )
            .await;
            return Ok(CartUpdate::new(
                PaymentResult {
                    order: order_from_entity(order)?,
                    outcome: PaymentOutcome::Failed { message },
                },
                false,
            ));
        }
    };

    let txn = db.begin().await?;
    let locked = Orders::find_by_id(order.id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let status = locked.status.parse::<OrderStatus>()?;
    if status.is_terminal() {
        // Lost the race to a concurrent callback for the same payment.
        txn.rollback().await?;
        return Ok(CartUpdate::new(
            PaymentResult {
                order: order_from_entity(locked)?,
                outcome: PaymentOutcome::AlreadyFinalized { status },
            },
            false,
        ));
    }

    let now = Utc::now();
    let mut active = transition(locked, OrderStatus::Paid)?;
    active.is_paid = Set(true);
    active.gateway_ref_id = Set(Some(ref_id.clone()));
    active.payment_date = Set(Some(now.into()));
    let order = active.update(&txn).await?;

    let enrolled = enroll_courses(&txn, &order).await?;
    cart_service::clear_durable_cart(&txn, order.user_id).await?;
    txn.commit().await?;

    let cleared = cart.clear();
    tracing::info!(order_id = %order.id, %ref_id, enrolled, "order paid");
    audit::record(
        db,
        Some(user.user_id),
        "order_paid",
        "orders",
        serde_json::json!({ "order_id": order.id, "ref_id": ref_id, "enrolled": enrolled }),
    )
    .await;

    Ok(CartUpdate::new(
        PaymentResult {
            order: order_from_entity(order)?,
            outcome: PaymentOutcome::Paid { ref_id },
        },
        cleared,
    ))
}

async fn enroll_courses(txn: &DatabaseTransaction, order: &OrderModel) -> AppResult<usize> {
    let course_lines = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .filter(OrderItemCol::ItemKind.eq(ItemKind::Course.as_str()))
        .all(txn)
        .await?;

    let now = Utc::now();
    for line in &course_lines {
        Enrollments::insert(EnrollmentActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(order.user_id),
            course_id: Set(line.item_id),
            order_id: Set(Some(order.id)),
            created_at: Set(now.into()),
        })
        .on_conflict(
            OnConflict::columns([EnrollmentCol::UserId, EnrollmentCol::CourseId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(txn)
        .await?;
    }
    Ok(course_lines.len())
}

/// Move an unpaid order to `next`, but only while its status is still the one in `order`.
/// `None` means a concurrent request settled the order first.
async fn settle_unpaid(
    db: &DatabaseConnection,
    order: &OrderModel,
    next: OrderStatus,
) -> AppResult<Option<OrderModel>> {
    let current = order.status.parse::<OrderStatus>()?;
    if !current.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "order cannot move from {current} to {next}"
        )));
    }

    let now: DateTimeWithTimeZone = Utc::now().into();
    let result = Orders::update_many()
        .col_expr(OrderCol::Status, Expr::value(next.as_str()))
        .col_expr(OrderCol::UpdatedAt, Expr::value(now))
        .filter(OrderCol::Id.eq(order.id))
        .filter(OrderCol::Status.eq(current.as_str()))
        .filter(OrderCol::IsPaid.eq(false))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        tracing::info!(order_id = %order.id, %current, %next, "order settled concurrently, skipping");
        return Ok(None);
    }

    let updated = Orders::find_by_id(order.id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Some(updated))
}

async fn already_finalized(
    db: &DatabaseConnection,
    order_id: Uuid,
) -> AppResult<CartUpdate<PaymentResult>> {
    let order = Orders::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound)?;
    let status = order.status.parse::<OrderStatus>()?;
    Ok(CartUpdate::new(
        PaymentResult {
            order: order_from_entity(order)?,
            outcome: PaymentOutcome::AlreadyFinalized { status },
        },
        false,
    ))
}

fn can_be_paid(order: &OrderModel) -> AppResult<bool> {
    let status = order.status.parse::<OrderStatus>()?;
    Ok(status == OrderStatus::Pending && !order.is_paid)
}

/// Move an order along the status graph, refusing edges the graph does not have.
pub(crate) fn transition(order: OrderModel, next: OrderStatus) -> AppResult<OrderActive> {
    let current = order.status.parse::<OrderStatus>()?;
    if !current.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "order cannot move from {current} to {next}"
        )));
    }
    let mut active: OrderActive = order.into();
    active.status = Set(next.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    Ok(active)
}

pub async fn list_orders(
    db: &DatabaseConnection,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(db).await? as i64;
    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(db)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_order(
    db: &DatabaseConnection,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = find_user_order(db, user, id).await?;
    let data = with_items(db, order).await?;
    Ok(ApiResponse::success("OK", data, Some(Meta::empty())))
}

/// Order detail for the payment success page. Unpaid orders are not found here.
pub async fn get_paid_order(
    db: &DatabaseConnection,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = find_user_order(db, user, id).await?;
    if !order.is_paid {
        return Err(AppError::NotFound);
    }
    let data = with_items(db, order).await?;
    Ok(ApiResponse::success("Payment successful", data, Some(Meta::empty())))
}

async fn find_user_order(db: &DatabaseConnection, user: &AuthUser, id: Uuid) -> AppResult<OrderModel> {
    Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(db)
        .await?
        .ok_or(AppError::NotFound)
}

pub(crate) async fn with_items(db: &DatabaseConnection, order: OrderModel) -> AppResult<OrderWithItems> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect::<AppResult<Vec<_>>>()?;
    Ok(OrderWithItems {
        order: order_from_entity(order)?,
        items,
    })
}

pub(crate) fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    Ok(Order {
        id: model.id,
        status: model.status.parse()?,
        order_number: model.order_number,
        user_id: model.user_id,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        phone: model.phone,
        address: model.address,
        apartment: model.apartment,
        city: model.city,
        state: model.state,
        zip_code: model.zip_code,
        country: model.country,
        notes: model.notes,
        total_price: model.total_price,
        discount_amount: model.discount_amount,
        tax_amount: model.tax_amount,
        final_price: model.final_price,
        coupon_id: model.coupon_id,
        is_paid: model.is_paid,
        gateway_authority: model.gateway_authority,
        gateway_ref_id: model.gateway_ref_id,
        payment_date: model.payment_date.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn order_item_from_entity(model: OrderItemModel) -> AppResult<OrderItem> {
    Ok(OrderItem {
        id: model.id,
        order_id: model.order_id,
        item_kind: model.item_kind.parse()?,
        item_id: model.item_id,
        title: model.title,
        price: model.price,
        quantity: model.quantity,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> CheckoutRequest {
        CheckoutRequest {
            first_name: " Sara ".into(),
            last_name: "Ahmadi".into(),
            email: " Sara@Example.com ".into(),
            phone: "0912-345 6789".into(),
            address: String::new(),
            apartment: String::new(),
            city: "Tehran".into(),
            state: String::new(),
            zip_code: "12345-67890".into(),
            country: None,
            notes: String::new(),
            terms_accepted: true,
        }
    }

    #[test]
    fn order_number_has_date_and_suffix() {
        let now = Utc::now();
        let number = generate_order_number(now);
        let prefix = format!("ORD-{}-", now.format("%Y%m%d"));
        assert!(number.starts_with(&prefix), "{number}");
        let suffix = &number[prefix.len()..];
        assert_eq!(suffix.len(), ORDER_NUMBER_SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| ORDER_NUMBER_ALPHABET.contains(&b)));
    }

    #[test]
    fn checkout_form_is_normalised() {
        let cleaned = validate_checkout(form()).expect("valid form");
        assert_eq!(cleaned.first_name, "Sara");
        assert_eq!(cleaned.email, "sara@example.com");
        assert_eq!(cleaned.phone, "09123456789");
        assert_eq!(cleaned.zip_code, "1234567890");
        assert_eq!(cleaned.country.as_deref(), Some("IR"));
    }

    #[test]
    fn checkout_form_rejects_bad_phone_and_zip() {
        let mut bad_phone = form();
        bad_phone.phone = "0912abc4567".into();
        assert!(matches!(validate_checkout(bad_phone), Err(AppError::BadRequest(_))));

        let mut short_phone = form();
        short_phone.phone = "12345".into();
        assert!(matches!(validate_checkout(short_phone), Err(AppError::BadRequest(_))));

        let mut bad_zip = form();
        bad_zip.zip_code = "12A45".into();
        assert!(matches!(validate_checkout(bad_zip), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn checkout_form_requires_terms() {
        let mut f = form();
        f.terms_accepted = false;
        assert!(matches!(validate_checkout(f), Err(AppError::BadRequest(_))));
    }
}
