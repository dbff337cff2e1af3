use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, prelude::DateTimeWithTimeZone, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::coupons::{AppliedCouponResponse, CouponList, CreateCouponRequest},
    entity::coupons::{ActiveModel as CouponActive, Column as CouponCol, Entity as Coupons, Model as CouponModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Coupon,
    response::{ApiResponse, Meta},
    services::cart_service,
    session::{AppliedCoupon, CartUpdate, SessionCart},
};

const INVALID_CODE: &str = "invalid coupon code";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountRule {
    Percentage(i64),
    Fixed(i64),
    None,
}

impl DiscountRule {
    pub fn of(coupon: &CouponModel) -> Self {
        if coupon.discount_amount > 0 {
            DiscountRule::Fixed(coupon.discount_amount)
        } else if coupon.discount_percent > 0 {
            DiscountRule::Percentage(i64::from(coupon.discount_percent))
        } else {
            DiscountRule::None
        }
    }

    /// Never more than `total`.
    pub fn discount_for(&self, total: i64) -> i64 {
        let total = total.max(0);
        match *self {
            DiscountRule::Fixed(amount) => amount.min(total),
            DiscountRule::Percentage(percent) => total * percent.clamp(0, 100) / 100,
            DiscountRule::None => 0,
        }
    }
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Active, inside its validity window and not used up.
pub fn is_valid(coupon: &CouponModel, now: DateTime<Utc>) -> bool {
    coupon.is_active
        && coupon.valid_from.with_timezone(&Utc) <= now
        && now <= coupon.valid_to.with_timezone(&Utc)
        && coupon.current_usage < coupon.max_usage
}

pub fn can_use(coupon: &CouponModel, total: i64, now: DateTime<Utc>) -> bool {
    is_valid(coupon, now) && total >= coupon.min_purchase_amount
}

pub fn calculate_discount(coupon: &CouponModel, total: i64) -> i64 {
    DiscountRule::of(coupon).discount_for(total)
}

/// A coupon checked against the current cart.
#[derive(Debug, Clone)]
pub struct CouponQuote {
    pub coupon: AppliedCoupon,
    pub subtotal: i64,
}

impl CouponQuote {
    pub fn to_response(&self) -> AppliedCouponResponse {
        AppliedCouponResponse {
            code: self.coupon.code.clone(),
            subtotal: self.subtotal,
            discount_amount: self.coupon.discount_amount,
            total: self.subtotal - self.coupon.discount_amount,
        }
    }
}

/// Validate `code` against the cart. Nothing is consumed; the caller keeps the result in
/// the session until checkout.
pub async fn apply_coupon(
    db: &DatabaseConnection,
    cart: &mut SessionCart,
    code: &str,
) -> AppResult<CartUpdate<CouponQuote>> {
    let code = normalize_code(code);
    if code.is_empty() {
        return Err(AppError::BadRequest("coupon code is required".into()));
    }

    let listed = cart_service::list_items(db, cart).await?;
    let subtotal = listed.value.total_price;
    if listed.value.items.is_empty() {
        return Err(AppError::BadRequest("cart is empty".into()));
    }

    // Unknown codes get the same message as unusable ones.
    let coupon = Coupons::find()
        .filter(CouponCol::Code.eq(code.as_str()))
        .one(db)
        .await?
        .ok_or_else(|| AppError::BadRequest(INVALID_CODE.into()))?;

    let now = Utc::now();
    if !is_valid(&coupon, now) {
        return Err(AppError::BadRequest(INVALID_CODE.into()));
    }
    if subtotal < coupon.min_purchase_amount {
        return Err(AppError::BadRequest(format!(
            "minimum purchase for this coupon is {}",
            coupon.min_purchase_amount
        )));
    }

    let quote = CouponQuote {
        coupon: AppliedCoupon {
            coupon_id: coupon.id,
            code: coupon.code.clone(),
            discount_amount: calculate_discount(&coupon, subtotal),
        },
        subtotal,
    };
    tracing::debug!(code = %quote.coupon.code, discount = quote.coupon.discount_amount, "coupon applied");
    Ok(CartUpdate::new(quote, listed.dirty))
}

/// Consume one use of the coupon. Must run inside the checkout transaction; returns
/// `false` when the counter is already at its limit or the coupon was switched off.
pub async fn redeem<C: ConnectionTrait>(conn: &C, coupon_id: Uuid) -> AppResult<bool> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let result = Coupons::update_many()
        .col_expr(CouponCol::CurrentUsage, Expr::col(CouponCol::CurrentUsage).add(1))
        .col_expr(CouponCol::UpdatedAt, Expr::value(now))
        .filter(CouponCol::Id.eq(coupon_id))
        .filter(CouponCol::IsActive.eq(true))
        .filter(Expr::col(CouponCol::CurrentUsage).lt(Expr::col(CouponCol::MaxUsage)))
        .exec(conn)
        .await?;
    Ok(result.rows_affected == 1)
}

pub async fn create_coupon(
    db: &DatabaseConnection,
    user: &AuthUser,
    payload: CreateCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;

    let code = normalize_code(&payload.code);
    if code.is_empty() {
        return Err(AppError::BadRequest("code must not be empty".into()));
    }
    let percent = payload.discount_percent.unwrap_or(0);
    let amount = payload.discount_amount.unwrap_or(0);
    match (percent > 0, amount > 0) {
        (true, true) => {
            return Err(AppError::BadRequest(
                "set either discount_percent or discount_amount, not both".into(),
            ));
        }
        (false, false) => {
            return Err(AppError::BadRequest(
                "discount_percent or discount_amount is required".into(),
            ));
        }
        _ => {}
    }
    if !(0..=100).contains(&percent) {
        return Err(AppError::BadRequest("discount_percent must be between 1 and 100".into()));
    }
    if amount < 0 || payload.min_purchase_amount.is_some_and(|min| min < 0) {
        return Err(AppError::BadRequest("amounts must not be negative".into()));
    }
    if payload.max_usage < 1 {
        return Err(AppError::BadRequest("max_usage must be at least 1".into()));
    }
    if payload.valid_from >= payload.valid_to {
        return Err(AppError::BadRequest("valid_from must be before valid_to".into()));
    }

    let exists = Coupons::find()
        .filter(CouponCol::Code.eq(code.as_str()))
        .one(db)
        .await?;
    if exists.is_some() {
        return Err(AppError::BadRequest("coupon code already exists".into()));
    }

    let now = Utc::now();
    let coupon = CouponActive {
        id: Set(Uuid::new_v4()),
        code: Set(code),
        discount_percent: Set(percent),
        discount_amount: Set(amount),
        max_usage: Set(payload.max_usage),
        current_usage: Set(0),
        min_purchase_amount: Set(payload.min_purchase_amount.unwrap_or(0)),
        is_active: Set(payload.is_active.unwrap_or(true)),
        valid_from: Set(payload.valid_from.into()),
        valid_to: Set(payload.valid_to.into()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;

    audit::record(
        db,
        Some(user.user_id),
        "coupon_create",
        "coupons",
        serde_json::json!({ "coupon_id": coupon.id, "code": coupon.code }),
    )
    .await;

    Ok(ApiResponse::success(
        "Coupon created",
        coupon_from_entity(coupon),
        Some(Meta::empty()),
    ))
}

pub async fn list_coupons(db: &DatabaseConnection, user: &AuthUser) -> AppResult<ApiResponse<CouponList>> {
    ensure_admin(user)?;
    let items: Vec<Coupon> = Coupons::find()
        .order_by_desc(CouponCol::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(coupon_from_entity)
        .collect();
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Coupons",
        CouponList { items },
        Some(Meta::new(1, total, total)),
    ))
}

fn coupon_from_entity(model: CouponModel) -> Coupon {
    Coupon {
        id: model.id,
        code: model.code,
        discount_percent: model.discount_percent,
        discount_amount: model.discount_amount,
        max_usage: model.max_usage,
        current_usage: model.current_usage,
        min_purchase_amount: model.min_purchase_amount,
        is_active: model.is_active,
        valid_from: model.valid_from.with_timezone(&Utc),
        valid_to: model.valid_to.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn coupon(percent: i32, amount: i64) -> CouponModel {
        let now = Utc::now();
        CouponModel {
            id: Uuid::new_v4(),
            code: "SAVE10".into(),
            discount_percent: percent,
            discount_amount: amount,
            max_usage: 5,
            current_usage: 0,
            min_purchase_amount: 100_000,
            is_active: true,
            valid_from: (now - Duration::days(1)).into(),
            valid_to: (now + Duration::days(1)).into(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn percentage_discount_floors() {
        assert_eq!(calculate_discount(&coupon(10, 0), 199_000), 19_900);
        assert_eq!(calculate_discount(&coupon(15, 0), 999), 149);
    }

    #[test]
    fn fixed_discount_is_capped_at_total() {
        assert_eq!(calculate_discount(&coupon(0, 50_000), 199_000), 50_000);
        assert_eq!(calculate_discount(&coupon(0, 50_000), 30_000), 30_000);
    }

    #[test]
    fn coupon_outside_window_or_used_up_is_invalid() {
        let now = Utc::now();
        let mut c = coupon(10, 0);
        assert!(is_valid(&c, now));

        c.valid_to = (now - Duration::hours(1)).into();
        assert!(!is_valid(&c, now));

        let mut c = coupon(10, 0);
        c.current_usage = c.max_usage;
        assert!(!is_valid(&c, now));

        let mut c = coupon(10, 0);
        c.is_active = false;
        assert!(!is_valid(&c, now));
    }

    #[test]
    fn minimum_purchase_applies_to_can_use() {
        let now = Utc::now();
        let c = coupon(10, 0);
        assert!(!can_use(&c, 99_999, now));
        assert!(can_use(&c, 100_000, now));
    }

    #[test]
    fn codes_are_trimmed_and_uppercased() {
        assert_eq!(normalize_code("  save10 "), "SAVE10");
    }
}
