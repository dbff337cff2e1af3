use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    dto::{
        coupons::{AppliedCouponResponse, ApplyCouponRequest},
        orders::{
            CheckoutRequest, OrderList, OrderWithItems, PaymentCallbackQuery, PaymentOutcome,
            PaymentRedirect, PaymentResult,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, MaybeAuthUser},
    response::{ApiResponse, Meta},
    routes::{cart::save_cart, params::OrderListQuery},
    services::{coupon_service, order_service},
    session,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/checkout", post(checkout))
        .route("/coupon", post(apply_coupon).delete(remove_coupon))
        .route("/payment/callback", get(payment_callback))
        .route("/{id}", get(get_order))
        .route("/{id}/pay", post(pay_order))
        .route("/{id}/success", get(order_success))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by order status"),
        ("sort_order" = Option<String>, Query, description = "asc or desc by creation time")
    ),
    responses(
        (status = 200, description = "Orders of the current user", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state.orm, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with its lines", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_order(&state.orm, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/success",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Paid order", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Order not found or not paid")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn order_success(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_paid_order(&state.orm, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/coupon",
    request_body = ApplyCouponRequest,
    responses(
        (status = 200, description = "Coupon attached to the session", body = ApiResponse<AppliedCouponResponse>),
        (status = 400, description = "Invalid coupon code")
    ),
    tag = "Orders"
)]
pub async fn apply_coupon(
    State(state): State<AppState>,
    session: Session,
    MaybeAuthUser(user): MaybeAuthUser,
    Json(payload): Json<ApplyCouponRequest>,
) -> AppResult<Json<ApiResponse<AppliedCouponResponse>>> {
    let mut cart = session::load_cart(&session).await?;
    let quote = coupon_service::apply_coupon(&state.orm, &mut cart, &payload.code).await?;
    save_cart(&state, &session, user.as_ref(), &cart, quote.dirty).await?;
    session::store_coupon(&session, &quote.value.coupon).await?;

    Ok(Json(ApiResponse::success(
        "Coupon applied",
        quote.value.to_response(),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/orders/coupon",
    responses(
        (status = 200, description = "Coupon detached from the session")
    ),
    tag = "Orders"
)]
pub async fn remove_coupon(session: Session) -> AppResult<Json<ApiResponse<()>>> {
    session::clear_coupon(&session).await?;
    Ok(Json(ApiResponse::message("Coupon removed")))
}

#[utoipa::path(
    post,
    path = "/api/orders/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Pending order created from the cart", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Empty cart, invalid form or unusable coupon (the session coupon is dropped)")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    user: AuthUser,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderWithItems>>)> {
    let mut cart = session::load_cart(&session).await?;
    let coupon = session::load_coupon(&session).await?;

    let created =
        match order_service::checkout(&state.orm, &user, &mut cart, coupon.as_ref(), payload).await
        {
            Ok(created) => created,
            Err(err @ AppError::CouponRejected(_)) => {
                // Drop the stale coupon so the next attempt checks out at full price.
                session::clear_coupon(&session).await?;
                return Err(err);
            }
            Err(err) => return Err(err),
        };
    save_cart(&state, &session, Some(&user), &cart, created.dirty).await?;
    if coupon.is_some() {
        session::clear_coupon(&session).await?;
    }

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Order created",
            created.value,
            Some(Meta::empty()),
        )),
    ))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/pay",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Redirect the payer to the gateway", body = ApiResponse<PaymentRedirect>),
        (status = 400, description = "Order is not payable"),
        (status = 502, description = "Gateway refused or unreachable; the order is marked failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn pay_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PaymentRedirect>>> {
    let redirect = order_service::pay_order(&state.orm, &state.gateway, &user, id).await?;
    Ok(Json(ApiResponse::success(
        "Redirect to payment gateway",
        redirect,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/orders/payment/callback",
    params(
        ("Authority" = String, Query, description = "Authority issued by the gateway"),
        ("Status" = String, Query, description = "OK when the payer completed the payment")
    ),
    responses(
        (status = 200, description = "Payment paid, cancelled or already finalized", body = ApiResponse<PaymentResult>),
        (status = 400, description = "Missing authority"),
        (status = 404, description = "Unknown authority"),
        (status = 502, description = "Verification failed; the order is marked failed", body = ApiResponse<PaymentResult>)
    ),
    tag = "Orders"
)]
pub async fn payment_callback(
    State(state): State<AppState>,
    session: Session,
    user: AuthUser,
    Query(query): Query<PaymentCallbackQuery>,
) -> AppResult<(StatusCode, Json<ApiResponse<PaymentResult>>)> {
    let mut cart = session::load_cart(&session).await?;
    let result =
        order_service::finalize_payment(&state.orm, &state.gateway, &user, &mut cart, query)
            .await?;
    save_cart(&state, &session, Some(&user), &cart, result.dirty).await?;

    let (status, message) = match &result.value.outcome {
        PaymentOutcome::Paid { .. } => (StatusCode::OK, "Payment successful"),
        PaymentOutcome::Cancelled => (StatusCode::OK, "Payment cancelled"),
        PaymentOutcome::AlreadyFinalized { .. } => (StatusCode::OK, "Order already finalized"),
        PaymentOutcome::Failed { .. } => (StatusCode::BAD_GATEWAY, "Payment verification failed"),
    };
    Ok((
        status,
        Json(ApiResponse::success(message, result.value, Some(Meta::empty()))),
    ))
}
