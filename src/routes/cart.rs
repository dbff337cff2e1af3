use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, AddToCartResponse, CartCount, CartSummary, InCart},
    error::AppResult,
    middleware::auth::{AuthUser, MaybeAuthUser},
    models::{ItemKind, ItemRef},
    response::{ApiResponse, Meta},
    services::cart_service,
    session::{self, SessionCart},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cart_list).post(add_to_cart).delete(clear_cart))
        .route("/count", get(cart_count))
        .route("/{kind}/{id}", get(in_cart).delete(remove_from_cart))
}

/// Write the cart back to the session when it changed and mirror it into the durable
/// cart of a logged-in user.
pub(crate) async fn save_cart(
    state: &AppState,
    session: &Session,
    user: Option<&AuthUser>,
    cart: &SessionCart,
    dirty: bool,
) -> AppResult<()> {
    if !dirty {
        return Ok(());
    }
    session::store_cart(session, cart).await?;
    if let Some(user) = user {
        cart_service::sync_durable_cart(&state.orm, cart, user.user_id).await?;
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart lines priced against the live catalog", body = ApiResponse<CartSummary>)
    ),
    tag = "Cart"
)]
pub async fn cart_list(
    State(state): State<AppState>,
    session: Session,
    MaybeAuthUser(user): MaybeAuthUser,
) -> AppResult<Json<ApiResponse<CartSummary>>> {
    let mut cart = session::load_cart(&session).await?;
    let listed = cart_service::list_items(&state.orm, &mut cart).await?;
    save_cart(&state, &session, user.as_ref(), &cart, listed.dirty).await?;

    Ok(Json(ApiResponse::success("OK", listed.value, Some(Meta::empty()))))
}

#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Item is in the cart", body = ApiResponse<AddToCartResponse>),
        (status = 400, description = "Unknown or unavailable item"),
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    session: Session,
    MaybeAuthUser(user): MaybeAuthUser,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<AddToCartResponse>>> {
    let item = ItemRef {
        kind: payload.item_kind,
        id: payload.item_id,
    };
    let mut cart = session::load_cart(&session).await?;
    let added = cart_service::add_item(&state.orm, &mut cart, item).await?;
    let listed = cart_service::list_items(&state.orm, &mut cart).await?;
    save_cart(
        &state,
        &session,
        user.as_ref(),
        &cart,
        added.dirty || listed.dirty,
    )
    .await?;

    let message = if added.value {
        "Added to cart"
    } else {
        "Already in cart"
    };
    let data = AddToCartResponse {
        added: added.value,
        cart_quantity: listed.value.total_quantity,
        cart_total: listed.value.total_price,
    };
    Ok(Json(ApiResponse::success(message, data, Some(Meta::empty()))))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart emptied", body = ApiResponse<CartCount>)
    ),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    session: Session,
    MaybeAuthUser(user): MaybeAuthUser,
) -> AppResult<Json<ApiResponse<CartCount>>> {
    let mut cart = session::load_cart(&session).await?;
    let cleared = cart_service::clear(&mut cart);
    save_cart(&state, &session, user.as_ref(), &cart, cleared.dirty).await?;

    let data = CartCount {
        cart_quantity: 0,
        cart_total: 0,
    };
    Ok(Json(ApiResponse::success("Cart cleared", data, Some(Meta::empty()))))
}

#[utoipa::path(
    get,
    path = "/api/cart/count",
    responses(
        (status = 200, description = "Number of items and live total", body = ApiResponse<CartCount>)
    ),
    tag = "Cart"
)]
pub async fn cart_count(
    State(state): State<AppState>,
    session: Session,
    MaybeAuthUser(user): MaybeAuthUser,
) -> AppResult<Json<ApiResponse<CartCount>>> {
    let mut cart = session::load_cart(&session).await?;
    let listed = cart_service::list_items(&state.orm, &mut cart).await?;
    save_cart(&state, &session, user.as_ref(), &cart, listed.dirty).await?;

    let data = CartCount {
        cart_quantity: listed.value.total_quantity,
        cart_total: listed.value.total_price,
    };
    Ok(Json(ApiResponse::success("OK", data, Some(Meta::empty()))))
}

#[utoipa::path(
    get,
    path = "/api/cart/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "course or product"),
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Whether the item is in the cart", body = ApiResponse<InCart>),
        (status = 400, description = "Invalid item kind"),
    ),
    tag = "Cart"
)]
pub async fn in_cart(
    session: Session,
    Path((kind, id)): Path<(String, Uuid)>,
) -> AppResult<Json<ApiResponse<InCart>>> {
    let item = ItemRef {
        kind: kind.parse::<ItemKind>()?,
        id,
    };
    let cart = session::load_cart(&session).await?;
    let data = InCart {
        in_cart: cart.contains(&item),
    };
    Ok(Json(ApiResponse::success("OK", data, Some(Meta::empty()))))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "course or product"),
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item removed (no-op when absent)", body = ApiResponse<CartCount>),
        (status = 400, description = "Invalid item kind"),
    ),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    session: Session,
    MaybeAuthUser(user): MaybeAuthUser,
    Path((kind, id)): Path<(String, Uuid)>,
) -> AppResult<Json<ApiResponse<CartCount>>> {
    let item = ItemRef {
        kind: kind.parse::<ItemKind>()?,
        id,
    };
    let mut cart = session::load_cart(&session).await?;
    let removed = cart_service::remove_item(&mut cart, &item);
    let listed = cart_service::list_items(&state.orm, &mut cart).await?;
    save_cart(
        &state,
        &session,
        user.as_ref(),
        &cart,
        removed.dirty || listed.dirty,
    )
    .await?;

    let message = if removed.value {
        "Removed from cart"
    } else {
        "Not in cart"
    };
    let data = CartCount {
        cart_quantity: listed.value.total_quantity,
        cart_total: listed.value.total_price,
    };
    Ok(Json(ApiResponse::success(message, data, Some(Meta::empty()))))
}
